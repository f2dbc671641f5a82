//! Neighbour aggregation
//!
//! For every cell of a loaded table, sums each source attribute over the
//! cell's radius-1 neighbours that are themselves in the table, and stores
//! the sums as the cell's derived values.
//!
//! The run has two phases:
//! 1. compute: the table is borrowed immutably, so its key set and source
//!    values are a frozen snapshot. Each cell's sums are built in a local
//!    vector, optionally on a rayon pool.
//! 2. store: the table is borrowed mutably and each cell's vector is moved
//!    into its own record, once.
//!
//! Because phase 1 only reads source values, no cell's result can depend on
//! another cell's derived values, and no locking is needed.

pub mod pool;
pub mod pure;

use crate::error::{common, NeighbourerError, Result};
use crate::grid::Adjacency;
use crate::report::Warning;
use crate::table::{CellId, CellTable};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

/// Grid distance that defines a cell's neighbourhood
pub const NEIGHBOR_RADIUS: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationOptions {
    /// Worker threads; `None` or `Some(0)` uses all cores, `Some(1)` runs inline
    pub threads: Option<usize>,
    /// Draw a progress bar on stderr
    pub progress: bool,
}

#[derive(Debug, Default)]
pub struct AggregationOutcome {
    pub cells: usize,
    /// Cells that ended up with no qualifying neighbour
    pub isolated: usize,
    pub warnings: Vec<Warning>,
}

/// One cell's finished computation, not yet stored
#[derive(Debug)]
struct CellSums {
    cell: CellId,
    sums: Vec<f64>,
    neighbors: usize,
    error: Option<NeighbourerError>,
}

pub struct NeighborAggregator<A> {
    adjacency: A,
    options: AggregationOptions,
}

impl<A: Adjacency> NeighborAggregator<A> {
    pub fn new(adjacency: A) -> Self {
        Self {
            adjacency,
            options: AggregationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AggregationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.options.threads = threads;
        self
    }

    /// Compute and store the neighbour sums of every cell in `table`
    ///
    /// A cell whose neighbourhood cannot be resolved gets all-zero sums and
    /// a warning; it never aborts the run. A sum that overflows to infinity
    /// is an error, and the table is left without any derived values. On
    /// success every record of the table carries its derived values.
    pub fn aggregate(&self, table: &mut CellTable) -> Result<AggregationOutcome> {
        let snapshot = table.sorted_ids();
        info!(
            "Aggregating {} attributes over {} cells",
            table.schema().width(),
            snapshot.len()
        );

        let results = self.compute(table, &snapshot);
        let overflow = results.iter().find_map(|r| {
            pure::first_non_finite(&r.sums).map(|(idx, sum)| (r.cell, idx, sum))
        });
        if let Some((cell, idx, sum)) = overflow {
            let attribute = table.schema().attributes()[idx].as_str();
            return Err(common::non_finite_sum(cell, attribute, sum));
        }

        let mut outcome = AggregationOutcome {
            cells: results.len(),
            ..Default::default()
        };
        for result in results {
            if let Some(err) = &result.error {
                warn!("{}; treating cell as having no neighbours", err.user_message());
                outcome.warnings.push(Warning::from_error(err));
            }
            if result.neighbors == 0 {
                outcome.isolated += 1;
            }
            table.store_neighbor_sums(result.cell, result.sums)?;
        }

        debug!(
            "Stored neighbour sums for {} cells ({} isolated, {} lookup failures)",
            outcome.cells,
            outcome.isolated,
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    fn compute(&self, table: &CellTable, cells: &[CellId]) -> Vec<CellSums> {
        let progress = progress_bar(cells.len(), self.options.progress);
        let work = |cell: &CellId| {
            let result = self.compute_cell(table, *cell);
            progress.inc(1);
            result
        };

        let threads = pool::desired_threads(self.options.threads);
        let results: Vec<CellSums> = match pool::build_pool(threads) {
            Some(pool) => pool.install(|| cells.par_iter().map(work).collect()),
            None => cells.iter().map(work).collect(),
        };

        progress.finish_and_clear();
        results
    }

    fn compute_cell(&self, table: &CellTable, cell: CellId) -> CellSums {
        match self.adjacency.neighbors(cell, NEIGHBOR_RADIUS) {
            Ok(candidates) => {
                let neighbors = pure::qualifying_neighbors(cell, candidates, |c| table.contains(c));
                trace!("Cell {} has {} neighbours in the table", cell, neighbors.len());
                CellSums {
                    cell,
                    sums: pure::accumulate(table, &neighbors),
                    neighbors: neighbors.len(),
                    error: None,
                }
            }
            Err(err) => CellSums {
                cell,
                sums: vec![0.0; table.schema().width()],
                neighbors: 0,
                error: Some(err),
            },
        }
    }
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cells ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

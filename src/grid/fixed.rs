//! Adjacency backed by an explicit neighbour list

use super::{unsupported_radius, Adjacency};
use crate::error::{ErrorCode, NeighbourerError, Result};
use crate::table::CellId;
use std::collections::{HashMap, HashSet};

/// Adjacency defined by hand rather than by grid geometry
///
/// Radius 0 returns the origin alone; radius 1 returns the origin followed
/// by whatever was registered for it, verbatim. Larger radii are rejected.
#[derive(Debug, Clone, Default)]
pub struct FixedAdjacency {
    links: HashMap<CellId, Vec<CellId>>,
    failing: HashSet<CellId>,
}

impl FixedAdjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `a` and `b` mutual neighbours
    pub fn link(&mut self, a: CellId, b: CellId) {
        self.links.entry(a).or_default().push(b);
        self.links.entry(b).or_default().push(a);
    }

    pub fn with_link(mut self, a: impl Into<CellId>, b: impl Into<CellId>) -> Self {
        self.link(a.into(), b.into());
        self
    }

    /// Register a raw, one-directional candidate list for `cell`
    ///
    /// The list is returned as is, so it may hold the origin, repeats or
    /// [`CellId::NULL`] placeholders.
    pub fn with_candidates(
        mut self,
        cell: impl Into<CellId>,
        candidates: impl IntoIterator<Item = CellId>,
    ) -> Self {
        self.links
            .entry(cell.into())
            .or_default()
            .extend(candidates);
        self
    }

    /// Make every lookup for `cell` fail
    pub fn failing_on(mut self, cell: impl Into<CellId>) -> Self {
        self.failing.insert(cell.into());
        self
    }
}

impl Adjacency for FixedAdjacency {
    fn neighbors(&self, cell: CellId, radius: u32) -> Result<Vec<CellId>> {
        if self.failing.contains(&cell) {
            return Err(NeighbourerError::adjacency(
                ErrorCode::ADJACENCY_INVALID_CELL,
                format!("{} is not a valid grid cell", cell),
                Some(cell),
            ));
        }

        match radius {
            0 => Ok(vec![cell]),
            1 => {
                let mut disk = vec![cell];
                if let Some(linked) = self.links.get(&cell) {
                    disk.extend_from_slice(linked);
                }
                Ok(disk)
            }
            _ => Err(unsupported_radius(cell, radius)),
        }
    }
}

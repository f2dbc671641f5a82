//! Hexagonal grid adjacency
//!
//! The aggregator only needs one question answered: which cells lie within
//! `radius` steps of a given cell. [`Adjacency`] is that seam. [`H3Grid`]
//! answers it with the H3 grid system; [`FixedAdjacency`] answers it from
//! an explicit neighbour list and is what tests use.

pub mod fixed;

pub use fixed::FixedAdjacency;

use crate::error::{common, ErrorCode, NeighbourerError, Result};
use crate::table::CellId;
use h3o::CellIndex;
use std::sync::Arc;

/// Source of grid neighbourhoods
///
/// Implementations return the disk of the given radius around `cell`. The
/// result may include `cell` itself, may contain duplicates or
/// [`CellId::NULL`] placeholders, and may be shorter than a full ring near
/// pentagons; callers filter it.
pub trait Adjacency: Send + Sync {
    fn neighbors(&self, cell: CellId, radius: u32) -> Result<Vec<CellId>>;
}

impl<T: Adjacency + ?Sized> Adjacency for &T {
    fn neighbors(&self, cell: CellId, radius: u32) -> Result<Vec<CellId>> {
        (**self).neighbors(cell, radius)
    }
}

impl<T: Adjacency + ?Sized> Adjacency for Box<T> {
    fn neighbors(&self, cell: CellId, radius: u32) -> Result<Vec<CellId>> {
        (**self).neighbors(cell, radius)
    }
}

impl<T: Adjacency + ?Sized> Adjacency for Arc<T> {
    fn neighbors(&self, cell: CellId, radius: u32) -> Result<Vec<CellId>> {
        (**self).neighbors(cell, radius)
    }
}

/// H3 grid disk lookups through `h3o`
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Grid;

impl H3Grid {
    pub fn new() -> Self {
        Self
    }
}

impl Adjacency for H3Grid {
    fn neighbors(&self, cell: CellId, radius: u32) -> Result<Vec<CellId>> {
        let index =
            CellIndex::try_from(cell.get()).map_err(|e| common::invalid_grid_cell(cell, &e))?;
        Ok(index
            .grid_disk_safe(radius)
            .map(|neighbor| CellId::new(u64::from(neighbor)))
            .collect())
    }
}

pub(crate) fn unsupported_radius(cell: CellId, radius: u32) -> NeighbourerError {
    NeighbourerError::adjacency(
        ErrorCode::ADJACENCY_UNSUPPORTED_RADIUS,
        format!("radius {} is not supported", radius),
        Some(cell),
    )
}

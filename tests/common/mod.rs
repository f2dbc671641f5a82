//! Common test utilities and helpers

#![allow(dead_code)]

use h3o::{CellIndex, LatLng, Resolution};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A resolution-9 cell near Lisbon
pub fn origin() -> CellIndex {
    LatLng::new(38.7223, -9.1393)
        .unwrap()
        .to_cell(Resolution::Nine)
}

/// Lowercase hexadecimal form, as written by the tool
pub fn hex(cell: CellIndex) -> String {
    format!("{:x}", u64::from(cell))
}

/// The six cells around `cell`, excluding `cell`
pub fn ring(cell: CellIndex) -> Vec<CellIndex> {
    let disk: Vec<CellIndex> = cell.grid_disk(1);
    disk.into_iter().filter(|c| *c != cell).collect()
}

pub fn are_neighbors(a: CellIndex, b: CellIndex) -> bool {
    ring(a).contains(&b)
}

/// Three cells that are pairwise neighbours
pub fn triangle() -> [CellIndex; 3] {
    let a = origin();
    let around = ring(a);
    let b = around[0];
    let c = around
        .iter()
        .copied()
        .find(|c| *c != b && are_neighbors(b, *c))
        .unwrap();
    [a, b, c]
}

/// A cell two steps from `cell`, sharing no edge with it
pub fn distant_from(cell: CellIndex) -> CellIndex {
    let disk: Vec<CellIndex> = cell.grid_disk(2);
    disk.into_iter()
        .find(|c| *c != cell && !are_neighbors(cell, *c))
        .unwrap()
}

/// Scratch directory holding input and output files
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).unwrap()
    }
}

/// Build CSV text from a header and `(cell, values)` rows
pub fn csv(header: &str, rows: &[(CellIndex, &str)]) -> String {
    let mut text = format!("{header}\n");
    for (cell, values) in rows {
        text.push_str(&format!("{},{}\n", hex(*cell), values));
    }
    text
}

/// Split the tool's output into `(id, fields)` pairs, skipping the header
pub fn parse_output(text: &str) -> Vec<(String, Vec<String>)> {
    text.lines()
        .skip(1)
        .map(|line| {
            let mut fields = line.split(',').map(str::to_string);
            let id = fields.next().unwrap();
            (id, fields.collect())
        })
        .collect()
}

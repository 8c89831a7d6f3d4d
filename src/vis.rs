//! Legacy VTK `STRUCTURED_POINTS` export of per-level cache residency.
//!
//! This generalises the ad hoc three-level `draw_array` walk from the
//! original tool into an arbitrary-level column layout: one
//! `Data_arr` column per cache, value `2` where an address is resident
//! at that level and `0` otherwise (§6 — the 2/0 contract is load-bearing,
//! callers downstream treat it as a mask, not a boolean).

use std::io::{self, Write};

use crate::sim::Graph;

/// A 1-D or 3-D grid over the address space being visualised.
///
/// `origin` is the lowest address in the grid; `spacing` is the number
/// of bytes each cell covers along that axis; `dims` is the number of
/// cells along each axis (`x, y, z`), with unused trailing axes set to
/// `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Lowest address covered by the grid.
    pub origin: u64,
    /// Bytes per cell along each axis.
    pub spacing: (u64, u64, u64),
    /// Cell counts along each axis.
    pub dims: (usize, usize, usize),
}

impl Grid {
    /// A simple 1-D grid of `count` one-byte cells starting at `origin`.
    #[must_use]
    pub fn linear(origin: u64, count: usize) -> Self {
        Self {
            origin,
            spacing: (1, 1, 1),
            dims: (count, 1, 1),
        }
    }

    fn cell_count(&self) -> usize {
        self.dims.0 * self.dims.1 * self.dims.2
    }

    fn address_of(&self, index: usize) -> u64 {
        let (nx, ny, _nz) = self.dims;
        let x = index % nx;
        let y = (index / nx) % ny;
        let z = index / (nx * ny);
        self.origin
            + x as u64 * self.spacing.0
            + y as u64 * self.spacing.1
            + z as u64 * self.spacing.2
    }
}

/// Writes a legacy VTK `STRUCTURED_POINTS` file to `sink`, with a single
/// multi-component `Data_arr` field carrying one column per entry in
/// `levels` (in the given order).
///
/// `DIMENSIONS` is `grid.dims` plus one along each axis, matching the
/// legacy convention that point counts are one more than cell counts.
/// `CELL_DATA` is the cell count. `Data_arr` is declared with
/// `levels.len()` components and one tuple per cell; within a tuple,
/// column `i` holds `2` where that cell's address is in
/// [`Graph::cached`] for `levels[i]`, `0` otherwise.
///
/// # Errors
///
/// Propagates any I/O error from writing to `sink`.
pub fn write_vtk<W: Write>(sink: &mut W, graph: &Graph, levels: &[&str], grid: Grid) -> io::Result<()> {
    writeln!(sink, "# vtk DataFile Version 3.0")?;
    writeln!(sink, "cache residency")?;
    writeln!(sink, "ASCII")?;
    writeln!(sink, "DATASET STRUCTURED_POINTS")?;
    writeln!(
        sink,
        "DIMENSIONS {} {} {}",
        grid.dims.0 + 1,
        grid.dims.1 + 1,
        grid.dims.2 + 1
    )?;
    writeln!(sink, "ORIGIN {} 0 0", grid.origin)?;
    writeln!(sink, "SPACING {} {} {}", grid.spacing.0, grid.spacing.1, grid.spacing.2)?;
    writeln!(sink, "CELL_DATA {}", grid.cell_count())?;
    writeln!(sink, "FIELD DATA 1")?;
    writeln!(sink)?;
    writeln!(sink, "Data_arr {} {} double", levels.len(), grid.cell_count())?;

    let residency: Vec<_> = levels.iter().map(|name| graph.cached(name)).collect();

    for index in 0..grid.cell_count() {
        let addr = grid.address_of(index);
        let mut row = String::new();
        for resident in &residency {
            let value = if resident.contains(&addr) { 2 } else { 0 };
            if !row.is_empty() {
                row.push(' ');
            }
            row.push_str(&value.to_string());
        }
        writeln!(sink, "{row}")?;
    }
    Ok(())
}

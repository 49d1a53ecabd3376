// SPDX-License-Identifier: GPL-3.0-only

//! The original 5x5 ArUco dictionary
//!
//! Each of the five data rows carries two bits of the marker id, spelled as
//! one of four 5-bit codewords. Row 0 holds the two most significant bits, so
//! ids range over `0..1024`. A set bit is a white cell.

/// Data cells per side
pub const GRID_SIZE: usize = 5;

/// Cells per side including the black border
pub const MARKER_CELLS: usize = GRID_SIZE + 2;

/// Number of distinct ids
pub const MARKER_COUNT: u32 = 1 << (2 * GRID_SIZE);

/// Row codewords indexed by the two id bits they encode
const CODEWORDS: [[u8; GRID_SIZE]; 4] = [
    [1, 0, 0, 0, 0],
    [1, 0, 1, 1, 1],
    [0, 1, 0, 0, 1],
    [0, 1, 1, 1, 0],
];

/// Data bits of a marker, row-major, `true` = white
pub type BitGrid = [[bool; GRID_SIZE]; GRID_SIZE];

/// Dictionary lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryMatch {
    pub id: u32,
    /// Number of cells that differ from the closest codeword rows
    pub distance: u32,
}

/// Bit pattern printed for `id`, or None if it is out of range
pub fn encode(id: u32) -> Option<BitGrid> {
    if id >= MARKER_COUNT {
        return None;
    }
    let mut grid = [[false; GRID_SIZE]; GRID_SIZE];
    for (row, cells) in grid.iter_mut().enumerate() {
        let shift = 2 * (GRID_SIZE - 1 - row);
        let word = &CODEWORDS[((id >> shift) & 3) as usize];
        for (cell, &bit) in cells.iter_mut().zip(word) {
            *cell = bit == 1;
        }
    }
    Some(grid)
}

/// Decode a bit grid by matching every row against its nearest codeword
pub fn decode(grid: &BitGrid) -> DictionaryMatch {
    let mut id = 0u32;
    let mut distance = 0u32;
    for row in grid {
        let (symbol, row_distance) = CODEWORDS
            .iter()
            .enumerate()
            .map(|(symbol, word)| {
                let d = row
                    .iter()
                    .zip(word)
                    .filter(|&(&cell, &bit)| cell != (bit == 1))
                    .count() as u32;
                (symbol as u32, d)
            })
            .min_by_key(|&(_, d)| d)
            .unwrap_or((0, GRID_SIZE as u32));
        id = (id << 2) | symbol;
        distance += row_distance;
    }
    DictionaryMatch { id, distance }
}

/// Rotate a grid a quarter turn clockwise
pub fn rotate_clockwise(grid: &BitGrid) -> BitGrid {
    let n = GRID_SIZE;
    let mut out = [[false; GRID_SIZE]; GRID_SIZE];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = grid[n - 1 - c][r];
        }
    }
    out
}

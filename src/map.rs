use std::fs;
use std::path::Path;

use log::debug;

/// Fixed storage extent of a map grid. Declared width/height may be smaller,
/// never larger; cells outside the declared size stay zero.
pub const MAX_WIDTH: usize = 24;
pub const MAX_HEIGHT: usize = 24;

/// Display names longer than this are truncated, not rejected.
pub const MAX_NAME_LEN: usize = 64;

/// Start pose used when a map file carries no `START:` line.
pub const DEFAULT_START: (f32, f32) = (22.0, 12.0);

// Built-in map, always available as a fallback.
// 0 = empty space, 1-4 = wall materials, anything else = solid with the
// neutral color (the lone 5 below).
const DEFAULT_GRID: [[u8; MAX_WIDTH]; MAX_HEIGHT] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 0, 0, 0, 0, 3, 0, 3, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 3, 0, 0, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 2, 0, 2, 2, 0, 0, 0, 0, 3, 0, 3, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 4, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 0, 0, 0, 5, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 4, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MapError {
    #[error("map data contains no grid rows")]
    EmptyMap,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rectangular tile grid plus the pose a player spawns at.
///
/// Storage is always the full fixed extent; `width`/`height` declare the
/// meaningful region and everything outside it is zero.
#[derive(Debug, Clone)]
pub struct Map {
    cells: [u8; MAX_WIDTH * MAX_HEIGHT],
    pub width: usize,
    pub height: usize,
    pub name: String,
    pub start_x: f32,
    pub start_y: f32,
}

impl Default for Map {
    fn default() -> Self {
        let mut cells = [0u8; MAX_WIDTH * MAX_HEIGHT];
        for (y, row) in DEFAULT_GRID.iter().enumerate() {
            cells[y * MAX_WIDTH..(y + 1) * MAX_WIDTH].copy_from_slice(row);
        }
        Map {
            cells,
            width: MAX_WIDTH,
            height: MAX_HEIGHT,
            name: String::from("default"),
            start_x: DEFAULT_START.0,
            start_y: DEFAULT_START.1,
        }
    }
}

impl Map {
    /// Build a map from a row-major cell slice. Data beyond the fixed extent
    /// is dropped; a short slice leaves the remainder zero.
    pub fn from_grid(
        grid: &[u8],
        width: usize,
        height: usize,
        start: (f32, f32),
        name: &str,
    ) -> Self {
        let width = width.clamp(1, MAX_WIDTH);
        let height = height.clamp(1, MAX_HEIGHT);
        let mut cells = [0u8; MAX_WIDTH * MAX_HEIGHT];
        for y in 0..height {
            for x in 0..width {
                if let Some(&v) = grid.get(y * width + x) {
                    cells[y * MAX_WIDTH + x] = v;
                }
            }
        }
        Map {
            cells,
            width,
            height,
            name: name.chars().take(MAX_NAME_LEN).collect(),
            start_x: start.0,
            start_y: start.1,
        }
    }

    /// Parse the line-oriented map text format.
    ///
    /// `NAME:` and `START:` lines may appear anywhere; grid rows follow the
    /// `DATA:` marker, one row per line, comma or whitespace delimited.
    /// Malformed tokens read as empty space and oversized rows/grids are
    /// truncated; the only hard failure is a buffer with no grid rows at all.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut name = String::new();
        let mut start = DEFAULT_START;
        let mut cells = [0u8; MAX_WIDTH * MAX_HEIGHT];
        let mut width = 0usize;
        let mut rows = 0usize;
        let mut in_data = false;

        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("NAME:") {
                name = rest.trim().chars().take(MAX_NAME_LEN).collect();
            } else if let Some(rest) = line.strip_prefix("START:") {
                if let Some((sx, sy)) = rest.split_once(',') {
                    if let (Ok(sx), Ok(sy)) = (sx.trim().parse(), sy.trim().parse()) {
                        start = (sx, sy);
                    }
                }
            } else if line.starts_with("DATA:") {
                in_data = true;
            } else if in_data && rows < MAX_HEIGHT {
                let mut cols = 0usize;
                for tok in line
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                {
                    if cols == MAX_WIDTH {
                        break;
                    }
                    // Non-numeric tokens read as empty space.
                    cells[rows * MAX_WIDTH + cols] = tok.parse().unwrap_or(0);
                    cols += 1;
                }
                // Blank lines between rows are tolerated.
                if cols > 0 {
                    width = width.max(cols);
                    rows += 1;
                }
            }
        }

        if rows == 0 || width == 0 {
            return Err(MapError::EmptyMap);
        }

        Ok(Map {
            cells,
            width,
            height: rows,
            name,
            start_x: start.0,
            start_y: start.1,
        })
    }

    /// Read and parse a map file. The file stem becomes the name if the file
    /// carries no `NAME:` line.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = fs::read_to_string(path)?;
        let mut map = Self::parse(&text)?;
        if map.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                map.name = stem.chars().take(MAX_NAME_LEN).collect();
            }
        }
        debug!(
            "parsed {}x{} map \"{}\" from {}",
            map.width,
            map.height,
            map.name,
            path.display()
        );
        Ok(map)
    }

    pub fn cell(&self, x: usize, y: usize) -> u8 {
        assert!(
            x < self.width && y < self.height,
            "cell ({x},{y}) outside {}x{} map",
            self.width,
            self.height
        );
        self.cells[y * MAX_WIDTH + x]
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
}

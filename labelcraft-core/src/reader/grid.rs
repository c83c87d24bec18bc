//! Dense cell grid with merged values already expanded

/// Inclusive merged range, 1-indexed: (start_row, start_col, end_row, end_col)
pub type MergedRange = (usize, usize, usize, usize);

/// Fully materialized 2D grid of normalized cell text.
///
/// Indices are 1-based to match spreadsheet coordinates. Reads outside the
/// populated area return `None`, so callers never need bounds checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<String>>,
}

impl Grid {
    /// Create an empty grid with the given size
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Build a grid from row-major raw values; each value is normalized.
    ///
    /// The first inner vector becomes row 1, its first element column 1.
    pub fn from_rows<S: AsRef<str>>(rows: &[Vec<Option<S>>]) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut grid = Self::new(rows.len(), cols);
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let normalized = value.as_ref().and_then(|v| normalize_text(v.as_ref()));
                grid.set(r + 1, c + 1, normalized);
            }
        }
        grid
    }

    /// Highest row index (1-based); 0 for an empty grid
    pub fn max_row(&self) -> usize {
        self.rows
    }

    /// Highest column index (1-based); 0 for an empty grid
    pub fn max_col(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return None;
        }
        Some((row - 1) * self.cols + (col - 1))
    }

    /// Get a cell value
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.index(row, col).and_then(|i| self.cells[i].as_deref())
    }

    /// Set a cell value; writes outside the grid are ignored
    pub fn set(&mut self, row: usize, col: usize, value: Option<String>) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = value;
        }
    }

    /// Grow the grid so that (rows, cols) is addressable, keeping content
    pub fn ensure_size(&mut self, rows: usize, cols: usize) {
        if rows <= self.rows && cols <= self.cols {
            return;
        }
        let new_rows = rows.max(self.rows);
        let new_cols = cols.max(self.cols);
        let mut cells = vec![None; new_rows * new_cols];
        for r in 0..self.rows {
            for c in 0..self.cols {
                cells[r * new_cols + c] = self.cells[r * self.cols + c].take();
            }
        }
        self.rows = new_rows;
        self.cols = new_cols;
        self.cells = cells;
    }

    /// Copy the top-left value of a merged range into every cell it covers
    pub fn apply_merge(&mut self, range: MergedRange) {
        let (start_row, start_col, end_row, end_col) = range;
        self.ensure_size(end_row, end_col);
        let value = self.get(start_row, start_col).map(str::to_string);
        for row in start_row..=end_row {
            for col in start_col..=end_col {
                self.set(row, col, value.clone());
            }
        }
    }

    /// Whether any column at or after `from_col` holds a value on `row`
    pub fn row_has_values_from(&self, row: usize, from_col: usize) -> bool {
        (from_col..=self.cols).any(|col| self.get(row, col).is_some())
    }

    /// Whether any cell in the grid satisfies the predicate
    pub fn any_cell(&self, predicate: impl Fn(&str) -> bool) -> bool {
        self.cells.iter().flatten().any(|v| predicate(v.as_str()))
    }
}

/// Normalize raw cell text: NBSP becomes a space, surrounding whitespace is
/// trimmed, and an empty result is "no value".
pub fn normalize_text(raw: &str) -> Option<String> {
    let cleaned = raw.replace('\u{a0}', " ");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercased normalized text used for keyword matching
pub fn normalize_header(raw: &str) -> String {
    normalize_text(raw).unwrap_or_default().to_lowercase()
}

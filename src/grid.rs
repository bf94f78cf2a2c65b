//! Placement of plot cells in a fixed-width grid
//!
//! Cells are filled left to right, top to bottom. The grid always has enough
//! rows for every item, so the last row may have unused cells at the end.

/// Position of one cell in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    /// Row-major index (also the index into `split_evenly` areas)
    pub index: usize,
    pub row: usize,
    pub col: usize,
}

/// Which edges of the grid a cell touches, for deciding axis labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeFlags {
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub count: usize,
}

impl GridLayout {
    /// Grid with `cols` columns and enough rows for `count` cells
    pub fn new(count: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        GridLayout {
            rows: count.div_ceil(cols),
            cols,
            count,
        }
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of trailing cells left empty
    pub fn unused(&self) -> usize {
        self.cells() - self.count
    }

    pub fn position(&self, index: usize) -> CellPosition {
        CellPosition {
            index,
            row: index / self.cols,
            col: index % self.cols,
        }
    }

    pub fn edges(&self, pos: CellPosition) -> EdgeFlags {
        EdgeFlags {
            bottom: pos.row + 1 == self.rows,
            left: pos.col == 0,
            right: pos.col + 1 == self.cols,
        }
    }

    /// Cursor over every cell position of the grid
    pub fn cursor(&self) -> GridCursor {
        GridCursor {
            layout: *self,
            next: 0,
        }
    }
}

/// Iterator over grid positions
///
/// Take one position per item to place, then drain the rest to find the
/// cells that must be blanked.
#[derive(Debug, Clone)]
pub struct GridCursor {
    layout: GridLayout,
    next: usize,
}

impl GridCursor {
    pub fn has_remaining(&self) -> bool {
        self.next < self.layout.cells()
    }
}

impl Iterator for GridCursor {
    type Item = CellPosition;

    fn next(&mut self) -> Option<CellPosition> {
        if !self.has_remaining() {
            return None;
        }
        let pos = self.layout.position(self.next);
        self.next += 1;
        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.layout.cells() - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for GridCursor {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eight_in_three_columns() {
        let grid = GridLayout::new(8, 3);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.unused(), 1);

        let mut cursor = grid.cursor();
        let placed: Vec<(usize, usize)> = cursor.by_ref().take(8).map(|p| (p.row, p.col)).collect();
        assert_eq!(
            placed,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1)]
        );

        assert!(cursor.has_remaining());
        let blank: Vec<CellPosition> = cursor.collect();
        assert_eq!(blank, vec![CellPosition { index: 8, row: 2, col: 2 }]);
    }

    #[test]
    fn test_exact_fit_has_no_blanks() {
        let grid = GridLayout::new(6, 3);
        let mut cursor = grid.cursor();
        assert_eq!(cursor.len(), 6);
        cursor.by_ref().take(6).for_each(drop);
        assert!(!cursor.has_remaining());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_edges() {
        let grid = GridLayout::new(8, 3);
        let first = grid.position(0);
        assert_eq!(
            grid.edges(first),
            EdgeFlags { bottom: false, left: true, right: false }
        );
        let last = grid.position(7);
        assert_eq!(
            grid.edges(last),
            EdgeFlags { bottom: true, left: false, right: false }
        );
        let right = grid.position(5);
        assert!(grid.edges(right).right);
    }

    #[test]
    fn test_single_column() {
        let grid = GridLayout::new(3, 1);
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.unused(), 0);
        assert!(grid.cursor().all(|p| p.col == 0));
    }
}

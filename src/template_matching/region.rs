//! Grid cuts of the screen for targeted searching

use super::types::Rect;
use crate::adb::ScreenSize;

/// Which grid cell to cut out of the screen.
///
/// Cells are `width / cols` by `height / rows` pixels (integer division), so
/// on sizes that do not divide evenly the right and bottom remainders are
/// never covered by any cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenCut {
    cols: u32,
    rows: u32,
    x: u32,
    row: Option<u32>,
}

impl ScreenCut {
    /// Address a cell by its 1-based row-major index.
    ///
    /// The resulting rectangle multiplies the 1-based column and row by the
    /// cell size, so index 1 yields the cell at column 1, row 1 (0-based), not
    /// the top-left cell. Existing automation scripts depend on this layout.
    /// Index 0 follows the same formula and lands at column `cols`, row 0,
    /// which is off the screen. The last index of each row lands on column
    /// `cols` as well, past the right edge: use [`ScreenCut::cell`] for
    /// cells that must lie on screen.
    pub fn linear(cols: u32, rows: u32, index: u32) -> Self {
        Self {
            cols,
            rows,
            x: index,
            row: None,
        }
    }

    /// Address a cell by 0-based column and row.
    pub fn cell(cols: u32, rows: u32, col: u32, row: u32) -> Self {
        Self {
            cols,
            rows,
            x: col,
            row: Some(row),
        }
    }

    pub fn cell_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width / self.cols.max(1), height / self.rows.max(1))
    }

    /// Pixel rectangle of this cell on a `width` x `height` screen.
    pub fn cut(&self, width: u32, height: u32) -> Rect {
        let (w, h) = self.cell_size(width, height);
        let (col, row) = match self.row {
            Some(row) => (self.x, row),
            None => {
                let cols = self.cols.max(1);
                let row = self.x.div_ceil(cols);
                // col = x - (row - 1) * cols, kept unsigned: index 0 gives col = cols
                (self.x + cols - row * cols, row)
            }
        };
        Rect::from_corners((w * col, h * row), (w * (col + 1), h * (row + 1)))
    }

    pub fn cut_screen(&self, size: ScreenSize) -> Rect {
        self.cut(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_cell_has_cell_dimensions() {
        let (w, h) = (2400, 1080);
        for (cols, rows) in [(3, 3), (4, 2), (7, 5)] {
            for index in 1..=cols * rows {
                let rect = ScreenCut::linear(cols, rows, index).cut(w, h);
                assert_eq!(rect.width(), w / cols, "cols={cols} index={index}");
                assert_eq!(rect.height(), h / rows, "rows={rows} index={index}");
            }
        }
    }

    #[test]
    fn linear_index_one_is_offset_by_one_cell() {
        let rect = ScreenCut::linear(3, 3, 1).cut(300, 300);
        assert_eq!(rect, Rect::from_corners((100, 100), (200, 200)));
    }

    #[test]
    fn linear_index_wraps_rows() {
        // index 5 on a 4-wide grid: row = ceil(5/4) = 2, col = 5 - 4 = 1
        let rect = ScreenCut::linear(4, 4, 5).cut(400, 400);
        assert_eq!(rect, Rect::from_corners((100, 200), (200, 300)));

        // last index in the first row keeps row 1
        let rect = ScreenCut::linear(4, 4, 4).cut(400, 400);
        assert_eq!(rect, Rect::from_corners((400, 100), (500, 200)));
    }

    #[test]
    fn linear_index_zero_follows_formula() {
        // row = ceil(0/3) = 0, col = 0 - (0 - 1) * 3 = 3
        let rect = ScreenCut::linear(3, 3, 0).cut(300, 300);
        assert_eq!(rect, Rect::from_corners((300, 0), (400, 100)));
    }

    #[test]
    fn explicit_mode_is_zero_based() {
        let rect = ScreenCut::cell(4, 2, 0, 0).cut(2400, 1080);
        assert_eq!(rect, Rect::from_corners((0, 0), (600, 540)));
        let rect = ScreenCut::cell(4, 2, 3, 1).cut(2400, 1080);
        assert_eq!(rect, Rect::from_corners((1800, 540), (2400, 1080)));
    }

    #[test]
    fn uneven_sizes_use_integer_division() {
        let rect = ScreenCut::cell(3, 3, 2, 2).cut(1000, 500);
        assert_eq!(rect, Rect::from_corners((666, 332), (999, 498)));
    }

    #[test]
    fn cut_screen_uses_landscape_size() {
        let size = ScreenSize::landscape(1080, 2400);
        let rect = ScreenCut::cell(2, 2, 1, 0).cut_screen(size);
        assert_eq!(rect, Rect::from_corners((1200, 0), (2400, 540)));
    }
}

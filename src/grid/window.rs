use super::Grid;

/// A rectangular view over a [`Grid`], for renderers that only show part of it
///
/// The window may hang off any side of the grid, those cells simply never show up.
pub struct GridWindow<'a> {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    grid: &'a Grid,
}
impl<'a> GridWindow<'a> {
    pub fn new(grid: &'a Grid, left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width),
            bottom: top.saturating_add(height),
            grid,
        }
    }

    /// Live cells inside the window in row-major order, relative to its top left
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let xs = self.left.max(0)..self.right.min(self.grid.width());
        let ys = self.top.max(0)..self.bottom.min(self.grid.height());
        ys.flat_map(move |y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| self.grid.get(x, y))
            .map(|(x, y)| (x - self.left, y - self.top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal() -> Grid {
        let mut grid = Grid::new(4, 4).unwrap();
        for i in 0..4 {
            grid.set_true(i, i);
        }
        grid
    }

    #[test]
    fn iter_is_relative_to_window() {
        let grid = diagonal();
        let cells: Vec<_> = grid.window(1, 1, 2, 2).iter().collect();

        assert_eq!(cells, vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn window_may_exceed_grid() {
        let grid = diagonal();
        let cells: Vec<_> = grid.window(-2, -2, 100, 100).iter().collect();

        assert_eq!(cells, vec![(2, 2), (3, 3), (4, 4), (5, 5)]);
    }
}

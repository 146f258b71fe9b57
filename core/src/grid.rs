//! Weighted 2D grid.
//!
//! Each cell carries a weight: `0` marks a wall, any positive weight is the
//! cost of stepping into the cell. Orthogonal and diagonal steps both cost the
//! destination weight.

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::graph::SearchGraph;

/// A cell coordinate; `x` grows to the east, `y` to the south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for GridPos {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Row-major: `weights[y * width + x]`.
    weights: Vec<f64>,
}

impl Grid {
    /// Build from row-major weights, `rows[y][x]`.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if width == 0 {
            return Err(GridError::Empty);
        }

        let mut weights = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, weight) in row.into_iter().enumerate() {
                check_weight(x, y, weight)?;
                weights.push(weight);
            }
        }

        Ok(Self {
            width,
            height,
            weights,
        })
    }

    /// An obstacle-free grid where every step costs 1.
    ///
    /// Zero-sized grids are rejected with [`GridError::Empty`], as in [`Grid::new`].
    pub fn open(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            width,
            height,
            weights: vec![1.0; width * height],
        })
    }

    /// Parse a text map: one row per line, `.` open, `#` wall, `1`-`9` weight.
    /// Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (line_idx, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let row = line
                .chars()
                .enumerate()
                .map(|(col, ch)| match ch {
                    '.' => Ok(1.0),
                    '#' => Ok(0.0),
                    '1'..='9' => Ok(f64::from(ch as u8 - b'0')),
                    _ => Err(GridError::InvalidCell {
                        line: line_idx + 1,
                        column: col + 1,
                        ch,
                    }),
                })
                .collect::<Result<Vec<f64>, GridError>>()?;
            rows.push(row);
        }
        Self::new(rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Weight of `pos`, or `None` when it lies outside the grid.
    pub fn weight(&self, pos: GridPos) -> Option<f64> {
        self.contains(pos).then(|| self.weights[self.index(pos)])
    }

    pub fn set_weight(&mut self, pos: GridPos, weight: f64) -> Result<(), GridError> {
        if !self.contains(pos) {
            return Err(GridError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        check_weight(pos.x, pos.y, weight)?;
        let idx = self.index(pos);
        self.weights[idx] = weight;
        Ok(())
    }

    pub fn set_wall(&mut self, pos: GridPos) -> Result<(), GridError> {
        self.set_weight(pos, 0.0)
    }

    pub fn wall_count(&self) -> usize {
        self.weights.iter().filter(|&&w| w == 0.0).count()
    }

    /// Smallest weight among passable cells. Scaling a grid heuristic by this
    /// keeps it admissible on weighted maps.
    pub fn min_weight(&self) -> Option<f64> {
        self.weights
            .iter()
            .copied()
            .filter(|&w| w > 0.0)
            .min_by(f64::total_cmp)
    }

    fn index(&self, pos: GridPos) -> usize {
        pos.y * self.width + pos.x
    }

    fn step(&self, pos: GridPos, (dx, dy): (isize, isize)) -> Option<GridPos> {
        let next = GridPos {
            x: pos.x.checked_add_signed(dx)?,
            y: pos.y.checked_add_signed(dy)?,
        };
        self.contains(next).then_some(next)
    }
}

fn check_weight(x: usize, y: usize, weight: f64) -> Result<(), GridError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidWeight { x, y, weight })
    }
}

impl SearchGraph for Grid {
    type Node = GridPos;
    type Dist = GridPos;

    /// West, east, north, south; then the four diagonals when requested.
    fn neighbors(&self, node: GridPos, diagonal: bool, out: &mut Vec<GridPos>) {
        out.extend(ORTHOGONAL.iter().filter_map(|&d| self.step(node, d)));
        if diagonal {
            out.extend(DIAGONAL.iter().filter_map(|&d| self.step(node, d)));
        }
    }

    fn is_wall(&self, node: GridPos) -> bool {
        self.weight(node).map_or(true, |w| w == 0.0)
    }

    fn cost(&self, node: GridPos) -> f64 {
        self.weight(node).unwrap_or(f64::INFINITY)
    }

    fn dist(&self, node: GridPos) -> GridPos {
        node
    }
}

/// Manhattan distance to `goal`; admissible for 4-way movement.
pub fn manhattan_to(goal: GridPos) -> impl Fn(GridPos) -> f64 {
    manhattan_scaled(goal, 1.0)
}

pub fn manhattan_scaled(goal: GridPos, min_weight: f64) -> impl Fn(GridPos) -> f64 {
    move |pos| (pos.x.abs_diff(goal.x) + pos.y.abs_diff(goal.y)) as f64 * min_weight
}

/// Chebyshev distance to `goal`; admissible for 8-way movement.
pub fn chebyshev_to(goal: GridPos) -> impl Fn(GridPos) -> f64 {
    chebyshev_scaled(goal, 1.0)
}

pub fn chebyshev_scaled(goal: GridPos, min_weight: f64) -> impl Fn(GridPos) -> f64 {
    move |pos| pos.x.abs_diff(goal.x).max(pos.y.abs_diff(goal.y)) as f64 * min_weight
}

/// Total entry cost of a path as returned by [`search`](crate::search).
///
/// `None` if any cell lies outside the grid.
pub fn path_cost(grid: &Grid, path: &[GridPos]) -> Option<f64> {
    path.iter().map(|&p| grid.weight(p)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors_of(grid: &Grid, pos: GridPos, diagonal: bool) -> Vec<GridPos> {
        let mut out = Vec::new();
        grid.neighbors(pos, diagonal, &mut out);
        out
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(Grid::new(vec![]), Err(GridError::Empty));
        assert_eq!(Grid::new(vec![vec![]]), Err(GridError::Empty));
    }

    #[test]
    fn test_new_rejects_ragged() {
        let err = Grid::new(vec![vec![1.0, 1.0], vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_new_rejects_bad_weight() {
        let err = Grid::new(vec![vec![1.0, -2.0]]).unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidWeight {
                x: 1,
                y: 0,
                weight: -2.0
            }
        );
        assert!(Grid::new(vec![vec![f64::INFINITY]]).is_err());
    }

    #[test]
    fn test_parse_map() {
        let grid = Grid::parse("..#\n\n.5.\r\n").unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.weight(GridPos::new(2, 0)), Some(0.0));
        assert_eq!(grid.weight(GridPos::new(1, 1)), Some(5.0));
        assert_eq!(grid.wall_count(), 1);
    }

    #[test]
    fn test_parse_reports_position() {
        let err = Grid::parse("...\n.x.\n").unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidCell {
                line: 2,
                column: 2,
                ch: 'x'
            }
        );
        assert!(err.to_string().contains("line 2, column 2"));
    }

    #[test]
    fn test_set_weight_bounds() {
        let mut grid = Grid::open(2, 2).unwrap();
        assert!(grid.set_wall(GridPos::new(1, 1)).is_ok());
        assert!(grid.is_wall(GridPos::new(1, 1)));
        assert!(matches!(
            grid.set_weight(GridPos::new(2, 0), 1.0),
            Err(GridError::OutOfBounds { x: 2, y: 0, .. })
        ));
        assert!(grid.set_weight(GridPos::new(0, 0), f64::NAN).is_err());
    }

    #[test]
    fn test_neighbors_orthogonal_order() {
        let grid = Grid::open(3, 3).unwrap();
        let center = GridPos::new(1, 1);
        assert_eq!(
            neighbors_of(&grid, center, false),
            vec![
                GridPos::new(0, 1),
                GridPos::new(2, 1),
                GridPos::new(1, 0),
                GridPos::new(1, 2),
            ]
        );
        assert_eq!(neighbors_of(&grid, center, true).len(), 8);
    }

    #[test]
    fn test_neighbors_clipped_at_corner() {
        let grid = Grid::open(3, 3).unwrap();
        let corner = GridPos::new(0, 0);
        assert_eq!(
            neighbors_of(&grid, corner, false),
            vec![GridPos::new(1, 0), GridPos::new(0, 1)]
        );
        assert_eq!(
            neighbors_of(&grid, corner, true),
            vec![GridPos::new(1, 0), GridPos::new(0, 1), GridPos::new(1, 1)]
        );
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = Grid::open(2, 2).unwrap();
        assert!(grid.is_wall(GridPos::new(5, 5)));
        assert_eq!(grid.weight(GridPos::new(5, 5)), None);
    }

    #[test]
    fn test_min_weight_skips_walls() {
        let grid = Grid::parse("#93\n45#").unwrap();
        assert_eq!(grid.min_weight(), Some(3.0));
        assert_eq!(Grid::parse("##").unwrap().min_weight(), None);
    }

    #[test]
    fn test_heuristics() {
        let goal = GridPos::new(4, 4);
        assert_eq!(manhattan_to(goal)(GridPos::new(0, 0)), 8.0);
        assert_eq!(chebyshev_to(goal)(GridPos::new(0, 1)), 4.0);
        assert_eq!(manhattan_scaled(goal, 2.0)(GridPos::new(4, 1)), 6.0);
        assert_eq!(chebyshev_scaled(goal, 0.5)(goal), 0.0);
    }

    #[test]
    fn test_path_cost() {
        let grid = Grid::parse("123\n456").unwrap();
        let path = [GridPos::new(1, 0), GridPos::new(1, 1), GridPos::new(2, 1)];
        assert_eq!(path_cost(&grid, &path), Some(2.0 + 5.0 + 6.0));
        assert_eq!(path_cost(&grid, &[]), Some(0.0));
    }

    #[test]
    fn test_path_cost_rejects_outside_cells() {
        let grid = Grid::parse("11\n11").unwrap();
        let path = [GridPos::new(1, 0), GridPos::new(2, 0), GridPos::new(1, 1)];
        assert_eq!(path_cost(&grid, &path), None);
    }

    #[test]
    fn test_open_rejects_zero_size() {
        assert_eq!(Grid::open(0, 0), Err(GridError::Empty));
        assert_eq!(Grid::open(3, 0), Err(GridError::Empty));
        assert_eq!(Grid::open(0, 3), Err(GridError::Empty));

        let grid = Grid::open(3, 2).unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.wall_count(), 0);
        assert_eq!(grid.min_weight(), Some(1.0));
    }

    #[test]
    fn test_grid_pos_json() {
        let pos = GridPos::new(3, 7);
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, r#"{"x":3,"y":7}"#);
        assert_eq!(serde_json::from_str::<GridPos>(&json).unwrap(), pos);
        assert!(serde_json::from_str::<GridPos>(r#"{"x":-1,"y":0}"#).is_err());
    }
}

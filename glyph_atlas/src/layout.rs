// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid layout of the atlas.

/// Grid position of a tile, in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zero-based column.
    pub col: u32,
    /// Zero-based row.
    pub row: u32,
}

/// A near-square grid of fixed-size tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    cols: u32,
    rows: u32,
    tile_size: u32,
}

impl GridLayout {
    /// Plans a grid with room for `count` tiles.
    ///
    /// `cols` is the ceiling of the square root of `count` and `rows` is just
    /// enough to hold the rest. A count of zero gives an empty grid.
    pub fn plan(count: u32, tile_size: u32) -> Self {
        if count == 0 {
            return Self {
                cols: 0,
                rows: 0,
                tile_size,
            };
        }
        let cols = ceil_sqrt(count);
        Self {
            cols,
            rows: count.div_ceil(cols),
            tile_size,
        }
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the tile edge length in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Returns the number of tiles the grid can hold, saturating at `u32::MAX`.
    pub fn capacity(&self) -> u32 {
        self.cols.saturating_mul(self.rows)
    }

    /// Returns the atlas image size in pixels as `(width, height)`.
    ///
    /// Returns `None` if either side does not fit in a `u32`.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        Some((
            self.tile_size.checked_mul(self.cols)?,
            self.tile_size.checked_mul(self.rows)?,
        ))
    }

    /// Returns the grid position of the tile at `index`, filling rows first.
    ///
    /// Returns `None` if `index` is beyond the grid's capacity.
    pub fn coord(&self, index: u32) -> Option<TileCoord> {
        (index < self.capacity()).then(|| TileCoord {
            col: index % self.cols,
            row: index / self.cols,
        })
    }

    /// Returns the grid positions of every tile in index order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.capacity()).filter_map(move |index| self.coord(index))
    }

    /// Returns the pixel position of the top-left corner of a tile.
    pub fn tile_origin(&self, coord: TileCoord) -> (i64, i64) {
        (
            i64::from(coord.col) * i64::from(self.tile_size),
            i64::from(coord.row) * i64::from(self.tile_size),
        )
    }
}

fn ceil_sqrt(n: u32) -> u32 {
    let n = u64::from(n);
    let mut root = (n as f64).sqrt() as u64;
    while root * root > n {
        root -= 1;
    }
    while root * root < n {
        root += 1;
    }
    root as u32
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn three_keys() {
        let grid = GridLayout::plan(3, 128);
        assert_eq!((grid.cols(), grid.rows()), (2, 2));
        assert_eq!(grid.image_size(), Some((256, 256)));
        assert_eq!(grid.coord(0), Some(TileCoord { col: 0, row: 0 }));
        assert_eq!(grid.coord(1), Some(TileCoord { col: 1, row: 0 }));
        assert_eq!(grid.coord(2), Some(TileCoord { col: 0, row: 1 }));
        assert_eq!(grid.tile_origin(TileCoord { col: 1, row: 1 }), (128, 128));
    }

    #[test]
    fn stock_key_count() {
        // 26 + 26 + 10 + 3 characters plus one icon.
        let grid = GridLayout::plan(66, 128);
        assert_eq!((grid.cols(), grid.rows()), (9, 8));
    }

    #[test]
    fn perfect_squares() {
        for side in 1..=40 {
            let grid = GridLayout::plan(side * side, 16);
            assert_eq!((grid.cols(), grid.rows()), (side, side));
        }
    }

    #[test]
    fn grid_always_fits() {
        for count in 1..=2000 {
            let grid = GridLayout::plan(count, 8);
            let cols = grid.cols();
            assert!(grid.capacity() >= count, "count {count}");
            assert!((cols - 1) * (cols - 1) < count, "count {count}");
            assert!(cols * cols >= count, "count {count}");
            assert!(grid.rows() <= cols, "count {count}");
        }
    }

    #[test]
    fn coordinates_are_unique_and_in_bounds() {
        let count = 67;
        let grid = GridLayout::plan(count, 32);
        let mut seen = HashSet::new();
        for index in 0..count {
            let coord = grid.coord(index).unwrap();
            assert!(coord.col < grid.cols());
            assert!(coord.row < grid.rows());
            assert!(seen.insert(coord));
        }
        assert_eq!(grid.coord(grid.capacity()), None);
        assert_eq!(grid.coords().count(), grid.capacity() as usize);
        assert_eq!(grid.coords().nth(10), grid.coord(10));
    }

    #[test]
    fn oversized_image_has_no_size() {
        let grid = GridLayout::plan(66, 600_000_000);
        assert_eq!((grid.cols(), grid.rows()), (9, 8));
        assert_eq!(grid.image_size(), None);
        assert_eq!(
            GridLayout::plan(4, u32::MAX / 2).image_size(),
            Some((u32::MAX - 1, u32::MAX - 1))
        );
    }

    #[test]
    fn largest_grid_capacity_saturates() {
        let grid = GridLayout::plan(u32::MAX, 1);
        assert_eq!((grid.cols(), grid.rows()), (65_536, 65_536));
        assert_eq!(grid.capacity(), u32::MAX);
    }

    #[test]
    fn zero_count_is_empty() {
        let grid = GridLayout::plan(0, 128);
        assert_eq!(grid.image_size(), Some((0, 0)));
        assert_eq!(grid.coord(0), None);
    }
}

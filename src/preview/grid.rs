//! Thumbnail grid layout
//!
//! Pure placement computation: given the available area and the natural size
//! of every image, pick the column count that maximizes the total displayed
//! area and produce one rectangle per image. Recomputed every frame the
//! overview is visible; never persisted.

use egui::{Pos2, Rect, Vec2};

/// Result of packing `n` images into an area
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    /// Size of one grid cell
    pub cell: Vec2,
    /// Scale applied to the first (representative) image; 1.0 at most
    pub scale: f32,
    /// One rectangle per image, row-major, in area-local coordinates
    pub rects: Vec<Rect>,
}

impl GridLayout {
    pub fn empty() -> Self {
        Self {
            columns: 0,
            rows: 0,
            cell: Vec2::ZERO,
            scale: 0.0,
            rects: Vec::new(),
        }
    }
}

fn fit_scale(cell: Vec2, image: Vec2) -> f32 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return 0.0;
    }
    // Images are never upscaled
    (cell.x / image.x).min(cell.y / image.y).min(1.0)
}

/// Pack `sizes.len()` images into `avail`, maximizing total displayed area.
///
/// Column counts from 1 to n are scanned; for each, every image is scaled to
/// fit its cell (capped at 1.0) and the summed on-screen area is the score.
/// Ties keep the first (lowest) column count encountered. Each image is
/// centered inside its cell, which centers every row within the container by
/// an equal per-column shift.
pub fn plan(avail: Vec2, sizes: &[Vec2]) -> GridLayout {
    let n = sizes.len();
    if n == 0 || avail.x <= 0.0 || avail.y <= 0.0 {
        return GridLayout::empty();
    }

    let mut best_columns = 1;
    let mut best_cell = Vec2::ZERO;
    let mut best_area = f32::MIN;

    for columns in 1..=n {
        let rows = n.div_ceil(columns);
        let cell = Vec2::new(avail.x / columns as f32, avail.y / rows as f32);

        let mut area = 0.0;
        for size in sizes {
            let scale = fit_scale(cell, *size);
            area += scale * scale * size.x * size.y;
        }

        if area > best_area {
            best_area = area;
            best_columns = columns;
            best_cell = cell;
        }
    }

    let columns = best_columns;
    let rows = n.div_ceil(columns);
    let cell = best_cell;

    let rects = sizes
        .iter()
        .enumerate()
        .map(|(i, size)| {
            let col = (i % columns) as f32;
            let row = (i / columns) as f32;
            let scale = fit_scale(cell, *size);
            let shown = *size * scale;
            let min = Pos2::new(
                col * cell.x + (cell.x - shown.x) / 2.0,
                row * cell.y + (cell.y - shown.y) / 2.0,
            );
            Rect::from_min_size(min, shown)
        })
        .collect();

    GridLayout {
        columns,
        rows,
        cell,
        scale: fit_scale(cell, sizes[0]),
        rects,
    }
}

/// Fit one image into the available area without upscaling; returns the
/// displayed rectangle centered horizontally and anchored to the top
pub fn fit_single(avail: Rect, image: Vec2) -> Rect {
    let scale = fit_scale(avail.size(), image);
    let shown = image * scale;
    let min = Pos2::new(avail.min.x + (avail.width() - shown.x) / 2.0, avail.min.y);
    Rect::from_min_size(min, shown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, w: f32, h: f32) -> Vec<Vec2> {
        vec![Vec2::new(w, h); n]
    }

    fn total_area_for(avail: Vec2, sizes: &[Vec2], columns: usize) -> f32 {
        let rows = sizes.len().div_ceil(columns);
        let cell = Vec2::new(avail.x / columns as f32, avail.y / rows as f32);
        sizes
            .iter()
            .map(|s| {
                let scale = fit_scale(cell, *s);
                scale * scale * s.x * s.y
            })
            .sum()
    }

    #[test]
    fn chosen_columns_maximize_total_area() {
        let cases: Vec<(Vec2, Vec<Vec2>)> = vec![
            (Vec2::new(400.0, 300.0), uniform(1, 512.0, 512.0)),
            (Vec2::new(400.0, 300.0), uniform(4, 512.0, 512.0)),
            (Vec2::new(600.0, 200.0), uniform(5, 512.0, 512.0)),
            (Vec2::new(200.0, 600.0), uniform(5, 512.0, 512.0)),
            (Vec2::new(333.0, 257.0), uniform(7, 640.0, 480.0)),
            (
                Vec2::new(350.0, 350.0),
                vec![
                    Vec2::new(512.0, 512.0),
                    Vec2::new(256.0, 512.0),
                    Vec2::new(512.0, 256.0),
                ],
            ),
        ];

        for (avail, sizes) in cases {
            let layout = plan(avail, &sizes);
            let chosen = total_area_for(avail, &sizes, layout.columns);
            for columns in 1..=sizes.len() {
                let other = total_area_for(avail, &sizes, columns);
                assert!(
                    chosen >= other - 1e-3,
                    "columns={} beats chosen {} for avail={avail:?} n={}",
                    columns,
                    layout.columns,
                    sizes.len()
                );
            }
        }
    }

    #[test]
    fn ties_resolve_to_the_smallest_column_count() {
        // Tiny images fit unscaled in every arrangement, so all column
        // counts score the same
        let sizes = uniform(4, 10.0, 10.0);
        let layout = plan(Vec2::new(1000.0, 1000.0), &sizes);
        assert_eq!(layout.columns, 1);
    }

    #[test]
    fn images_are_never_upscaled() {
        let sizes = vec![Vec2::new(64.0, 48.0), Vec2::new(32.0, 32.0)];
        let layout = plan(Vec2::new(800.0, 600.0), &sizes);
        for (rect, size) in layout.rects.iter().zip(&sizes) {
            assert!(rect.width() <= size.x + 1e-4);
            assert!(rect.height() <= size.y + 1e-4);
        }
        assert!(layout.scale <= 1.0);
    }

    #[test]
    fn layout_is_row_major_and_centered() {
        let sizes = uniform(4, 512.0, 512.0);
        let avail = Vec2::new(400.0, 400.0);
        let layout = plan(avail, &sizes);
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.rows, 2);
        assert_eq!(layout.rects.len(), 4);

        // Left to right, top to bottom
        assert!(layout.rects[0].min.x < layout.rects[1].min.x);
        assert_eq!(layout.rects[0].min.y, layout.rects[1].min.y);
        assert!(layout.rects[2].min.y > layout.rects[0].min.y);

        // Equal shift centers each image within its cell
        let left_margin = layout.rects[0].min.x;
        let right_margin = avail.x - layout.rects[1].max.x;
        assert!((left_margin - right_margin).abs() < 1e-3);
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        let layout = plan(Vec2::new(100.0, 100.0), &[]);
        assert_eq!(layout.rects.len(), 0);
        assert_eq!(layout.columns, 0);
    }

    #[test]
    fn single_image_fit_is_anchored_and_centered() {
        let avail = Rect::from_min_size(Pos2::new(10.0, 50.0), Vec2::new(200.0, 100.0));
        let rect = fit_single(avail, Vec2::new(400.0, 400.0));

        assert_eq!(rect.min.y, 50.0);
        assert!((rect.center().x - avail.center().x).abs() < 1e-3);
        assert!(rect.height() <= 100.0 + 1e-3);

        // Small images keep their natural size
        let small = fit_single(avail, Vec2::new(40.0, 30.0));
        assert_eq!(small.size(), Vec2::new(40.0, 30.0));
    }
}

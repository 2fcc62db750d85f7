use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{PadError, PadResult};
use crate::grid::{InputGrid, GRID_SIZE};

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Resampling used when the canvas is reduced to 28×28.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownsampleFilter {
    Nearest,
    /// Area-like averaging; the default.
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl DownsampleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            DownsampleFilter::Nearest => FilterType::Nearest,
            DownsampleFilter::Triangle => FilterType::Triangle,
            DownsampleFilter::CatmullRom => FilterType::CatmullRom,
            DownsampleFilter::Gaussian => FilterType::Gaussian,
            DownsampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// One pointer-down-to-pointer-up gesture. Only the last point matters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stroke {
    last: (f64, f64),
}

/// Freehand canvas input at `scale`× the grid resolution.
///
/// Ink lives in the alpha channel of an RGBA surface; `to_grid` downsamples
/// that channel to the 28×28 input.
#[derive(Debug, Clone)]
pub struct CanvasRasterizer {
    surface: RgbaImage,
    stroke: Option<Stroke>,
    filter: DownsampleFilter,
    stamps: usize,
}

impl CanvasRasterizer {
    /// A zero scale is bumped to 1 so the surface is never empty.
    pub fn new(scale: u32, filter: DownsampleFilter) -> CanvasRasterizer {
        let side = GRID_SIZE as u32 * scale.max(1);
        CanvasRasterizer {
            surface: RgbaImage::from_pixel(side, side, BLANK),
            stroke: None,
            filter,
            stamps: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Total brush stamps since the last `clear`.
    pub fn stamps_applied(&self) -> usize {
        self.stamps
    }

    pub fn begin_stroke(&mut self, x: f64, y: f64) -> PadResult<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(PadError::InvalidPoint { x, y });
        }
        self.stroke = Some(Stroke { last: (x, y) });
        Ok(())
    }

    /// Draws from the previous stroke point to `(x, y)` and returns the
    /// number of stamps applied.
    ///
    /// Stamps are spaced about one surface pixel apart: `floor(distance)`
    /// steps, the last landing on `(x, y)`. A zero-length move stamps once
    /// at `(x, y)`. Without an active stroke nothing is drawn.
    ///
    /// Steps whose disc cannot reach the surface are skipped and not
    /// counted, so the work is bounded by the surface size however far the
    /// points lie outside it.
    pub fn extend_stroke(&mut self, x: f64, y: f64, radius: f64) -> PadResult<usize> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PadError::InvalidBrush(radius));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(PadError::InvalidPoint { x, y });
        }
        let Some(stroke) = self.stroke.as_mut() else {
            return Ok(0);
        };

        let from = stroke.last;
        stroke.last = (x, y);

        let delta = (x - from.0, y - from.1);
        let steps = (delta.0 * delta.0 + delta.1 * delta.1).sqrt().floor();

        if steps == 0.0 {
            self.stamp(x, y, radius);
            return Ok(1);
        }

        let Some((first, last)) = self.reachable_steps(from, delta, steps, radius) else {
            trace!(steps, "canvas stroke segment off the surface");
            return Ok(0);
        };
        self.sweep(from, delta, steps, (first, last), radius);

        let applied = (last - first + 1.0) as usize;
        self.stamps = self.stamps.saturating_add(applied);
        trace!(steps, applied, "canvas stroke segment");
        Ok(applied)
    }

    /// Range of step indices `i` in `1..=steps` whose stamp center lies in
    /// the surface grown by `radius` on every side.
    fn reachable_steps(
        &self,
        from: (f64, f64),
        delta: (f64, f64),
        steps: f64,
        radius: f64,
    ) -> Option<(f64, f64)> {
        let bounds = [
            (-delta.0, from.0 + radius),
            (delta.0, self.surface.width() as f64 + radius - from.0),
            (-delta.1, from.1 + radius),
            (delta.1, self.surface.height() as f64 + radius - from.1),
        ];

        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (p, q) in bounds {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
            } else if p < 0.0 {
                t0 = t0.max(q / p);
            } else {
                t1 = t1.min(q / p);
            }
        }
        if t0 > t1 {
            return None;
        }

        let first = (t0 * steps).ceil().max(1.0);
        let last = (t1 * steps).floor().min(steps);
        (first <= last).then_some((first, last))
    }

    /// Inks every pixel covered by a stamp at step `i` for `i` in `range`.
    ///
    /// Works per pixel: the squared distance to the stamp centers is convex
    /// in `i`, so only the two steps around the pixel's projection onto the
    /// segment need checking.
    fn sweep(
        &mut self,
        from: (f64, f64),
        delta: (f64, f64),
        steps: f64,
        range: (f64, f64),
        radius: f64,
    ) {
        let center = |i: f64| {
            let t = i / steps;
            (from.0 + delta.0 * t, from.1 + delta.1 * t)
        };
        let (ax, ay) = center(range.0);
        let (bx, by) = center(range.1);

        let max_x = self.surface.width() as f64 - 1.0;
        let max_y = self.surface.height() as f64 - 1.0;
        let left = (ax.min(bx) - radius).floor().max(0.0);
        let right = (ax.max(bx) + radius).ceil().min(max_x);
        let top = (ay.min(by) - radius).floor().max(0.0);
        let bottom = (ay.max(by) + radius).ceil().min(max_y);
        if left > right || top > bottom {
            return;
        }

        let r2 = radius * radius;
        let len2 = delta.0 * delta.0 + delta.1 * delta.1;
        for py in top as u32..=bottom as u32 {
            for px in left as u32..=right as u32 {
                let (cx, cy) = (px as f64 + 0.5, py as f64 + 0.5);
                let nearest = ((cx - from.0) * delta.0 + (cy - from.1) * delta.1) / len2 * steps;
                let candidates = [
                    nearest.floor().clamp(range.0, range.1),
                    nearest.ceil().clamp(range.0, range.1),
                ];
                let covered = candidates.iter().any(|&i| {
                    let (sx, sy) = center(i);
                    let (ddx, ddy) = (cx - sx, cy - sy);
                    ddx * ddx + ddy * ddy <= r2
                });
                if covered {
                    self.surface.put_pixel(px, py, INK);
                }
            }
        }
    }

    pub fn end_stroke(&mut self) {
        self.stroke = None;
    }

    /// Fills a disc of `radius` around `(cx, cy)`, clipped to the surface.
    fn stamp(&mut self, cx: f64, cy: f64, radius: f64) {
        self.stamps += 1;

        let max_x = self.surface.width() as f64 - 1.0;
        let max_y = self.surface.height() as f64 - 1.0;
        let left = (cx - radius).floor().max(0.0);
        let right = (cx + radius).ceil().min(max_x);
        let top = (cy - radius).floor().max(0.0);
        let bottom = (cy + radius).ceil().min(max_y);
        if left > right || top > bottom {
            return;
        }

        let r2 = radius * radius;
        for py in top as u32..=bottom as u32 {
            for px in left as u32..=right as u32 {
                let ddx = px as f64 + 0.5 - cx;
                let ddy = py as f64 + 0.5 - cy;
                if ddx * ddx + ddy * ddy <= r2 {
                    self.surface.put_pixel(px, py, INK);
                }
            }
        }
    }

    /// Paints the entire surface opaque.
    pub fn fill_all(&mut self) {
        for pixel in self.surface.pixels_mut() {
            *pixel = INK;
        }
    }

    /// Downsamples to 28×28 and returns the alpha channel scaled to [0, 1].
    pub fn to_grid(&self) -> InputGrid {
        let small = imageops::resize(
            &self.surface,
            GRID_SIZE as u32,
            GRID_SIZE as u32,
            self.filter.filter_type(),
        );
        let values = small.pixels().map(|p| p.0[3] as f64 / 255.0).collect();
        InputGrid::from_flat(values).unwrap_or_default()
    }

    pub fn clear(&mut self) {
        for pixel in self.surface.pixels_mut() {
            *pixel = BLANK;
        }
        self.stroke = None;
        self.stamps = 0;
    }
}

impl Default for CanvasRasterizer {
    fn default() -> Self {
        CanvasRasterizer::new(10, DownsampleFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_stroke_stamp_count() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(0.0, 0.0).unwrap();
        let stamps = canvas.extend_stroke(10.0, 0.0, 1.0).unwrap();
        assert!(stamps >= 10);
        assert_eq!(canvas.stamps_applied(), stamps);
    }

    #[test]
    fn test_zero_length_stroke_stamps_once() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(40.0, 40.0).unwrap();
        assert_eq!(canvas.extend_stroke(40.0, 40.0, 3.0).unwrap(), 1);
        assert_eq!(canvas.surface().get_pixel(40, 40).0[3], 255);
    }

    #[test]
    fn test_sub_pixel_move_stamps_once() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(40.0, 40.0).unwrap();
        assert_eq!(canvas.extend_stroke(40.4, 40.3, 2.0).unwrap(), 1);
    }

    #[test]
    fn test_extend_without_stroke_draws_nothing() {
        let mut canvas = CanvasRasterizer::default();
        assert_eq!(canvas.extend_stroke(10.0, 10.0, 5.0).unwrap(), 0);
        canvas.begin_stroke(0.0, 0.0).unwrap();
        canvas.end_stroke();
        assert_eq!(canvas.extend_stroke(10.0, 10.0, 5.0).unwrap(), 0);
        assert!(canvas.to_grid().is_blank());
    }

    #[test]
    fn test_invalid_radius() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(0.0, 0.0).unwrap();
        assert!(matches!(canvas.extend_stroke(1.0, 1.0, 0.0), Err(PadError::InvalidBrush(_))));
        assert!(canvas.extend_stroke(1.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_segment_is_continuous() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(20.0, 100.0).unwrap();
        canvas.extend_stroke(200.0, 100.0, 1.0).unwrap();
        for x in 20..200 {
            assert_eq!(canvas.surface().get_pixel(x, 99).0[3], 255, "gap at x={x}");
        }
    }

    #[test]
    fn test_stamp_clipped_at_edges() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(-5.0, -5.0).unwrap();
        canvas.extend_stroke(-5.0, -5.0, 10.0).unwrap();
        assert_eq!(canvas.surface().get_pixel(0, 0).0[3], 255);

        canvas.begin_stroke(1000.0, 1000.0).unwrap();
        assert_eq!(canvas.extend_stroke(1000.0, 1000.0, 2.0).unwrap(), 1);
    }

    #[test]
    fn test_far_move_only_stamps_near_surface() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(0.0, 0.0).unwrap();
        let started = std::time::Instant::now();
        let stamps = canvas.extend_stroke(1e15, 0.0, 12.0).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        // One stamp per unit from x=1 up to the surface edge plus the radius.
        assert!((290..=293).contains(&stamps), "stamps = {stamps}");
        assert_eq!(canvas.stamps_applied(), stamps);
        assert_eq!(canvas.surface().get_pixel(279, 0).0[3], 255);
        assert_eq!(canvas.surface().get_pixel(279, 20).0[3], 0);
    }

    #[test]
    fn test_segment_crossing_from_far_outside() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(-1e12, 140.0).unwrap();
        let stamps = canvas.extend_stroke(1e12, 140.0, 3.0).unwrap();
        assert!(stamps > 280 && stamps < 300, "stamps = {stamps}");
        for x in 0..280 {
            assert_eq!(canvas.surface().get_pixel(x, 140).0[3], 255, "gap at x={x}");
        }
        assert_eq!(canvas.surface().get_pixel(140, 150).0[3], 0);
    }

    #[test]
    fn test_segment_missing_surface_applies_nothing() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(-500.0, -500.0).unwrap();
        assert_eq!(canvas.extend_stroke(500.0, -400.0, 5.0).unwrap(), 0);
        assert!(canvas.to_grid().is_blank());
    }

    #[test]
    fn test_non_finite_points_rejected() {
        let mut canvas = CanvasRasterizer::default();
        assert!(matches!(canvas.begin_stroke(f64::NAN, 0.0), Err(PadError::InvalidPoint { .. })));
        assert!(!canvas.is_stroking());
        canvas.begin_stroke(0.0, 0.0).unwrap();
        assert!(matches!(
            canvas.extend_stroke(f64::INFINITY, 0.0, 2.0),
            Err(PadError::InvalidPoint { .. })
        ));
        assert_eq!(canvas.stamps_applied(), 0);
    }

    #[test]
    fn test_full_canvas_downsamples_to_ones() {
        let mut canvas = CanvasRasterizer::default();
        canvas.fill_all();
        let grid = canvas.to_grid();
        assert!(grid.as_slice().iter().all(|&v| (v - 1.0).abs() < 1e-2));
    }

    #[test]
    fn test_nearest_filter_full_canvas() {
        let mut canvas = CanvasRasterizer::new(4, DownsampleFilter::Nearest);
        canvas.fill_all();
        assert!(canvas.to_grid().as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_stroke_lands_in_matching_cell() {
        let mut canvas = CanvasRasterizer::new(10, DownsampleFilter::Nearest);
        // Center of grid cell (row 5, col 14).
        canvas.begin_stroke(145.0, 55.0).unwrap();
        canvas.extend_stroke(145.0, 55.0, 8.0).unwrap();
        let grid = canvas.to_grid();
        assert_eq!(grid.get(5, 14), 1.0);
        assert_eq!(grid.get(20, 3), 0.0);
    }

    #[test]
    fn test_clear_erases_and_ends_stroke() {
        let mut canvas = CanvasRasterizer::default();
        canvas.begin_stroke(0.0, 0.0).unwrap();
        canvas.extend_stroke(50.0, 50.0, 6.0).unwrap();
        canvas.clear();
        assert!(!canvas.is_stroking());
        assert_eq!(canvas.stamps_applied(), 0);
        assert!(canvas.to_grid().is_blank());
    }

    #[test]
    fn test_surface_size_follows_scale() {
        let canvas = CanvasRasterizer::new(0, DownsampleFilter::Triangle);
        assert_eq!(canvas.width(), 28);
        let canvas = CanvasRasterizer::new(10, DownsampleFilter::Triangle);
        assert_eq!((canvas.width(), canvas.height()), (280, 280));
    }
}

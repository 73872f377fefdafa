//! Brush rendering engine.
//!
//! Five deterministic algorithms paint recorded stroke geometry onto a
//! [`PixelSurface`]. Determinism matters because remote peers reconstruct
//! strokes from vector events alone, never pixel data. The one exception is
//! the spray brush, which re-samples its scatter on every invocation; its
//! replay is statistically rather than pixel equivalent.
//!
//! Two modes share the same per-kind algorithm: incremental mode paints only
//! the newest segment of an active stroke, full mode re-renders a completed
//! stroke from its first point. Compositing (source-over vs. destination-out)
//! is selected per stroke, which is why undoing an eraser stroke requires a
//! full history replay rather than overdrawing.

use crate::stroke::{BrushKind, Stroke};
use crate::surface::PixelSurface;
use kurbo::Point;
use rand::Rng;

const HIGHLIGHTER_ALPHA: f32 = 0.3;
const SPRAY_ALPHA: f32 = 0.4;

/// Painted line width for a brush kind.
fn stroke_width(brush: BrushKind, base_size: f64) -> f64 {
    match brush {
        BrushKind::Normal | BrushKind::Spray => base_size,
        BrushKind::Calligraphy => base_size * 1.4,
        BrushKind::Highlighter | BrushKind::Eraser => base_size * 3.0,
    }
}

/// Source opacity for a brush kind.
fn stroke_alpha(brush: BrushKind) -> f32 {
    match brush {
        BrushKind::Normal | BrushKind::Calligraphy | BrushKind::Eraser => 1.0,
        BrushKind::Highlighter => HIGHLIGHTER_ALPHA,
        BrushKind::Spray => SPRAY_ALPHA,
    }
}

/// Incremental mode: paint only what the stroke's newest point added.
///
/// For polyline brushes that is the segment from the previous point; a stroke
/// that still has a single point paints nothing. The spray brush scatters
/// around the newest point regardless.
pub fn render_latest(stroke: &Stroke, surface: &mut PixelSurface) {
    match stroke.brush {
        BrushKind::Spray => {
            if let Some(point) = stroke.points.last() {
                spray_at(*point, stroke, surface);
            }
        }
        _ => {
            let n = stroke.points.len();
            if n >= 2 {
                paint_capsule(stroke.points[n - 2], stroke.points[n - 1], stroke, surface);
            }
        }
    }
}

/// Full mode: paint a complete stroke from scratch.
///
/// A finalized single-point polyline stroke degenerates to one round dot
/// (round cap with no segment).
pub fn render_stroke(stroke: &Stroke, surface: &mut PixelSurface) {
    match stroke.brush {
        BrushKind::Spray => {
            for point in &stroke.points {
                spray_at(*point, stroke, surface);
            }
        }
        _ => match stroke.points.as_slice() {
            [] => {}
            [only] => paint_capsule(*only, *only, stroke, surface),
            points => {
                for window in points.windows(2) {
                    paint_capsule(window[0], window[1], stroke, surface);
                }
            }
        },
    }
}

/// Paint the thick segment from `a` to `b` with round caps. `a == b` paints a
/// single round dot.
fn paint_capsule(a: Point, b: Point, stroke: &Stroke, surface: &mut PixelSurface) {
    let radius = stroke_width(stroke.brush, stroke.base_size) / 2.0;
    let alpha = stroke_alpha(stroke.brush);
    let color = stroke.color.to_f32();
    let destructive = stroke.brush.is_destructive();

    let min_x = ((a.x.min(b.x) - radius).floor() as i64).max(0);
    let max_x = ((a.x.max(b.x) + radius).ceil() as i64).min(surface.width() as i64 - 1);
    let min_y = ((a.y.min(b.y) - radius).floor() as i64).max(0);
    let max_y = ((a.y.max(b.y) + radius).ceil() as i64).min(surface.height() as i64 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if segment_distance(center, a, b) <= radius {
                if destructive {
                    surface.erase_pixel(x as u32, y as u32, 1.0);
                } else {
                    surface.blend_pixel(x as u32, y as u32, color, alpha);
                }
            }
        }
    }
}

/// Scatter translucent dots around a single point.
fn spray_at(point: Point, stroke: &Stroke, surface: &mut PixelSurface) {
    let mut rng = rand::thread_rng();
    let density = (stroke.base_size * 1.5).max(10.0) as usize;
    let dot_radius = stroke.base_size / 10.0;
    let spread = stroke.base_size;
    let color = stroke.color.to_f32();

    for _ in 0..density {
        let dx: f64 = rng.gen_range(-spread..=spread);
        let dy: f64 = rng.gen_range(-spread..=spread);
        paint_dot(
            Point::new(point.x + dx, point.y + dy),
            dot_radius,
            color,
            SPRAY_ALPHA,
            surface,
        );
    }
}

/// Fill a disc with source-over blending.
fn paint_dot(center: Point, radius: f64, color: [f32; 3], alpha: f32, surface: &mut PixelSurface) {
    let min_x = ((center.x - radius).floor() as i64).max(0);
    let max_x = ((center.x + radius).ceil() as i64).min(surface.width() as i64 - 1);
    let min_y = ((center.y - radius).floor() as i64).max(0);
    let max_y = ((center.y + radius).ceil() as i64).min(surface.height() as i64 - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if (px - center).hypot() <= radius {
                surface.blend_pixel(x as u32, y as u32, color, alpha);
            }
        }
    }
}

/// Distance from `p` to the segment `a..b`, degenerating to point distance
/// when the segment has no length.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let line = b - a;
    let len_sq = line.hypot2();
    if len_sq < f64::EPSILON {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(line) / len_sq).clamp(0.0, 1.0);
    (p - (a + line * t)).hypot()
}

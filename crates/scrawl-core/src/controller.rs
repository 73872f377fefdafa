//! Local pointer lifecycle: Idle → Drawing → Idle.
//!
//! Each handler paints the local surface immediately and reports the event to
//! broadcast, if any. Input that does not match the current state (an extend
//! or end while idle) is a silent no-op; pointer devices deliver spurious
//! events, e.g. a pointer-up outside the surface.

use crate::brush;
use crate::history::History;
use crate::protocol::WireEvent;
use crate::stroke::{ActiveStrokeTable, BrushKind, Rgb, Stroke, StrokeError};
use crate::surface::PixelSurface;
use kurbo::Point;
use std::time::{Duration, Instant};

/// Outbound extend events are throttled to at most one per this interval
/// (roughly one frame at 60 Hz) so a fast pointer does not flood the relay.
/// Begin and end events are never throttled.
pub const EXTEND_INTERVAL: Duration = Duration::from_millis(16);

/// Throttling clock for outbound extend events. The stroke state itself lives
/// in the shared [`ActiveStrokeTable`], keyed by the local author id.
#[derive(Debug, Default)]
pub struct InputController {
    last_extend_emit: Option<Instant>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer down: create the local active stroke. Nothing is painted yet;
    /// the first point has no segment.
    pub fn begin(
        &mut self,
        author: &str,
        point: Point,
        color: Rgb,
        size: f64,
        brush: BrushKind,
        table: &mut ActiveStrokeTable,
    ) -> Result<WireEvent, StrokeError> {
        let stroke = Stroke::new(point, color, size, brush, author)?;
        if table.begin(stroke).is_some() {
            log::debug!("local begin replaced an unfinished stroke");
        }
        self.last_extend_emit = None;
        Ok(WireEvent::Begin {
            author_id: author.to_string(),
            x: point.x,
            y: point.y,
            color,
            size,
            brush,
        })
    }

    /// Pointer move: append the point, paint the new segment, and emit unless
    /// the throttle window is still open. A throttled point is still recorded
    /// and painted locally; remote peers simply reconstruct a coarser
    /// polyline.
    pub fn extend(
        &mut self,
        author: &str,
        point: Point,
        table: &mut ActiveStrokeTable,
        surface: &mut PixelSurface,
    ) -> Option<WireEvent> {
        let stroke = table.get_mut(author)?;
        stroke.add_point(point);
        brush::render_latest(stroke, surface);

        let now = Instant::now();
        let due = self
            .last_extend_emit
            .is_none_or(|last| now.duration_since(last) >= EXTEND_INTERVAL);
        if !due {
            return None;
        }
        self.last_extend_emit = Some(now);
        Some(WireEvent::Extend {
            author_id: author.to_string(),
            x: point.x,
            y: point.y,
        })
    }

    /// Pointer up: finalize the active stroke into history. The lift point is
    /// not appended; the last extend already recorded the stroke's end.
    pub fn end(
        &mut self,
        author: &str,
        point: Point,
        table: &mut ActiveStrokeTable,
        history: &mut History,
    ) -> Option<WireEvent> {
        let stroke = table.take(author)?;
        history.finalize(stroke);
        Some(WireEvent::End {
            author_id: author.to_string(),
            x: point.x,
            y: point.y,
        })
    }

    /// Whether the local author currently has a stroke in progress.
    pub fn is_drawing(&self, author: &str, table: &ActiveStrokeTable) -> bool {
        table.contains(author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: &str = "local";

    fn fixtures() -> (InputController, ActiveStrokeTable, History, PixelSurface) {
        (
            InputController::new(),
            ActiveStrokeTable::new(),
            History::new(),
            PixelSurface::new(40, 20),
        )
    }

    #[test]
    fn test_begin_extend_end_records_stroke() {
        let (mut ctl, mut table, mut history, mut surface) = fixtures();

        let begin = ctl
            .begin(AUTHOR, Point::new(0.0, 10.0), Rgb::new(255, 0, 0), 5.0, BrushKind::Normal, &mut table)
            .unwrap();
        assert!(matches!(begin, WireEvent::Begin { .. }));
        assert!(ctl.is_drawing(AUTHOR, &table));
        // Begin paints nothing
        assert_eq!(surface.painted_pixel_count(), 0);

        let extend = ctl.extend(AUTHOR, Point::new(20.0, 10.0), &mut table, &mut surface);
        assert!(extend.is_some());
        assert!(surface.painted_pixel_count() > 0);

        let end = ctl.end(AUTHOR, Point::new(20.0, 10.0), &mut table, &mut history);
        assert!(matches!(end, Some(WireEvent::End { .. })));
        assert!(!ctl.is_drawing(AUTHOR, &table));

        assert_eq!(history.len(), 1);
        let stroke = &history.strokes()[0];
        assert_eq!(stroke.points, vec![Point::new(0.0, 10.0), Point::new(20.0, 10.0)]);
        assert_eq!(stroke.author, AUTHOR);
    }

    #[test]
    fn test_extend_while_idle_is_ignored() {
        let (mut ctl, mut table, _, mut surface) = fixtures();
        let event = ctl.extend(AUTHOR, Point::new(5.0, 5.0), &mut table, &mut surface);
        assert!(event.is_none());
        assert!(table.is_empty());
        assert_eq!(surface.painted_pixel_count(), 0);
    }

    #[test]
    fn test_end_while_idle_is_ignored() {
        let (mut ctl, mut table, mut history, _) = fixtures();
        assert!(ctl.end(AUTHOR, Point::new(5.0, 5.0), &mut table, &mut history).is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let (mut ctl, mut table, _, _) = fixtures();
        let result = ctl.begin(
            AUTHOR,
            Point::new(0.0, 0.0),
            Rgb::black(),
            0.0,
            BrushKind::Normal,
            &mut table,
        );
        assert!(result.is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_rapid_extends_are_throttled_on_the_wire() {
        let (mut ctl, mut table, _, mut surface) = fixtures();
        ctl.begin(AUTHOR, Point::new(0.0, 10.0), Rgb::black(), 5.0, BrushKind::Normal, &mut table)
            .unwrap();

        // The first extend after begin always goes out
        let first = ctl.extend(AUTHOR, Point::new(1.0, 10.0), &mut table, &mut surface);
        assert!(first.is_some());

        // Immediately-following extends fall inside the 16 ms window
        let second = ctl.extend(AUTHOR, Point::new(2.0, 10.0), &mut table, &mut surface);
        assert!(second.is_none());

        // Throttled points are still recorded locally
        assert_eq!(table.get(AUTHOR).unwrap().len(), 3);
    }

    #[test]
    fn test_begin_and_end_are_never_throttled() {
        let (mut ctl, mut table, mut history, mut surface) = fixtures();
        for _ in 0..3 {
            let begin = ctl.begin(
                AUTHOR,
                Point::new(0.0, 0.0),
                Rgb::black(),
                5.0,
                BrushKind::Normal,
                &mut table,
            );
            assert!(begin.is_ok());
            ctl.extend(AUTHOR, Point::new(5.0, 0.0), &mut table, &mut surface);
            let end = ctl.end(AUTHOR, Point::new(5.0, 0.0), &mut table, &mut history);
            assert!(end.is_some());
        }
        assert_eq!(history.len(), 3);
    }
}

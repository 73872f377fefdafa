//! Completed-stroke history with global undo/redo and full replay.
//!
//! The history is the authoritative record of the canvas; the pixel surface is
//! derived from it. Undo and redo pop the globally most recent stroke, whoever
//! drew it; there is no per-author scoping.

use crate::brush;
use crate::stroke::Stroke;
use crate::surface::PixelSurface;

#[derive(Debug, Default)]
pub struct History {
    /// Finished strokes in arrival order.
    completed: Vec<Stroke>,
    /// Undone strokes, most recent last. Only valid against an unmodified
    /// tail: any non-redo append clears it.
    redo: Vec<Stroke>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished stroke and invalidate the redo buffer.
    ///
    /// Returns false for a zero-point stroke, which is dropped rather than
    /// recorded.
    pub fn finalize(&mut self, stroke: Stroke) -> bool {
        if stroke.is_empty() {
            log::debug!("dropping empty stroke from {:?}", stroke.author);
            return false;
        }
        self.completed.push(stroke);
        self.redo.clear();
        true
    }

    /// Move the most recent stroke to the redo buffer.
    /// Returns false (and changes nothing) when the history is empty.
    pub fn undo(&mut self) -> bool {
        match self.completed.pop() {
            Some(stroke) => {
                self.redo.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Move the most recently undone stroke back into the history.
    /// Returns false (and changes nothing) when the redo buffer is empty.
    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(stroke) => {
                self.completed.push(stroke);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.completed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.completed
    }

    pub fn redo_strokes(&self) -> &[Stroke] {
        &self.redo
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Rebuild the surface from scratch: clear to the background color, then
    /// render every completed stroke in order with its own compositing mode.
    pub fn replay_all(&self, surface: &mut PixelSurface) {
        surface.clear_to_background();
        for stroke in &self.completed {
            brush::render_stroke(stroke, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{BrushKind, Rgb};
    use kurbo::Point;

    fn line_stroke(brush: BrushKind, y: f64) -> Stroke {
        let mut s = Stroke::new(Point::new(2.0, y), Rgb::new(255, 0, 0), 4.0, brush, "a").unwrap();
        s.add_point(Point::new(38.0, y));
        s
    }

    #[test]
    fn test_finalize_clears_redo() {
        let mut history = History::new();
        history.finalize(line_stroke(BrushKind::Normal, 5.0));
        history.finalize(line_stroke(BrushKind::Normal, 10.0));

        assert!(history.undo());
        assert!(history.can_redo());

        // New stroke invalidates the redo tail
        history.finalize(line_stroke(BrushKind::Normal, 15.0));
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_undo_then_redo_restores_history() {
        let mut history = History::new();
        history.finalize(line_stroke(BrushKind::Normal, 5.0));
        history.finalize(line_stroke(BrushKind::Spray, 10.0));
        let before = history.strokes().to_vec();

        assert!(history.undo());
        assert_eq!(history.len(), 1);
        assert_eq!(history.redo_strokes().len(), 1);
        assert!(history.redo());
        assert_eq!(history.strokes(), &before[..]);
    }

    #[test]
    fn test_undo_redo_noop_when_empty() {
        let mut history = History::new();
        assert!(!history.undo());
        assert!(!history.redo());
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_replay_shows_only_completed_strokes() {
        let mut history = History::new();
        history.finalize(line_stroke(BrushKind::Normal, 5.0));
        history.finalize(line_stroke(BrushKind::Normal, 15.0));
        assert!(history.undo());

        let mut surface = PixelSurface::new(40, 20);
        history.replay_all(&mut surface);

        assert_eq!(surface.pixel(20, 5), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(surface.pixel(20, 15), Some(surface.background()));
    }

    #[test]
    fn test_undoing_an_eraser_restores_what_it_removed() {
        let mut history = History::new();
        let mut surface = PixelSurface::new(40, 20);

        let ink = line_stroke(BrushKind::Normal, 10.0);
        history.finalize(ink.clone());
        history.replay_all(&mut surface);
        let with_ink = surface.pixels().to_vec();

        // Eraser crosses the ink, destroying pixels
        history.finalize(line_stroke(BrushKind::Eraser, 10.0));
        history.replay_all(&mut surface);
        assert_eq!(surface.pixel(20, 10), Some([0.0, 0.0, 0.0, 0.0]));

        // Undo the eraser: replay must fully restore the ink
        assert!(history.undo());
        history.replay_all(&mut surface);
        assert_eq!(surface.pixels(), &with_ink[..]);
    }

    #[test]
    fn test_replay_equals_incremental_finalization() {
        let strokes = vec![
            line_stroke(BrushKind::Normal, 4.0),
            line_stroke(BrushKind::Highlighter, 9.0),
            line_stroke(BrushKind::Eraser, 4.0),
        ];

        let mut incremental = History::new();
        for stroke in strokes.clone() {
            incremental.finalize(stroke);
        }

        let mut all_at_once = History::new();
        for stroke in strokes {
            all_at_once.finalize(stroke);
        }

        assert_eq!(incremental.strokes(), all_at_once.strokes());

        let mut a = PixelSurface::new(40, 20);
        incremental.replay_all(&mut a);
        let mut b = PixelSurface::new(40, 20);
        all_at_once.replay_all(&mut b);
        assert_eq!(a.pixels(), b.pixels());
    }
}

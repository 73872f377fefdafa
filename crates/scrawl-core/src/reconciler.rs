//! Applies relay events from remote authors to the shared canvas state.
//!
//! The relay offers no delivery guarantees beyond per-sender ordering, so
//! every out-of-shape event has a defined, non-fatal response: a duplicate
//! begin replaces the author's active stroke (a lost end must not wedge the
//! slot), an extend with no active stroke is dropped, an end with no active
//! stroke is a no-op, and anything authored by the local peer is discarded as
//! relay loop-back.

use crate::history::History;
use crate::protocol::WireEvent;
use crate::stroke::{ActiveStrokeTable, Stroke};
use crate::surface::PixelSurface;
use crate::brush;
use kurbo::Point;

/// What an inbound event did, so the caller knows whether a replay is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Dropped: loop-back, state mismatch, or invalid payload.
    Ignored,
    /// A new active stroke is being tracked; nothing painted yet.
    Tracked,
    /// The surface was painted incrementally.
    Painted,
    /// A remote stroke entered history.
    Finalized,
    /// History was restructured; the surface needs a full replay.
    NeedsReplay,
}

/// Apply one inbound event on behalf of its remote author.
pub fn apply(
    event: &WireEvent,
    local_author: &str,
    table: &mut ActiveStrokeTable,
    history: &mut History,
    surface: &mut PixelSurface,
) -> Applied {
    // Loop-back suppression: the relay should never echo our own events, but
    // a naive client must not redraw its strokes twice if it does.
    if event.author_id() == Some(local_author) {
        log::debug!("discarding looped-back event from {local_author}");
        return Applied::Ignored;
    }

    match event {
        WireEvent::Begin { author_id, x, y, color, size, brush } => {
            let stroke = match Stroke::new(Point::new(*x, *y), *color, *size, *brush, author_id) {
                Ok(stroke) => stroke,
                Err(err) => {
                    log::debug!("dropping invalid begin from {author_id}: {err}");
                    return Applied::Ignored;
                }
            };
            if table.begin(stroke).is_some() {
                log::debug!("duplicate begin from {author_id} replaced an active stroke");
            }
            Applied::Tracked
        }
        WireEvent::Extend { author_id, x, y } => match table.get_mut(author_id) {
            Some(stroke) => {
                stroke.add_point(Point::new(*x, *y));
                brush::render_latest(stroke, surface);
                Applied::Painted
            }
            None => {
                log::debug!("dropping orphan extend from {author_id}");
                Applied::Ignored
            }
        },
        WireEvent::End { author_id, .. } => match table.take(author_id) {
            Some(stroke) => {
                history.finalize(stroke);
                Applied::Finalized
            }
            None => Applied::Ignored,
        },
        // Control events carry no author scoping; they pop whatever is
        // globally most recent, mirroring the local undo/redo behavior.
        WireEvent::Undo => {
            if history.undo() {
                Applied::NeedsReplay
            } else {
                Applied::Ignored
            }
        }
        WireEvent::Redo => {
            if history.redo() {
                Applied::NeedsReplay
            } else {
                Applied::Ignored
            }
        }
        // Identity assignment is a connection concern, handled upstream.
        WireEvent::Welcome { .. } => Applied::Ignored,
    }
}

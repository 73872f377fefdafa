//! The whiteboard: one shared canvas as seen by one peer.
//!
//! [`Whiteboard`] ties together the pixel surface, the stroke history, the
//! table of in-progress strokes, the local input controller and the remote
//! reconciler behind a pointer-and-event API. Outbound events are
//! queued rather than sent; the owner drains them with [`Whiteboard::take_outgoing`]
//! and pushes them to whatever transport it uses.

use crate::controller::InputController;
use crate::history::History;
use crate::protocol::WireEvent;
use crate::reconciler::{self, Applied};
use crate::stroke::{ActiveStrokeTable, BrushKind, Rgb, Stroke, StrokeError};
use crate::surface::PixelSurface;
use kurbo::Point;

/// Drawing style applied to the next stroke the local author begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub color: Rgb,
    pub size: f64,
    pub brush: BrushKind,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Rgb::black(),
            size: 5.0,
            brush: BrushKind::Normal,
        }
    }
}

pub struct Whiteboard {
    /// Local author identity. Starts as a placeholder until the relay's
    /// welcome assigns the real one.
    author: String,
    settings: BrushSettings,
    surface: PixelSurface,
    history: History,
    /// In-progress strokes, local and remote alike, keyed by author id.
    active: ActiveStrokeTable,
    controller: InputController,
    /// Pending events for the transport, drained by `take_outgoing`.
    outgoing: Vec<WireEvent>,
}

impl Whiteboard {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            author: String::from("local"),
            settings: BrushSettings::default(),
            surface: PixelSurface::new(width, height),
            history: History::new(),
            active: ActiveStrokeTable::new(),
            controller: InputController::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Adopt a relay-assigned identity. Any stroke in progress under the old
    /// id is abandoned; in practice the welcome arrives before first input.
    pub fn set_author(&mut self, author: impl Into<String>) {
        let author = author.into();
        if self.active.take(&self.author).is_some() {
            log::warn!("author changed mid-stroke, abandoning active stroke");
        }
        self.author = author;
    }

    pub fn settings(&self) -> BrushSettings {
        self.settings
    }

    pub fn settings_mut(&mut self) -> &mut BrushSettings {
        &mut self.settings
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Strokes currently in progress, local or remote.
    pub fn active_strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.active.iter()
    }

    pub fn is_drawing(&self) -> bool {
        self.controller.is_drawing(&self.author, &self.active)
    }

    // --- Local input ---

    /// Pointer down: begin a stroke with the current brush settings.
    pub fn pointer_down(&mut self, point: Point) -> Result<(), StrokeError> {
        let event = self.controller.begin(
            &self.author,
            point,
            self.settings.color,
            self.settings.size,
            self.settings.brush,
            &mut self.active,
        )?;
        self.outgoing.push(event);
        Ok(())
    }

    /// Pointer move with the button held. A no-op while idle.
    pub fn pointer_move(&mut self, point: Point) {
        if let Some(event) =
            self.controller
                .extend(&self.author, point, &mut self.active, &mut self.surface)
        {
            self.outgoing.push(event);
        }
    }

    /// Pointer up: finalize the stroke into history. A no-op while idle.
    pub fn pointer_up(&mut self, point: Point) {
        if let Some(event) =
            self.controller
                .end(&self.author, point, &mut self.active, &mut self.history)
        {
            self.outgoing.push(event);
        }
    }

    // --- History controls ---

    /// Undo the most recent completed stroke, whoever drew it. Broadcasts
    /// only when something was actually undone.
    pub fn undo(&mut self) -> bool {
        if self.history.undo() {
            self.history.replay_all(&mut self.surface);
            self.outgoing.push(WireEvent::Undo);
            true
        } else {
            false
        }
    }

    /// Redo the most recently undone stroke. Broadcasts only on success.
    pub fn redo(&mut self) -> bool {
        if self.history.redo() {
            self.history.replay_all(&mut self.surface);
            self.outgoing.push(WireEvent::Redo);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Remote events ---

    /// Apply one inbound relay event.
    pub fn apply_remote(&mut self, event: &WireEvent) {
        if let WireEvent::Welcome { peer_id } = event {
            log::info!("relay assigned author id {peer_id}");
            self.set_author(peer_id.clone());
            return;
        }
        let applied = reconciler::apply(
            event,
            &self.author,
            &mut self.active,
            &mut self.history,
            &mut self.surface,
        );
        if applied == Applied::NeedsReplay {
            self.history.replay_all(&mut self.surface);
        }
    }

    /// Decode and apply one inbound relay message. Malformed messages are
    /// dropped; a misbehaving peer must not take the canvas down.
    pub fn apply_remote_json(&mut self, json: &str) {
        match WireEvent::decode(json) {
            Ok(event) => self.apply_remote(&event),
            Err(err) => log::debug!("dropping inbound message: {err}"),
        }
    }

    // --- Surface management ---

    /// Resize the surface and rebuild it from history.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.history.replay_all(&mut self.surface);
    }

    // --- Outbound queue ---

    /// Drain pending outbound events for the transport.
    pub fn take_outgoing(&mut self) -> Vec<WireEvent> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }
}

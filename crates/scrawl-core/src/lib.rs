//! Scrawl Core Library
//!
//! Stroke model, raster engine and relay synchronization for the Scrawl
//! shared canvas.

pub mod brush;
pub mod canvas;
pub mod controller;
pub mod history;
pub mod net;
pub mod protocol;
pub mod reconciler;
pub mod stroke;
pub mod surface;

pub use canvas::{BrushSettings, Whiteboard};
pub use controller::{EXTEND_INTERVAL, InputController};
pub use history::History;
pub use net::{ConnectionState, NetEvent, RelayClient};
pub use protocol::{ProtocolError, WireEvent};
pub use reconciler::Applied;
pub use stroke::{ActiveStrokeTable, BrushKind, Rgb, Stroke, StrokeError};
pub use surface::PixelSurface;

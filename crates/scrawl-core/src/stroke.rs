//! Stroke and point model for the shared canvas.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from constructing model values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrokeError {
    #[error("brush size must be positive, got {0}")]
    NonPositiveSize(f64),
    #[error("invalid color literal: {0:?}")]
    InvalidColor(String),
}

/// An opaque RGB color. Carried on the wire as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(hex: &str) -> Result<Self, StrokeError> {
        let err = || StrokeError::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(err)?;
        // Reject non-ASCII before slicing: byte offsets below must not land
        // inside a multi-byte character
        if !digits.is_ascii() {
            return Err(err());
        }
        match digits.len() {
            3 => {
                let r = u8::from_str_radix(&digits[0..1], 16).map_err(|_| err())?;
                let g = u8::from_str_radix(&digits[1..2], 16).map_err(|_| err())?;
                let b = u8::from_str_radix(&digits[2..3], 16).map_err(|_| err())?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).map_err(|_| err())?;
                let g = u8::from_str_radix(&digits[2..4], 16).map_err(|_| err())?;
                let b = u8::from_str_radix(&digits[4..6], 16).map_err(|_| err())?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(err()),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Components scaled to 0.0..=1.0 for surface blending.
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Rgb::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Rendering algorithm and compositing mode for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    #[default]
    Normal,
    Calligraphy,
    Highlighter,
    Spray,
    Eraser,
}

impl BrushKind {
    /// Whether this brush removes existing pixels instead of adding color.
    pub fn is_destructive(self) -> bool {
        matches!(self, BrushKind::Eraser)
    }
}

/// One continuous drawing action from pointer-down to pointer-up.
///
/// Points are append-only while the stroke is active and frozen once it is
/// finalized into history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Recorded points in surface-local coordinates.
    pub points: Vec<Point>,
    pub color: Rgb,
    pub base_size: f64,
    pub brush: BrushKind,
    /// Relay-assigned identity of the author.
    pub author: String,
}

impl Stroke {
    /// Create a stroke at its origin point. `base_size` must be positive.
    pub fn new(
        origin: Point,
        color: Rgb,
        base_size: f64,
        brush: BrushKind,
        author: impl Into<String>,
    ) -> Result<Self, StrokeError> {
        if !(base_size > 0.0) {
            return Err(StrokeError::NonPositiveSize(base_size));
        }
        Ok(Self {
            points: vec![origin],
            color,
            base_size,
            brush,
            author: author.into(),
        })
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// At most one in-progress stroke per author.
///
/// The local author and each remote peer occupy independent slots. A second
/// begin for the same author replaces the previous active stroke; the replaced
/// stroke never reaches history.
#[derive(Debug, Default)]
pub struct ActiveStrokeTable {
    strokes: HashMap<String, Stroke>,
}

impl ActiveStrokeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly begun stroke, returning any stroke it displaced.
    pub fn begin(&mut self, stroke: Stroke) -> Option<Stroke> {
        self.strokes.insert(stroke.author.clone(), stroke)
    }

    pub fn get(&self, author: &str) -> Option<&Stroke> {
        self.strokes.get(author)
    }

    pub fn get_mut(&mut self, author: &str) -> Option<&mut Stroke> {
        self.strokes.get_mut(author)
    }

    /// Remove and return the author's active stroke, if any.
    pub fn take(&mut self, author: &str) -> Option<Stroke> {
        self.strokes.remove(author)
    }

    pub fn contains(&self, author: &str) -> bool {
        self.strokes.contains_key(author)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.values()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let color = Rgb::from_hex("#ff8000").unwrap();
        assert_eq!(color, Rgb::new(255, 128, 0));
        assert_eq!(color.to_hex(), "#ff8000");
    }

    #[test]
    fn test_hex_short_form() {
        assert_eq!(Rgb::from_hex("#f00").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_hex("#abc").unwrap(), Rgb::new(170, 187, 204));
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(Rgb::from_hex("ff0000").is_err());
        assert!(Rgb::from_hex("#ff00").is_err());
        assert!(Rgb::from_hex("#gggggg").is_err());
    }

    #[test]
    fn test_hex_rejects_non_ascii() {
        // Multi-byte characters can hit the 3- and 6-byte length arms; they
        // must error, not panic on a char boundary
        assert!(Rgb::from_hex("#€").is_err());
        assert!(Rgb::from_hex("#€€").is_err());
        assert!(Rgb::from_hex("#ffé0").is_err());
    }

    #[test]
    fn test_color_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_stroke_requires_positive_size() {
        let origin = Point::new(0.0, 0.0);
        assert!(Stroke::new(origin, Rgb::black(), 5.0, BrushKind::Normal, "a").is_ok());
        assert_eq!(
            Stroke::new(origin, Rgb::black(), 0.0, BrushKind::Normal, "a"),
            Err(StrokeError::NonPositiveSize(0.0))
        );
        assert!(Stroke::new(origin, Rgb::black(), -1.0, BrushKind::Normal, "a").is_err());
        assert!(Stroke::new(origin, Rgb::black(), f64::NAN, BrushKind::Normal, "a").is_err());
    }

    #[test]
    fn test_stroke_starts_with_origin() {
        let stroke = Stroke::new(Point::new(3.0, 4.0), Rgb::black(), 5.0, BrushKind::Normal, "a")
            .unwrap();
        assert_eq!(stroke.len(), 1);
        assert_eq!(stroke.points[0], Point::new(3.0, 4.0));
    }

    #[test]
    fn test_table_begin_replaces_prior_stroke() {
        let mut table = ActiveStrokeTable::new();
        let first =
            Stroke::new(Point::new(0.0, 0.0), Rgb::black(), 5.0, BrushKind::Normal, "peer-1")
                .unwrap();
        let second =
            Stroke::new(Point::new(9.0, 9.0), Rgb::white(), 3.0, BrushKind::Spray, "peer-1")
                .unwrap();

        assert!(table.begin(first).is_none());
        let displaced = table.begin(second).unwrap();
        assert_eq!(displaced.points[0], Point::new(0.0, 0.0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("peer-1").unwrap().brush, BrushKind::Spray);
    }

    #[test]
    fn test_table_slots_are_per_author() {
        let mut table = ActiveStrokeTable::new();
        for author in ["a", "b", "c"] {
            let stroke =
                Stroke::new(Point::new(0.0, 0.0), Rgb::black(), 5.0, BrushKind::Normal, author)
                    .unwrap();
            table.begin(stroke);
        }
        assert_eq!(table.len(), 3);
        assert!(table.take("b").is_some());
        assert!(table.take("b").is_none());
        assert_eq!(table.len(), 2);
    }
}

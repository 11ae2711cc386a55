//! Bundled caption styling and background-music catalogs.

use crate::timeline::model::CaptionStyle;
use serde::Serialize;

/// Names of the bundled background-music tracks.
///
/// A preset named `name` is backed by `<public>/bgm/<name>.mp3`.
pub const PRESET_TRACKS: [&str; 3] = ["upbeat", "calm", "lofi"];

/// Return `true` when `name` is a bundled track.
pub fn is_preset_track(name: &str) -> bool {
    PRESET_TRACKS.contains(&name)
}

/// Horizontal anchor of a caption block inside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionAnchor {
    /// Centered near the bottom edge.
    BottomCenter,
    /// Centered on the frame.
    Center,
    /// Bottom-right corner.
    BottomRight,
    /// Bottom-left corner.
    BottomLeft,
}

/// Concrete styling for one caption style catalog entry.
///
/// Serialized into the composition input so the headless renderer works
/// from resolved values rather than a style name lookup of its own.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionSpec {
    /// CSS-style font family stack.
    pub font_family: &'static str,
    /// Font size in pixels at full output resolution.
    pub font_size_px: u32,
    /// Text color as a CSS color string.
    pub color: &'static str,
    /// Background fill behind the text, if any.
    pub background: Option<&'static str>,
    /// Text shadow, if any.
    pub shadow: Option<&'static str>,
    /// Placement anchor.
    pub anchor: CaptionAnchor,
    /// Maximum caption width as a fraction of frame width.
    pub max_width_frac: f32,
    /// Bold weight.
    pub bold: bool,
}

/// Resolve a caption style name to its concrete styling.
pub fn caption_spec(style: CaptionStyle) -> CaptionSpec {
    match style {
        CaptionStyle::Simple => CaptionSpec {
            font_family: "sans-serif",
            font_size_px: 40,
            color: "white",
            background: Some("rgba(0, 0, 0, 0.6)"),
            shadow: None,
            anchor: CaptionAnchor::BottomCenter,
            max_width_frac: 0.8,
            bold: false,
        },
        CaptionStyle::Center => CaptionSpec {
            font_family: "serif",
            font_size_px: 80,
            color: "white",
            background: None,
            shadow: Some("0 4px 6px rgba(0,0,0,0.5)"),
            anchor: CaptionAnchor::Center,
            max_width_frac: 1.0,
            bold: true,
        },
        CaptionStyle::Handwritten => CaptionSpec {
            font_family: "\"Comic Sans MS\", \"Chalkboard SE\", sans-serif",
            font_size_px: 60,
            color: "#FFD700",
            background: None,
            shadow: Some("2px 2px 0px rgba(0,0,0,0.8)"),
            anchor: CaptionAnchor::BottomRight,
            max_width_frac: 0.6,
            bold: false,
        },
        CaptionStyle::Minimal => CaptionSpec {
            font_family: "monospace",
            font_size_px: 24,
            color: "white",
            background: Some("black"),
            shadow: None,
            anchor: CaptionAnchor::BottomLeft,
            max_width_frac: 0.5,
            bold: false,
        },
    }
}

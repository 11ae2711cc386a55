use crate::foundation::timing::{FRAME_RATE, frames_for_duration};
use serde::{Deserialize, Serialize};

/// Visual content category of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    /// Still image shown for the slide's duration.
    Image,
    /// Video clip played for the slide's duration.
    Video,
}

/// One timed unit of visual content with an optional caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Opaque token, unique within the timeline and stable for the
    /// slide's lifetime.
    pub id: String,
    /// Visual content category.
    pub kind: SlideKind,
    /// Asset locator: a browser-local handle, an uploaded-file web path,
    /// or an already-resolved source.
    pub reference: String,
    /// Caption text, may be empty.
    #[serde(default)]
    pub caption: String,
    /// On-screen duration in seconds, must be positive.
    pub duration_seconds: f64,
}

impl Slide {
    /// Frame span this slide occupies at the fixed composition rate.
    pub fn frames(&self) -> u64 {
        frames_for_duration(self.duration_seconds, FRAME_RATE)
    }
}

/// Output frame geometry choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Landscape 16:9.
    #[serde(rename = "16:9")]
    Wide,
    /// Portrait 9:16.
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    /// Final pixel dimensions `(width, height)` for this aspect ratio.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Wide => (1920, 1080),
            Self::Tall => (1080, 1920),
        }
    }
}

/// Fixed caption styling catalog entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStyle {
    /// Boxed sans-serif text at the bottom center.
    Simple,
    /// Large serif text centered on the frame.
    Center,
    /// Casual gold text at the bottom right.
    Handwritten,
    /// Small monospace text in the bottom-left corner.
    Minimal,
}

/// Background audio choice for a timeline.
///
/// At most one selection is active; the editing boundary enforces the
/// mutual exclusion between preset and uploaded audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSelection {
    /// No background audio.
    None,
    /// A bundled track selected by catalog name.
    Preset(String),
    /// A session-uploaded audio file selected by reference path.
    Uploaded(String),
}

/// The full ordered slide sequence plus global render settings for one
/// export. Slide position in `slides` is the playback order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    /// Slides in playback order.
    pub slides: Vec<Slide>,
    /// Output frame geometry.
    pub aspect_ratio: AspectRatio,
    /// Caption styling applied to every slide.
    pub caption_style: CaptionStyle,
    /// Background audio choice.
    pub audio: AudioSelection,
}

impl Timeline {
    /// Total playback length in seconds.
    pub fn total_duration_seconds(&self) -> f64 {
        self.slides.iter().map(|s| s.duration_seconds).sum()
    }

    /// Total composition frame count, floored to a minimum of 1 frame.
    ///
    /// Uses the same calculator as per-slide frame spans so preview and
    /// export timing always agree.
    pub fn total_frames(&self) -> u64 {
        frames_for_duration(self.total_duration_seconds(), FRAME_RATE)
    }
}

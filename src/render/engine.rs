use crate::foundation::error::SlidereelResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Location of a packaged composition program, servable to the headless
/// renderer for the duration of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleLocation {
    /// URL or directory the renderer serves the bundle from.
    pub serve_url: String,
}

/// Parameters for instantiating a named composition against resolved
/// input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRequest {
    /// Name of the composition to instantiate.
    pub composition_id: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Composition frame rate.
    pub fps: u32,
    /// Total frame count.
    pub duration_frames: u64,
    /// Resolved composition input handed to the renderer.
    pub input_props: serde_json::Value,
}

/// A composition the engine has instantiated and is ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedComposition {
    /// Composition name.
    pub id: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Composition frame rate.
    pub fps: u32,
    /// Total frame count.
    pub duration_frames: u64,
}

/// Output video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    /// H.264 in an MP4 container, the only supported output.
    H264,
}

impl VideoCodec {
    /// Engine-facing codec name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H264 => "h264",
        }
    }
}

/// Parameters for encoding a selected composition to a media file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// The composition to encode.
    pub composition: SelectedComposition,
    /// Resolved composition input, identical to the selection input.
    pub input_props: serde_json::Value,
    /// Output codec.
    pub codec: VideoCodec,
    /// Absolute output file path.
    pub output_path: PathBuf,
}

/// The offline rendering engine, driven as a black box through a
/// three-stage contract: bundle the composition program, instantiate the
/// named composition against resolved input, then encode it to a file.
///
/// Implementations perform no timeout handling of their own; the
/// orchestrator bounds the selection and render stages.
pub trait RenderEngine {
    /// Package the composition program into a servable bundle.
    ///
    /// Has no per-job parameters; the result is reusable only within the
    /// current job. Every export re-bundles.
    fn bundle(&self) -> impl Future<Output = SlidereelResult<BundleLocation>> + Send;

    /// Instantiate the named composition against resolved input.
    fn select_composition(
        &self,
        bundle: &BundleLocation,
        request: &CompositionRequest,
    ) -> impl Future<Output = SlidereelResult<SelectedComposition>> + Send;

    /// Encode the selected composition to `request.output_path`.
    fn render_media(
        &self,
        bundle: &BundleLocation,
        request: &RenderRequest,
    ) -> impl Future<Output = SlidereelResult<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_name() {
        assert_eq!(VideoCodec::H264.as_str(), "h264");
    }

    #[test]
    fn request_serializes_camel_case() {
        let req = CompositionRequest {
            composition_id: "Slideshow".to_owned(),
            width: 1920,
            height: 1080,
            fps: 30,
            duration_frames: 240,
            input_props: serde_json::json!({ "slides": [] }),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["compositionId"], "Slideshow");
        assert_eq!(v["durationFrames"], 240);
        assert!(v["inputProps"]["slides"].is_array());
    }
}

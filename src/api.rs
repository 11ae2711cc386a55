//! Export and upload boundaries.
//!
//! Request bodies are strictly typed and validated here, so malformed
//! input becomes a client-error response instead of an unchecked failure
//! deep in the pipeline. Response shapes match the wire contract:
//! `{ success, url?, error? }` for exports and
//! `{ success, path?, message? }` for uploads.

use crate::foundation::error::{SlidereelError, SlidereelResult};
use crate::render::engine::RenderEngine;
use crate::render::orchestrator::RenderOrchestrator;
use crate::resolve::resolver::AssetResolver;
use crate::timeline::model::{
    AspectRatio, AudioSelection, CaptionStyle, Slide, SlideKind, Timeline,
};
use crate::timeline::validate::validate_timeline;
use crate::upload::store::UploadStore;
use serde::{Deserialize, Serialize};

/// One slide of an export request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SlideBody {
    /// Client-assigned opaque slide id.
    pub id: String,
    /// `"image"` or `"video"`; anything else fails deserialization.
    #[serde(rename = "type")]
    pub kind: SlideKind,
    /// Asset reference.
    pub src: String,
    /// Caption text.
    #[serde(default)]
    pub text: String,
    /// Duration in seconds.
    pub duration: f64,
}

/// Export request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Slides in playback order.
    pub slides: Vec<SlideBody>,
    /// Output frame geometry, `"16:9"` or `"9:16"`.
    pub aspect_ratio: AspectRatio,
    /// Caption style name.
    pub subtitle_style: CaptionStyle,
    /// Preset track name, or null/absent for none.
    #[serde(default)]
    pub bgm: Option<String>,
    /// Uploaded audio reference; ignored when `bgm` is set.
    #[serde(default)]
    pub custom_audio_path: Option<String>,
}

impl ExportRequest {
    /// Parse a request body from JSON.
    pub fn from_json(body: &str) -> SlidereelResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| SlidereelError::serde(format!("parse export request: {e}")))
    }

    /// Convert into a validated [`Timeline`].
    ///
    /// A set `bgm` takes precedence over `customAudioPath`; an empty
    /// `bgm` string counts as no selection.
    pub fn into_timeline(self) -> SlidereelResult<Timeline> {
        let audio = match (
            self.bgm.filter(|name| !name.is_empty()),
            self.custom_audio_path.filter(|path| !path.is_empty()),
        ) {
            (Some(name), _) => AudioSelection::Preset(name),
            (None, Some(path)) => AudioSelection::Uploaded(path),
            (None, None) => AudioSelection::None,
        };

        let timeline = Timeline {
            slides: self
                .slides
                .into_iter()
                .map(|s| Slide {
                    id: s.id,
                    kind: s.kind,
                    reference: s.src,
                    caption: s.text,
                    duration_seconds: s.duration,
                })
                .collect(),
            aspect_ratio: self.aspect_ratio,
            caption_style: self.subtitle_style,
            audio,
        };

        validate_timeline(&timeline).map_err(|e| SlidereelError::validation(e.to_string()))?;
        Ok(timeline)
    }
}

/// Export response body.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    /// Whether the export produced an output file.
    pub success: bool,
    /// Web-servable path to the rendered MP4, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Short failure message, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportResponse {
    /// Successful response carrying the output URL.
    pub fn ok(url: impl Into<String>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            error: None,
        }
    }

    /// Failure response carrying a short message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(message.into()),
        }
    }
}

/// Upload response body.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    /// Whether the file was stored.
    pub success: bool,
    /// Stable reference path, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Short failure message, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadResponse {
    /// Successful response carrying the stored reference path.
    pub fn ok(path: impl Into<String>) -> Self {
        Self {
            success: true,
            path: Some(path.into()),
            message: None,
        }
    }

    /// Failure response carrying a short message.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            path: None,
            message: Some(message.into()),
        }
    }
}

/// Run one export end to end: validate, resolve every asset reference,
/// then drive the render sequence. Each call is independent; concurrent
/// exports share no mutable state.
pub async fn export<E: RenderEngine>(
    request: ExportRequest,
    resolver: &AssetResolver,
    orchestrator: &RenderOrchestrator<E>,
) -> ExportResponse {
    match export_inner(request, resolver, orchestrator).await {
        Ok(url) => ExportResponse::ok(url),
        Err(e) => ExportResponse::err(e.to_string()),
    }
}

async fn export_inner<E: RenderEngine>(
    request: ExportRequest,
    resolver: &AssetResolver,
    orchestrator: &RenderOrchestrator<E>,
) -> SlidereelResult<String> {
    let timeline = request.into_timeline()?;
    let resolved = resolver.resolve_timeline(&timeline).await?;
    let outcome = orchestrator.render(&resolved).await?;
    Ok(outcome.output_url)
}

/// Store one uploaded file and report its reference path.
pub async fn upload(
    store: &UploadStore,
    bytes: &[u8],
    file_name: &str,
    session_id: &str,
) -> UploadResponse {
    match store.store(bytes, file_name, session_id).await {
        Ok(path) => UploadResponse::ok(path),
        Err(e) => UploadResponse::err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json() -> String {
        serde_json::json!({
            "slides": [
                { "id": "s1", "type": "image", "src": "/uploads/x/a.jpg", "text": "hi", "duration": 3 },
                { "id": "s2", "type": "video", "src": "/uploads/x/b.mp4", "text": "", "duration": 5 }
            ],
            "aspectRatio": "16:9",
            "subtitleStyle": "simple",
            "bgm": null
        })
        .to_string()
    }

    #[test]
    fn parses_and_converts_wire_request() {
        let req = ExportRequest::from_json(&request_json()).unwrap();
        let timeline = req.into_timeline().unwrap();
        assert_eq!(timeline.slides.len(), 2);
        assert_eq!(timeline.slides[1].kind, SlideKind::Video);
        assert_eq!(timeline.audio, AudioSelection::None);
        assert_eq!(timeline.total_frames(), 240);
    }

    #[test]
    fn unknown_slide_type_is_a_client_error() {
        let body = request_json().replace("\"video\"", "\"gif\"");
        let err = ExportRequest::from_json(&body).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn bgm_takes_precedence_over_custom_audio() {
        let mut v: serde_json::Value = serde_json::from_str(&request_json()).unwrap();
        v["bgm"] = "calm".into();
        v["customAudioPath"] = "/uploads/x/track.wav".into();
        let req: ExportRequest = serde_json::from_value(v).unwrap();
        let timeline = req.into_timeline().unwrap();
        assert_eq!(timeline.audio, AudioSelection::Preset("calm".to_owned()));
    }

    #[test]
    fn empty_bgm_falls_back_to_custom_audio() {
        let mut v: serde_json::Value = serde_json::from_str(&request_json()).unwrap();
        v["bgm"] = "".into();
        v["customAudioPath"] = "/uploads/x/track.wav".into();
        let req: ExportRequest = serde_json::from_value(v).unwrap();
        let timeline = req.into_timeline().unwrap();
        assert_eq!(
            timeline.audio,
            AudioSelection::Uploaded("/uploads/x/track.wav".to_owned())
        );
    }

    #[test]
    fn invalid_timeline_is_a_client_error() {
        let mut v: serde_json::Value = serde_json::from_str(&request_json()).unwrap();
        v["slides"][0]["duration"] = 0.into();
        let req: ExportRequest = serde_json::from_value(v).unwrap();
        let err = req.into_timeline().unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("duration_seconds"));
    }

    #[test]
    fn responses_serialize_without_absent_fields() {
        let ok = serde_json::to_value(ExportResponse::ok("/out/x.mp4")).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["url"], "/out/x.mp4");
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(UploadResponse::err("missing file")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["message"], "missing file");
        assert!(err.get("path").is_none());
    }
}

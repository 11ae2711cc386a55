use crate::config::PipelineConfig;
use crate::foundation::error::SlidereelResult;
use crate::foundation::timing::{FRAME_RATE, frames_for_duration};
use crate::resolve::source::{
    RenderSource, audio_mime_for_ext, extension_of, file_locator, image_mime_for_ext,
    local_path_component,
};
use crate::timeline::model::{AspectRatio, AudioSelection, CaptionStyle, Slide, SlideKind, Timeline};
use futures::future::join_all;
use tracing::warn;

/// Execution context an asset reference is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// Interactive browser preview: references are already consumable
    /// (local blob handles or same-origin web paths).
    Preview,
    /// Headless server render: uploaded content must be translated into
    /// inline payloads or absolute file locators.
    Server,
}

/// A slide whose reference has been replaced by a [`RenderSource`].
#[derive(Debug, Clone)]
pub struct ResolvedSlide {
    /// Slide id, carried through unchanged.
    pub id: String,
    /// Visual content category.
    pub kind: SlideKind,
    /// Render-time source for the slide's pixels.
    pub source: RenderSource,
    /// Caption text.
    pub caption: String,
    /// On-screen duration in seconds.
    pub duration_seconds: f64,
}

/// Background audio after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedAudio {
    /// Track label forwarded to the engine: the preset name, or
    /// `"custom"` for uploaded audio.
    pub track: String,
    /// Render-time source for the audio bytes.
    pub source: RenderSource,
}

/// A timeline in which every reference has become a [`RenderSource`].
///
/// This is the only input type the render orchestrator accepts; it never
/// sees raw uploaded-file paths or browser-local handles.
#[derive(Debug, Clone)]
pub struct ResolvedTimeline {
    /// Resolved slides in playback order.
    pub slides: Vec<ResolvedSlide>,
    /// Output frame geometry.
    pub aspect_ratio: AspectRatio,
    /// Caption styling applied to every slide.
    pub caption_style: CaptionStyle,
    /// Background audio, `None` when disabled or degraded away.
    pub audio: Option<ResolvedAudio>,
}

impl ResolvedTimeline {
    /// Total playback length in seconds.
    pub fn total_duration_seconds(&self) -> f64 {
        self.slides.iter().map(|s| s.duration_seconds).sum()
    }

    /// Total composition frame count, via the shared duration calculator.
    pub fn total_frames(&self) -> u64 {
        frames_for_duration(self.total_duration_seconds(), FRAME_RATE)
    }
}

/// Converts slide and audio references into render-time sources.
pub struct AssetResolver {
    config: PipelineConfig,
    context: RenderContext,
}

impl AssetResolver {
    /// Build a resolver for `context` over the configured public root.
    pub fn new(config: PipelineConfig, context: RenderContext) -> Self {
        Self { config, context }
    }

    /// Resolve every slide and the audio selection of `timeline`.
    ///
    /// Slide and audio resolution proceed concurrently; results are
    /// joined before returning and slide order is timeline order, never
    /// resolution completion order.
    pub async fn resolve_timeline(&self, timeline: &Timeline) -> SlidereelResult<ResolvedTimeline> {
        let slide_futs = timeline.slides.iter().map(|s| self.resolve_slide(s));
        let (slides, audio) = tokio::join!(join_all(slide_futs), self.resolve_audio(&timeline.audio));
        let slides = slides.into_iter().collect::<SlidereelResult<Vec<_>>>()?;

        Ok(ResolvedTimeline {
            slides,
            aspect_ratio: timeline.aspect_ratio,
            caption_style: timeline.caption_style,
            audio,
        })
    }

    /// Resolve one slide's reference into a render source.
    pub async fn resolve_slide(&self, slide: &Slide) -> SlidereelResult<ResolvedSlide> {
        let source = match self.context {
            RenderContext::Preview => RenderSource::Locator(slide.reference.clone()),
            RenderContext::Server => self.resolve_server_source(slide).await,
        };
        Ok(ResolvedSlide {
            id: slide.id.clone(),
            kind: slide.kind,
            source,
            caption: slide.caption.clone(),
            duration_seconds: slide.duration_seconds,
        })
    }

    async fn resolve_server_source(&self, slide: &Slide) -> RenderSource {
        let path = local_path_component(&slide.reference);
        if !path.starts_with("/uploads/") {
            // Not session storage; the reference is already reachable.
            return RenderSource::Locator(slide.reference.clone());
        }

        let fs_path = self.config.public_fs_path(&path);
        match slide.kind {
            SlideKind::Image => match tokio::fs::read(&fs_path).await {
                Ok(bytes) => {
                    let mime = image_mime_for_ext(&extension_of(&path));
                    RenderSource::inline(mime, &bytes)
                }
                Err(e) => {
                    // A headless render can still load the pixels through
                    // the locator; keep the job going.
                    warn!(
                        slide = %slide.id,
                        path = %fs_path.display(),
                        error = %e,
                        "image read failed, falling back to file locator"
                    );
                    RenderSource::Locator(file_locator(&fs_path))
                }
            },
            // Inlining video bytes as text is prohibitively large.
            SlideKind::Video => RenderSource::Locator(file_locator(&fs_path)),
        }
    }

    /// Resolve the audio selection, degrading to no audio on any failure.
    pub async fn resolve_audio(&self, selection: &AudioSelection) -> Option<ResolvedAudio> {
        match selection {
            AudioSelection::None => None,
            AudioSelection::Preset(name) => match self.context {
                RenderContext::Preview => Some(ResolvedAudio {
                    track: name.clone(),
                    source: RenderSource::Locator(format!("/bgm/{name}.mp3")),
                }),
                RenderContext::Server => {
                    let path = self.config.preset_track_path(name);
                    match tokio::fs::read(&path).await {
                        Ok(bytes) => Some(ResolvedAudio {
                            track: name.clone(),
                            source: RenderSource::inline("audio/mp3", &bytes),
                        }),
                        Err(e) => {
                            warn!(
                                track = %name,
                                path = %path.display(),
                                error = %e,
                                "preset track unreadable, rendering without audio"
                            );
                            None
                        }
                    }
                }
            },
            AudioSelection::Uploaded(reference) => match self.context {
                RenderContext::Preview => Some(ResolvedAudio {
                    track: "custom".to_owned(),
                    source: RenderSource::Locator(reference.clone()),
                }),
                RenderContext::Server => {
                    let path = local_path_component(reference);
                    let fs_path = self.config.public_fs_path(&path);
                    match tokio::fs::read(&fs_path).await {
                        Ok(bytes) => {
                            let mime = audio_mime_for_ext(&extension_of(&path));
                            Some(ResolvedAudio {
                                track: "custom".to_owned(),
                                source: RenderSource::inline(mime, &bytes),
                            })
                        }
                        Err(e) => {
                            warn!(
                                path = %fs_path.display(),
                                error = %e,
                                "uploaded audio unreadable, rendering without audio"
                            );
                            None
                        }
                    }
                }
            },
        }
    }
}

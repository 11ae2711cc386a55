use crate::config::PipelineConfig;
use crate::foundation::error::{SlidereelError, SlidereelResult};
use crate::foundation::timing::FRAME_RATE;
use crate::render::engine::{
    BundleLocation, CompositionRequest, RenderEngine, RenderRequest, VideoCodec,
};
use crate::resolve::resolver::ResolvedTimeline;
use crate::timeline::presets::caption_spec;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};
use uuid::Uuid;

/// A stage of the render sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Packaging the composition program.
    Bundling,
    /// Instantiating the named composition against resolved input.
    SelectingComposition,
    /// Encoding the composition to a media file.
    Rendering,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bundling => "bundling",
            Self::SelectingComposition => "composition selection",
            Self::Rendering => "rendering",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of one render job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Created, no stage started.
    Pending,
    /// A stage is in flight.
    Running(RenderStage),
    /// The output file was produced.
    Succeeded {
        /// Web-servable relative path to the output.
        output_url: String,
        /// Filesystem path of the output.
        output_path: PathBuf,
    },
    /// A stage failed; the job is over.
    Failed {
        /// Stage that failed.
        stage: RenderStage,
        /// Human-readable cause.
        reason: String,
    },
}

/// One execution of the bundle → select → render sequence for one
/// resolved timeline. Created per export request; never shared across
/// requests.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Job identity, distinct per export request.
    pub id: Uuid,
    /// Generated collision-resistant output file name.
    pub output_file_name: String,
    /// Current lifecycle state.
    pub status: JobStatus,
}

/// Successful render result.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Identity of the job that produced the output.
    pub job_id: Uuid,
    /// Web-servable relative path, e.g. `/out/slideshow-1700000000000.mp4`.
    pub output_url: String,
    /// Filesystem path of the produced MP4.
    pub output_path: PathBuf,
}

/// Drives the three-stage render sequence against a resolved timeline.
pub struct RenderOrchestrator<E> {
    engine: E,
    config: PipelineConfig,
}

impl<E: RenderEngine> RenderOrchestrator<E> {
    /// Build an orchestrator over `engine` with `config`.
    pub fn new(engine: E, config: PipelineConfig) -> Self {
        Self { engine, config }
    }

    /// Render `resolved` to an MP4 and return the output location.
    pub async fn render(&self, resolved: &ResolvedTimeline) -> SlidereelResult<RenderOutcome> {
        let job = self.run_job(resolved).await;
        match job.status {
            JobStatus::Succeeded {
                output_url,
                output_path,
            } => Ok(RenderOutcome {
                job_id: job.id,
                output_url,
                output_path,
            }),
            JobStatus::Failed { stage, reason } => {
                Err(SlidereelError::render(format!("{stage} failed: {reason}")))
            }
            _ => Err(SlidereelError::render("job ended in a non-terminal state")),
        }
    }

    /// Run the full stage sequence, returning the job with its terminal
    /// status. Stages run strictly in order; a failure at any stage is
    /// terminal and later stages never start.
    pub async fn run_job(&self, resolved: &ResolvedTimeline) -> RenderJob {
        let mut job = RenderJob {
            id: Uuid::new_v4(),
            output_file_name: String::new(),
            status: JobStatus::Pending,
        };

        let input_props = engine_input_props(resolved);
        let (width, height) = resolved.aspect_ratio.dimensions();
        let duration_frames = resolved.total_frames();

        job.status = JobStatus::Running(RenderStage::Bundling);
        info!(job = %job.id, "bundling composition program");
        let bundle = match self.engine.bundle().await {
            Ok(b) => b,
            Err(e) => return fail(job, RenderStage::Bundling, e),
        };

        job.status = JobStatus::Running(RenderStage::SelectingComposition);
        info!(job = %job.id, width, height, duration_frames, "selecting composition");
        let request = CompositionRequest {
            composition_id: self.config.composition_id.clone(),
            width,
            height,
            fps: FRAME_RATE,
            duration_frames,
            input_props: input_props.clone(),
        };
        let composition = match self
            .bounded(
                RenderStage::SelectingComposition,
                self.engine.select_composition(&bundle, &request),
            )
            .await
        {
            Ok(c) => c,
            Err(e) => return fail(job, RenderStage::SelectingComposition, e),
        };

        if let Err(e) = std::fs::create_dir_all(&self.config.output_dir) {
            return fail(
                job,
                RenderStage::Rendering,
                SlidereelError::render(format!(
                    "create output directory '{}': {e}",
                    self.config.output_dir.display()
                )),
            );
        }
        let file_name = match reserve_output_file(&self.config.output_dir) {
            Ok(name) => name,
            Err(e) => return fail(job, RenderStage::Rendering, e),
        };
        job.output_file_name = file_name.clone();
        let output_path = self.config.output_dir.join(&file_name);

        job.status = JobStatus::Running(RenderStage::Rendering);
        info!(job = %job.id, output = %output_path.display(), "rendering");
        let render_request = RenderRequest {
            composition,
            input_props,
            codec: VideoCodec::H264,
            output_path: output_path.clone(),
        };
        if let Err(e) = self
            .bounded(
                RenderStage::Rendering,
                self.engine.render_media(&bundle, &render_request),
            )
            .await
        {
            // A partial output is never usable; discard this job's own
            // reservation. Prior jobs' outputs are untouched.
            let _ = std::fs::remove_file(&output_path);
            return fail(job, RenderStage::Rendering, e);
        }

        let output_url = format!("/out/{file_name}");
        info!(job = %job.id, url = %output_url, "render complete");
        job.status = JobStatus::Succeeded {
            output_url,
            output_path,
        };
        job
    }

    /// Bound a stage future by the configured stage timeout. Expiry is
    /// fatal for the job, not a retry condition.
    async fn bounded<T>(
        &self,
        stage: RenderStage,
        fut: impl Future<Output = SlidereelResult<T>>,
    ) -> SlidereelResult<T> {
        match tokio::time::timeout(self.config.stage_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(SlidereelError::render(format!(
                "{stage} timed out after {}s",
                self.config.stage_timeout.as_secs()
            ))),
        }
    }

    /// The engine this orchestrator drives.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

fn fail(mut job: RenderJob, stage: RenderStage, err: SlidereelError) -> RenderJob {
    error!(job = %job.id, %stage, cause = %err, "render job failed");
    job.status = JobStatus::Failed {
        stage,
        reason: err.to_string(),
    };
    job
}

/// Build the composition input handed to the rendering engine.
///
/// Slides keep their wire spellings (`type`, `src`, `text`, `duration`);
/// inline sources become `data:` URLs. `bgm` carries the preset name, the
/// sentinel `"custom"` for uploaded audio, or null when audio is absent
/// or was degraded away.
pub fn engine_input_props(resolved: &ResolvedTimeline) -> serde_json::Value {
    let slides: Vec<serde_json::Value> = resolved
        .slides
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "type": s.kind,
                "src": s.source.engine_src(),
                "text": s.caption,
                "duration": s.duration_seconds,
            })
        })
        .collect();

    json!({
        "slides": slides,
        "subtitleStyle": resolved.caption_style,
        "captionSpec": caption_spec(resolved.caption_style),
        "bgm": resolved.audio.as_ref().map(|a| a.track.clone()),
        "audioUrl": resolved.audio.as_ref().map(|a| a.source.engine_src()),
    })
}

/// Reserve a distinct output file name in `dir`.
///
/// Names follow `slideshow-<epoch-millis>.mp4`; the file is created with
/// `create_new` so two jobs reserving in the same millisecond cannot
/// share a path, with a `-<n>` suffix resolving the race. Existing
/// outputs are never overwritten.
fn reserve_output_file(dir: &Path) -> SlidereelResult<String> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    for n in 0..10_000u32 {
        let name = if n == 0 {
            format!("slideshow-{millis}.mp4")
        } else {
            format!("slideshow-{millis}-{n}.mp4")
        };
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
        {
            Ok(_) => return Ok(name),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(SlidereelError::render(format!(
                    "reserve output file in '{}': {e}",
                    dir.display()
                )));
            }
        }
    }
    Err(SlidereelError::render("exhausted output file name suffixes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolver::{ResolvedAudio, ResolvedSlide};
    use crate::resolve::source::RenderSource;
    use crate::timeline::model::{AspectRatio, CaptionStyle, SlideKind};

    fn resolved_two_images() -> ResolvedTimeline {
        ResolvedTimeline {
            slides: vec![
                ResolvedSlide {
                    id: "a".to_owned(),
                    kind: SlideKind::Image,
                    source: RenderSource::inline("image/jpeg", b"aa"),
                    caption: "first".to_owned(),
                    duration_seconds: 3.0,
                },
                ResolvedSlide {
                    id: "b".to_owned(),
                    kind: SlideKind::Image,
                    source: RenderSource::Locator("file:///tmp/b.png".to_owned()),
                    caption: String::new(),
                    duration_seconds: 5.0,
                },
            ],
            aspect_ratio: AspectRatio::Wide,
            caption_style: CaptionStyle::Simple,
            audio: None,
        }
    }

    #[test]
    fn input_props_carry_wire_spellings() {
        let props = engine_input_props(&resolved_two_images());
        assert_eq!(props["slides"][0]["type"], "image");
        assert_eq!(props["slides"][0]["text"], "first");
        assert!(
            props["slides"][0]["src"]
                .as_str()
                .unwrap()
                .starts_with("data:image/jpeg;base64,")
        );
        assert_eq!(props["slides"][1]["src"], "file:///tmp/b.png");
        assert_eq!(props["subtitleStyle"], "simple");
        assert_eq!(props["bgm"], serde_json::Value::Null);
        assert_eq!(props["audioUrl"], serde_json::Value::Null);
    }

    #[test]
    fn input_props_carry_audio_when_resolved() {
        let mut resolved = resolved_two_images();
        resolved.audio = Some(ResolvedAudio {
            track: "calm".to_owned(),
            source: RenderSource::inline("audio/mp3", b"mp3"),
        });
        let props = engine_input_props(&resolved);
        assert_eq!(props["bgm"], "calm");
        assert!(
            props["audioUrl"]
                .as_str()
                .unwrap()
                .starts_with("data:audio/mp3;base64,")
        );
    }

    #[test]
    fn reserved_names_are_distinct() {
        let dir = std::env::temp_dir().join(format!(
            "slidereel_reserve_{}_{}",
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir).unwrap();

        let mut names = std::collections::HashSet::new();
        for _ in 0..64 {
            let name = reserve_output_file(&dir).unwrap();
            assert!(name.starts_with("slideshow-"));
            assert!(name.ends_with(".mp4"));
            assert!(names.insert(name), "expected a fresh name per reservation");
        }
    }
}

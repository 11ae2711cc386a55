//! Slidereel turns an ordered sequence of image and video slides with
//! captions, timing, and background music into a single rendered MP4.
//!
//! The public API is pipeline-oriented:
//!
//! - Build or parse a [`Timeline`] (typed export requests via [`api`])
//! - Resolve every asset reference with an [`AssetResolver`] into a
//!   [`ResolvedTimeline`]
//! - Drive the external headless renderer through a
//!   [`RenderOrchestrator`] (bundle → select composition → render)
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Export and upload request/response boundaries.
pub mod api;
/// Pipeline configuration.
pub mod config;
/// Asset-reference resolution into render-time sources.
pub mod resolve;
/// Rendering-engine contract and orchestration.
pub mod render;
/// Timeline data model, validation, and bundled catalogs.
pub mod timeline;
/// Session-scoped upload persistence.
pub mod upload;

pub use crate::foundation::error::{SlidereelError, SlidereelResult};
pub use crate::foundation::timing::{FRAME_RATE, frames_for_duration};

pub use crate::api::{ExportRequest, ExportResponse, UploadResponse};
pub use crate::config::PipelineConfig;
pub use crate::render::engine::RenderEngine;
pub use crate::render::orchestrator::{RenderOrchestrator, RenderOutcome};
pub use crate::render::process::{ProcessEngine, ProcessEngineOpts};
pub use crate::resolve::resolver::{AssetResolver, RenderContext, ResolvedTimeline};
pub use crate::resolve::source::RenderSource;
pub use crate::timeline::model::{
    AspectRatio, AudioSelection, CaptionStyle, Slide, SlideKind, Timeline,
};
pub use crate::upload::store::UploadStore;

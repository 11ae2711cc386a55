use crate::foundation::error::{SlidereelError, SlidereelResult};
use crate::render::engine::{
    BundleLocation, CompositionRequest, RenderEngine, RenderRequest, SelectedComposition,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::process::Command;
use tracing::debug;

/// Options for [`ProcessEngine`].
#[derive(Clone, Debug)]
pub struct ProcessEngineOpts {
    /// Headless renderer executable.
    pub program: PathBuf,
    /// Extra arguments prepended to every invocation.
    pub base_args: Vec<String>,
}

impl ProcessEngineOpts {
    /// Options invoking `program` with no extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }
}

/// Rendering engine backed by an external headless renderer process.
///
/// Each stage invokes one subcommand of the configured executable with a
/// JSON request on stdin and, where a result is expected, a JSON response
/// on stdout. A non-zero exit surfaces as a render error carrying the
/// process's trimmed stderr.
pub struct ProcessEngine {
    opts: ProcessEngineOpts,
}

impl ProcessEngine {
    /// Build an engine over the configured renderer executable.
    pub fn new(opts: ProcessEngineOpts) -> Self {
        Self { opts }
    }

    async fn invoke<T: Serialize>(
        &self,
        subcommand: &str,
        args: &[String],
        stdin_json: Option<&T>,
    ) -> SlidereelResult<Vec<u8>> {
        let mut cmd = Command::new(&self.opts.program);
        cmd.args(&self.opts.base_args)
            .arg(subcommand)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(program = %self.opts.program.display(), subcommand, "invoking renderer");

        let mut child = cmd.spawn().map_err(|e| {
            SlidereelError::render(format!(
                "failed to spawn renderer '{}' (is it installed?): {e}",
                self.opts.program.display()
            ))
        })?;

        // Drain stderr on its own task so the renderer never blocks on a
        // full stderr pipe while we are still writing its request.
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SlidereelError::render("failed to open renderer stderr"))?;
        let stderr_drain = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        if let Some(body) = stdin_json {
            let payload = serde_json::to_vec(body)
                .map_err(|e| SlidereelError::serde(format!("encode renderer request: {e}")))?;
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| SlidereelError::render("failed to open renderer stdin"))?;
            stdin.write_all(&payload).await.map_err(|e| {
                SlidereelError::render(format!("failed to write renderer request: {e}"))
            })?;
            // Close the pipe so the renderer sees end of input.
            drop(stdin);
        } else {
            drop(child.stdin.take());
        }

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SlidereelError::render("failed to open renderer stdout"))?;
        let mut out = Vec::new();
        stdout.read_to_end(&mut out).await.map_err(|e| {
            SlidereelError::render(format!("failed to read renderer response: {e}"))
        })?;

        let status = child.wait().await.map_err(|e| {
            SlidereelError::render(format!("failed to wait for renderer to finish: {e}"))
        })?;
        let stderr_bytes = stderr_drain.await.unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SlidereelError::render(format!(
                "renderer '{subcommand}' exited with status {status}: {}",
                stderr.trim()
            )));
        }

        Ok(out)
    }
}

impl RenderEngine for ProcessEngine {
    async fn bundle(&self) -> SlidereelResult<BundleLocation> {
        let stdout = self.invoke::<()>("bundle", &[], None).await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| SlidereelError::render(format!("parse bundle location: {e}")))
    }

    async fn select_composition(
        &self,
        bundle: &BundleLocation,
        request: &CompositionRequest,
    ) -> SlidereelResult<SelectedComposition> {
        let args = ["--serve-url".to_owned(), bundle.serve_url.clone()];
        let stdout = self
            .invoke("compositions", &args, Some(request))
            .await?;
        serde_json::from_slice(&stdout)
            .map_err(|e| SlidereelError::render(format!("parse selected composition: {e}")))
    }

    async fn render_media(
        &self,
        bundle: &BundleLocation,
        request: &RenderRequest,
    ) -> SlidereelResult<()> {
        let args = ["--serve-url".to_owned(), bundle.serve_url.clone()];
        self.invoke("render", &args, Some(request)).await?;
        Ok(())
    }
}

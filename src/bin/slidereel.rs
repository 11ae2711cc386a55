use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use slidereel::api;
use slidereel::{
    AssetResolver, ExportRequest, PipelineConfig, ProcessEngine, ProcessEngineOpts, RenderContext,
    RenderOrchestrator, UploadStore,
};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an export request to an MP4 (requires a headless renderer).
    Render(RenderArgs),
    /// Store a file under session-scoped upload storage.
    Upload(UploadArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Export request JSON file.
    #[arg(long)]
    request: PathBuf,

    /// Public web root; uploads, bgm, and out live beneath it.
    #[arg(long, default_value = "public")]
    public_dir: PathBuf,

    /// Headless renderer executable.
    #[arg(long)]
    engine: PathBuf,

    /// Timeout in seconds for the selection and render stages.
    #[arg(long, default_value_t = 120)]
    stage_timeout: u64,
}

#[derive(Parser, Debug)]
struct UploadArgs {
    /// File to store.
    #[arg(long)]
    file: PathBuf,

    /// Session identifier namespacing the stored file.
    #[arg(long)]
    session: String,

    /// Public web root.
    #[arg(long, default_value = "public")]
    public_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Upload(args) => cmd_upload(args).await,
    }
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(&args.request)
        .with_context(|| format!("read export request '{}'", args.request.display()))?;
    let request = ExportRequest::from_json(&body)?;

    let mut config = PipelineConfig::with_public_dir(&args.public_dir);
    config.stage_timeout = Duration::from_secs(args.stage_timeout);

    let resolver = AssetResolver::new(config.clone(), RenderContext::Server);
    let engine = ProcessEngine::new(ProcessEngineOpts::new(&args.engine));
    let orchestrator = RenderOrchestrator::new(engine, config);

    let response = api::export(request, &resolver, &orchestrator).await;
    match response.url {
        Some(url) => {
            eprintln!("wrote {url}");
            Ok(())
        }
        None => anyhow::bail!(
            "export failed: {}",
            response.error.unwrap_or_else(|| "unknown error".to_owned())
        ),
    }
}

async fn cmd_upload(args: UploadArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("read upload '{}'", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow::anyhow!("upload path has no file name"))?;

    let config = PipelineConfig::with_public_dir(&args.public_dir);
    let store = UploadStore::new(&config);
    let response = api::upload(&store, &bytes, &file_name, &args.session).await;
    match response.path {
        Some(path) => {
            eprintln!("stored {path}");
            Ok(())
        }
        None => anyhow::bail!(
            "upload failed: {}",
            response
                .message
                .unwrap_or_else(|| "unknown error".to_owned())
        ),
    }
}

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scrollvision", version)]
struct Cli {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single composited frame as a PNG.
    Frame(FrameArgs),
    /// Play the video in real time and record it (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Print canvas size, line count, scroll speed and duration.
    Info(SourceArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Input configuration JSON. Asset references resolve next to it.
    #[arg(long)]
    config: PathBuf,

    /// Directory of `.ttf`/`.otf` files to register as font families.
    #[arg(long)]
    fonts: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Directory the finished recording is written into.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "scrollvision=debug" } else { "scrollvision=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(path: &Path) -> anyhow::Result<scrollvision::VideoConfig> {
    let config = scrollvision::VideoConfig::from_path(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    config.validate().with_context(|| format!("validate config '{}'", path.display()))?;
    Ok(config)
}

fn assets_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn load_fonts(dir: Option<&Path>) -> anyhow::Result<scrollvision::FontBook> {
    let mut fonts = scrollvision::FontBook::new();
    if let Some(dir) = dir {
        let n = fonts
            .load_dir(dir)
            .with_context(|| format!("load fonts from '{}'", dir.display()))?;
        tracing::info!(count = n, dir = %dir.display(), "registered font files");
    }
    fonts.mark_ready();
    Ok(fonts)
}

/// Build a player with the CPU surface and file-backed media.
fn build_player(
    source: &SourceArgs,
    clock: scrollvision::SharedClock,
    recorders: Box<dyn scrollvision::RecorderFactory>,
    downloads: Box<dyn scrollvision::DownloadSink>,
) -> anyhow::Result<scrollvision::Player> {
    let config = read_config(&source.config)?;
    let fonts = load_fonts(source.fonts.as_deref())?;
    let canvas = config.canvas();
    let surface = scrollvision::CpuSurface::new(canvas.width, canvas.height, fonts)?;
    let loader = scrollvision::AssetLoader::new(assets_root(&source.config));
    let parts = scrollvision::PlayerParts {
        clock: Arc::clone(&clock),
        surface: Box::new(surface),
        assets: loader.clone(),
        media: Box::new(scrollvision::FileMediaFactory::new(loader, clock)),
        monitor: Box::new(scrollvision::NullMonitor),
        recorders,
        downloads,
    };
    Ok(scrollvision::Player::new(config, parts)?)
}

fn idle_parts(
    out_dir: &Path,
) -> (Box<dyn scrollvision::RecorderFactory>, Box<dyn scrollvision::DownloadSink>) {
    (
        Box::new(scrollvision::InMemoryRecorderFactory::new()),
        Box::new(scrollvision::DirectoryDownloads::new(out_dir)),
    )
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let clock: scrollvision::SharedClock = Arc::new(scrollvision::SystemClock::new());
    let (recorders, downloads) = idle_parts(Path::new("."));
    let mut player = build_player(&args.source, clock, recorders, downloads)?;
    player.scrub(args.time);
    let frame = player.read_frame()?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} (t = {:.3}s)", args.out.display(), player.current_time());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        scrollvision::is_ffmpeg_on_path(),
        "ffmpeg is required for export but was not found on PATH"
    );

    let work_dir = create_work_dir(&args.out_dir)?;
    let clock: scrollvision::SharedClock = Arc::new(scrollvision::SystemClock::new());
    let recorders = scrollvision::FfmpegRecorderFactory::probe(work_dir.path())?;
    let downloads = scrollvision::DirectoryDownloads::new(&args.out_dir);
    let mut player = build_player(&args.source, clock, Box::new(recorders), Box::new(downloads))?;

    let fps = player.config().fps.max(1);
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(fps));
    eprintln!(
        "exporting {:.2}s at {fps} fps into {}",
        player.max_duration(),
        args.out_dir.display()
    );

    player.start_export()?;
    let mut last_percent = None;
    let outcome = loop {
        let report = player.tick();
        if let Some(name) = report.finished_export {
            break Ok(name);
        }
        if let Some(err) = report.failed_export {
            break Err(err);
        }
        if let Some(progress) = player.export_progress() {
            let percent = (progress * 100.0).floor() as u32;
            if last_percent != Some(percent) && percent % 10 == 0 {
                tracing::info!(percent, "export progress");
                last_percent = Some(percent);
            }
        }
        std::thread::sleep(frame_interval);
    };

    drop(work_dir);
    match outcome {
        Ok(name) => {
            eprintln!("wrote {}", args.out_dir.join(name).display());
            Ok(())
        }
        Err(err) => anyhow::bail!("export failed: {err}"),
    }
}

/// Scratch directory for intermediate encoder output, next to the destination. It is removed
/// when the returned guard drops, including on early `?` returns.
fn create_work_dir(out_dir: &Path) -> anyhow::Result<tempfile::TempDir> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;
    tempfile::Builder::new()
        .prefix(".scrollvision-work-")
        .tempdir_in(out_dir)
        .with_context(|| format!("create work dir in '{}'", out_dir.display()))
}

fn cmd_info(args: SourceArgs) -> anyhow::Result<()> {
    let clock: scrollvision::SharedClock = Arc::new(scrollvision::SystemClock::new());
    let (recorders, downloads) = idle_parts(Path::new("."));
    let mut player = build_player(&args, clock, recorders, downloads)?;
    let canvas = player.config().canvas();
    let line_count = player.lines().lines.len();
    let metrics = player.metrics();

    println!("canvas:        {}x{}", canvas.width, canvas.height);
    println!("lines:         {line_count}");
    println!("text height:   {:.1}px", metrics.text_height);
    println!("scroll speed:  {:.2}px/s", metrics.speed);
    println!("duration:      {:.2}s", metrics.max_duration);
    println!("voice:         {:?}", player.voice_status());
    Ok(())
}

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use kenburns::{
    AssetList, Catalogs, CpuCompositor, InlineLoader, RecordingHost, ShowConfig, SlideshowSession,
    TickRate, Variant, Viewport, audio::SilentPlayer, session::TickClock,
};

#[derive(Parser, Debug)]
#[command(name = "kenburns", version, about = "Folder slideshow with crossfades and Ken Burns drift")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// More log output (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the show live (requires `ffplay` on PATH).
    Play(ShowArgs),
    /// Render the show to an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the phase timeline of a run as JSON.
    Timeline(TimelineArgs),
    /// List the images and audio tracks a run would use.
    Scan(ShowArgs),
    /// Render the frame shown at a given time as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Configuration JSON; any field may be omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset to start from; fields set in the config file override it.
    #[arg(long, value_enum, default_value_t = Variant::Classic)]
    variant: Variant,

    /// Image folder.
    #[arg(long)]
    images: Option<PathBuf>,

    /// Audio folder.
    #[arg(long)]
    audio: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Tick (and output frame) rate.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    show: ShowArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    show: ShowArgs,

    /// Simulate this many images instead of scanning the image folder.
    #[arg(long)]
    count: Option<usize>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    show: ShowArgs,

    /// Show time in milliseconds.
    #[arg(long)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

impl ShowArgs {
    fn load(&self) -> anyhow::Result<ShowConfig> {
        let mut cfg = match &self.config {
            Some(path) => ShowConfig::from_json_file_over(path, &self.variant.config())?,
            None => self.variant.config(),
        };
        if let Some(dir) = &self.images {
            cfg.image_dir = dir.clone();
        }
        if let Some(dir) = &self.audio {
            cfg.audio_dir = Some(dir.clone());
        }
        if self.width.is_some() || self.height.is_some() {
            cfg.viewport = Viewport::new(
                self.width.unwrap_or(cfg.viewport.width),
                self.height.unwrap_or(cfg.viewport.height),
            )?;
        }
        if let Some(fps) = self.fps {
            cfg.tick_rate = TickRate::new(fps)?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Render(args) => cmd_render(args),
        Command::Timeline(args) => cmd_timeline(args),
        Command::Scan(args) => cmd_scan(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::WARN,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_play(args: ShowArgs) -> anyhow::Result<()> {
    let cfg = args.load()?;
    let report = kenburns::play_show(&cfg)?;
    if !report.finished {
        eprintln!("stopped after {} ticks", report.ticks);
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = args.show.load()?;
    let report = kenburns::render_show(&cfg, &args.out)?;
    eprintln!(
        "wrote {} ({} frames, {:.1} s)",
        report.out.display(),
        report.frames,
        report.duration_ms / 1000.0
    );
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let cfg = args.show.load()?;
    let count = match args.count {
        Some(n) => n,
        None => Catalogs::scan(&cfg)?.images.len(),
    };
    let timeline = kenburns::simulate_timeline(&cfg, count)?;
    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &timeline).context("write timeline JSON")?;
    println!();
    Ok(())
}

fn cmd_scan(args: ShowArgs) -> anyhow::Result<()> {
    let cfg = args.load()?;
    let catalogs = Catalogs::scan(&cfg)?;
    print_list("images", &catalogs.images);
    print_list("audio", &catalogs.audio);
    Ok(())
}

fn print_list(title: &str, list: &AssetList) {
    println!("{title} ({}):", list.len());
    for (i, path) in list.iter().enumerate() {
        println!("  {i:>4}  {}", path.display());
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut cfg = args.show.load()?;
    cfg.audio_dir = None;
    let catalogs = Catalogs::scan(&cfg)?;
    let mut session = SlideshowSession::new(
        &cfg,
        catalogs,
        InlineLoader::new(),
        SilentPlayer,
        RecordingHost::new(),
    )?;

    let target = Duration::from_millis(args.at_ms);
    let mut clock = TickClock::new(cfg.tick_rate);
    session.start(Duration::ZERO);
    loop {
        let (_, now) = clock.advance();
        session.tick(now);
        if now >= target || session.is_done() {
            break;
        }
    }

    let frame = CpuCompositor::default().render(&session.draw_list())?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

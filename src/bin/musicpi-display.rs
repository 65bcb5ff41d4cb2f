use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use musicpi_display::{
    BusWriter, ChainEmulator, ColumnOrder, FileStatusSource, FrameCycle, PanelConfig,
    PlaybackStatus, PreviewOpts, RenderScheduler, Scene, StatusSource, Transport,
};

#[derive(Parser, Debug)]
#[command(name = "musicpi-display", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the LED panel.
    Run(RunArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Fetch the status once and print it as JSON.
    Status(StatusArgs),
}

#[derive(Args, Debug)]
struct PanelArgs {
    /// Modules per row.
    #[arg(long, default_value_t = 4)]
    modules_x: u32,

    /// Module rows.
    #[arg(long, default_value_t = 2)]
    modules_y: u32,

    /// Row byte packing; use lsb-first for mirrored modules.
    #[arg(long, value_enum, default_value_t = OrderChoice::MsbFirst)]
    column_order: OrderChoice,

    /// Draw a seconds bar along the top row.
    #[arg(long)]
    seconds_indicator: bool,

    /// Draw a play/pause icon left of the clock.
    #[arg(long)]
    state_indicator: bool,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Read the status from this file instead of running mpc.
    #[arg(long)]
    status_file: Option<PathBuf>,

    /// Status program.
    #[arg(long, default_value = "mpc")]
    mpc: String,

    /// MPD host, passed as `-h`.
    #[arg(long)]
    host: Option<String>,

    /// MPD port, passed as `-p`.
    #[arg(long)]
    port: Option<u16>,

    /// Give up on one status program run after this many milliseconds.
    #[arg(long, default_value_t = 5000)]
    fetch_timeout_ms: u64,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    panel: PanelArgs,

    #[command(flatten)]
    source: SourceArgs,

    /// spidev node.
    #[arg(long, default_value = "/dev/spidev0.0")]
    spi_device: PathBuf,

    /// SPI clock in Hz.
    #[arg(long, default_value_t = 8_000_000)]
    spi_speed_hz: u32,

    /// Brightness, 0..=15.
    #[arg(long, default_value_t = 1)]
    intensity: u8,

    /// Status refresh period in milliseconds.
    #[arg(long, default_value_t = 500)]
    status_interval_ms: u64,

    /// Frame period in milliseconds.
    #[arg(long, default_value_t = 50)]
    frame_interval_ms: u64,

    /// Drive an in-process emulator instead of the SPI device.
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,

    /// With --dry-run, write the final panel contents to this PNG.
    #[arg(long, requires = "dry_run")]
    preview: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    panel: PanelArgs,

    #[command(flatten)]
    source: SourceArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Clock face time, HH:MM or HH:MM:SS. Defaults to now.
    #[arg(long, value_parser = parse_time)]
    time: Option<NaiveTime>,

    /// Horizontal title offset in pixels.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i32,

    /// Image pixels per LED.
    #[arg(long, default_value_t = 8)]
    scale: u32,
}

#[derive(Args, Debug)]
struct StatusArgs {
    #[command(flatten)]
    source: SourceArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderChoice {
    MsbFirst,
    LsbFirst,
}

impl From<OrderChoice> for ColumnOrder {
    fn from(choice: OrderChoice) -> Self {
        match choice {
            OrderChoice::MsbFirst => ColumnOrder::MsbFirst,
            OrderChoice::LsbFirst => ColumnOrder::LsbFirst,
        }
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| format!("expected HH:MM or HH:MM:SS: {e}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args).await,
        Command::Frame(args) => cmd_frame(args).await,
        Command::Status(args) => cmd_status(args).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn panel_config(panel: &PanelArgs, source: &SourceArgs) -> PanelConfig {
    PanelConfig {
        modules_x: panel.modules_x,
        modules_y: panel.modules_y,
        column_order: panel.column_order.into(),
        seconds_indicator: panel.seconds_indicator,
        state_indicator: panel.state_indicator,
        status_program: source.mpc.clone(),
        mpd_host: source.host.clone(),
        mpd_port: source.port,
        fetch_timeout: Duration::from_millis(source.fetch_timeout_ms),
        ..PanelConfig::default()
    }
}

async fn fetch_once(cfg: &PanelConfig, source: &SourceArgs) -> anyhow::Result<PlaybackStatus> {
    let status = match &source.status_file {
        Some(path) => FileStatusSource::new(path).fetch().await?,
        None => cfg.status_source().fetch().await?,
    };
    Ok(status)
}

async fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = PanelConfig {
        spi_device: args.spi_device.clone(),
        spi_speed_hz: args.spi_speed_hz,
        intensity: args.intensity,
        status_interval: Duration::from_millis(args.status_interval_ms),
        frame_interval: Duration::from_millis(args.frame_interval_ms),
        ..panel_config(&args.panel, &args.source)
    };
    cfg.validate()?;

    if args.dry_run {
        let emulator = ChainEmulator::new(cfg.geometry()?).with_column_order(cfg.column_order);
        let scheduler = drive(&cfg, &args, emulator).await?;
        if let Some(out) = &args.preview {
            let panel = scheduler.frame_cycle().bus().transport().to_pixel_buffer();
            write_png(&panel, out, PreviewOpts::default())?;
        }
        return Ok(());
    }

    run_spi(&cfg, &args).await
}

#[cfg(feature = "spi")]
async fn run_spi(cfg: &PanelConfig, args: &RunArgs) -> anyhow::Result<()> {
    let spi = musicpi_display::SpiTransport::open(&cfg.spi_opts())?;
    let mut scheduler = drive(cfg, args, spi).await?;
    let cleared = scheduler.frame_cycle_mut().bus_mut().clear();
    if !cleared.is_clean() {
        tracing::warn!(failed = cleared.failed, "failed to blank the panel on exit");
    }
    Ok(())
}

#[cfg(not(feature = "spi"))]
async fn run_spi(_cfg: &PanelConfig, _args: &RunArgs) -> anyhow::Result<()> {
    anyhow::bail!("built without the `spi` feature; use --dry-run")
}

async fn drive<T: Transport>(
    cfg: &PanelConfig,
    args: &RunArgs,
    transport: T,
) -> anyhow::Result<RenderScheduler<T>> {
    let geometry = cfg.geometry()?;
    let frame = FrameCycle::new(
        BusWriter::new(transport, cfg.encoder()?),
        Scene::new(geometry, cfg.scene_opts())?,
    )?;
    let mut scheduler = RenderScheduler::new(frame, cfg.scheduler_opts(args.frames))?;

    match &args.source.status_file {
        Some(path) => run_until_ctrl_c(&mut scheduler, FileStatusSource::new(path)).await?,
        None => run_until_ctrl_c(&mut scheduler, cfg.status_source()).await?,
    }
    Ok(scheduler)
}

async fn run_until_ctrl_c<T, S>(
    scheduler: &mut RenderScheduler<T>,
    source: S,
) -> anyhow::Result<()>
where
    T: Transport,
    S: StatusSource + Send + 'static,
{
    tokio::select! {
        stats = scheduler.run(source) => {
            let stats = stats?;
            eprintln!(
                "frames={} draw_failures={} status_refreshes={} status_failures={} bus_sent={} bus_failed={}",
                stats.frames,
                stats.draw_failures,
                stats.status.refreshes,
                stats.status.failures,
                stats.bus.frames_sent,
                stats.bus.frames_failed
            );
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("listen for ctrl-c")?;
            tracing::info!("interrupted");
        }
    }
    Ok(())
}

async fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = panel_config(&args.panel, &args.source);
    cfg.validate()?;
    let status = fetch_once(&cfg, &args.source).await?;
    let now = args.time.unwrap_or_else(musicpi_display::scheduler::local_time);

    // Push the frame through the encoder and an emulated chain so the PNG shows what the
    // modules would latch.
    let geometry = cfg.geometry()?;
    let mut scene = Scene::new(geometry, cfg.scene_opts())?;
    let frame = scene.compose(&status, now, args.offset);
    let mut bus = BusWriter::new(
        ChainEmulator::new(geometry).with_column_order(cfg.column_order),
        cfg.encoder()?,
    );
    bus.start_up(cfg.intensity);
    bus.draw(&frame)?;
    let panel = bus.transport().to_pixel_buffer();

    let opts = PreviewOpts {
        scale: args.scale,
        ..PreviewOpts::default()
    };
    write_png(&panel, &args.out, opts)?;
    Ok(())
}

async fn cmd_status(args: StatusArgs) -> anyhow::Result<()> {
    let cfg = PanelConfig {
        status_program: args.source.mpc.clone(),
        mpd_host: args.source.host.clone(),
        mpd_port: args.source.port,
        fetch_timeout: Duration::from_millis(args.source.fetch_timeout_ms),
        ..PanelConfig::default()
    };
    let status = fetch_once(&cfg, &args.source).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&status).context("serialize status")?
    );
    Ok(())
}

fn write_png(
    panel: &musicpi_display::PixelBuffer,
    out: &std::path::Path,
    opts: PreviewOpts,
) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    musicpi_display::save_png(panel, out, opts)
        .with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

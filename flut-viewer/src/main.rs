//! flut viewer — entry point.
//!
//! ```text
//! flut-viewer                    Connect with defaults
//! flut-viewer --config <path>    Use custom config TOML
//! flut-viewer --url <ws://...>   Override the server url
//! flut-viewer --dump <file.pam>  Write the last frame on exit
//! flut-viewer --gen-config       Dump default config and exit
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use flut_core::{ViewerClient, WatchSink};
use flut_viewer::config::ViewerConfig;
use flut_viewer::snapshot::write_pam;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "flut-viewer", about = "Pixelflut canvas viewer")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "flut-viewer.toml")]
    config: PathBuf,

    /// Server url (overrides config). Example: ws://127.0.0.1:9876
    #[arg(short, long)]
    url: Option<String>,

    /// Snapshot requests per second (overrides config).
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Write the last received frame to this PAM file on exit.
    #[arg(short, long)]
    dump: Option<PathBuf>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&ViewerConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = ViewerConfig::load(&cli.config);
    if let Some(url) = cli.url {
        config.network.url = url;
    }
    if let Some(freq) = cli.frequency {
        config.polling.update_frequency = freq;
    }
    if let Some(dump) = cli.dump {
        config.output.dump_path = dump.display().to_string();
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("flut-viewer v{}", env!("CARGO_PKG_VERSION"));
    info!("server: {}", config.network.url);
    info!("update frequency: {} Hz", config.polling.update_frequency);

    // ── 1. Build the client ─────────────────────────────────────

    let sink = WatchSink::new();
    let frame_rx = sink.frame_receiver();
    let stats_rx = sink.stats_receiver();

    let mut client = ViewerClient::new(config.session(), sink)?
        .with_auto_connect(config.network.auto_connect);

    if !config.network.auto_connect {
        info!("auto_connect is off; press Enter to connect");
        let mut line = String::new();
        tokio::io::BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;
        client.session_mut().connect()?;
    }

    // ── 2. Ctrl-C and stats ─────────────────────────────────────

    let stop = client.stop_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Ctrl-C received — disconnecting");
        stop.stop();
    });

    let stats_task = config.stats_interval().map(|period| {
        let stats_rx = stats_rx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let stats = stats_rx.borrow().clone();
                info!(
                    "{}x{} canvas, {:.1} fps, {} frames, {} bytes",
                    stats.width, stats.height, stats.fps, stats.total_frames, stats.total_bytes
                );
            }
        })
    });

    // ── 3. Run until the connection closes ──────────────────────

    let result = client.run().await;
    if let Some(task) = stats_task {
        task.abort();
    }

    // ── 4. Shutdown ─────────────────────────────────────────────

    if let Some(path) = config.dump_path() {
        let frame = frame_rx.borrow().clone();
        match write_pam(&path, &frame) {
            Ok(()) => info!("wrote last frame to {}", path.display()),
            Err(e) => warn!("could not write {}: {e}", path.display()),
        }
    }

    let stats = stats_rx.borrow().clone();
    info!("received {} frames", stats.total_frames);

    if let Err(e) = result {
        error!("viewer stopped: {e}");
        return Err(e.into());
    }
    Ok(())
}

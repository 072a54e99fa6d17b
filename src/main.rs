//! runewalker
//!
//! Patrols a game map from the mini-map overview, clears arrow captchas and
//! offers offline tools for screenshots.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use runewalker::control::TracingSink;
use runewalker::vision::diagnostics::trace_gradients;
use runewalker::vision::{locate_in, ArrowDecoder, FrameSource, StillSource, WindowSource};
use runewalker::{Config, Pilot};

#[derive(Parser, Debug)]
#[command(name = "runewalker")]
#[command(about = "Mini-map patrol pilot and arrow captcha reader")]
struct Cli {
    /// TOML config file. Defaults to ./runewalker.toml when present.
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the patrol loop until Ctrl+C. Input is logged, not injected.
    Run {
        /// Replay a saved screenshot instead of capturing the live window.
        #[arg(long)]
        still: Option<PathBuf>,
    },
    /// Print the overview position of every palette entry in a screenshot.
    Locate { image: PathBuf },
    /// Decode captcha screenshots. Directories are scanned for PNG files.
    Decode {
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Write `<name>_parsed.png` gradient traces here.
        #[arg(long)]
        debug_out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Run { still } => run(config, still).await,
        Command::Locate { image } => locate(&config, &image),
        Command::Decode { images, debug_out } => decode(&config, &images, debug_out.as_deref()),
    }
}

async fn run(config: Config, still: Option<PathBuf>) -> Result<()> {
    let source: Box<dyn FrameSource> = match still {
        Some(path) => Box::new(
            StillSource::open(&path).with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(
            WindowSource::new(config.window.target.clone()).context("screen capture unavailable")?,
        ),
    };

    let mut pilot = Pilot::new(&config, source, TracingSink::new());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, stopping");
            trigger.cancel();
        }
    });

    tracing::info!("Runewalker active. Press Ctrl+C to stop.");
    let result = pilot.run(&cancel).await;

    let snapshot = pilot.telemetry().snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    result.context("pilot failed")
}

fn locate(config: &Config, image: &Path) -> Result<()> {
    let still = StillSource::open(image).with_context(|| format!("failed to open {}", image.display()))?;
    let overview = config.regions.overview;

    for (name, signature) in config.palette.named() {
        let positions = locate_in(still.frame(), overview, &[signature])
            .with_context(|| format!("overview region {} does not fit {}", overview, image.display()))?;
        match positions.first() {
            Some(position) => println!("{:<10} {}", name, position),
            None => println!("{:<10} -", name),
        }
    }
    Ok(())
}

fn decode(config: &Config, inputs: &[PathBuf], debug_out: Option<&Path>) -> Result<()> {
    let decoder = ArrowDecoder::new(config.regions.captcha, config.decoder.clone());
    if let Some(dir) = debug_out {
        std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    for path in expand_inputs(inputs)? {
        let still = StillSource::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
        let readings = decoder.read(still.frame());
        let directions: Vec<_> = readings.iter().map(|r| r.direction).collect();
        let status = if decoder.is_complete(&directions) { "ok" } else { "incomplete" };
        println!("{}: {:?} ({})", path.display(), directions, status);

        if let Some(dir) = debug_out {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
            let out = dir.join(format!("{}_parsed.png", stem));
            trace_gradients(&decoder, still.frame(), &readings)
                .save(&out)
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
    }
    Ok(())
}

/// Files pass through; directories contribute their PNG files in name order.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = std::fs::read_dir(input)
            .with_context(|| format!("failed to list {}", input.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("png")))
            .collect();
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emojify::assets::OverlaySet;
use emojify::pipeline::FaceStatus;
use emojify::session::{Capture, PhotoSession};
use emojify::signals::SignalFile;
use emojify::{classify, config, Pipeline, VisionError};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "emojify")]
#[command(version, about = "Draw an emoji matching each face's expression over a photo")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emojify a photo
    Run {
        /// Photo to process
        image: PathBuf,
        /// Face signals JSON (defaults to <image>.faces.json)
        #[arg(short, long)]
        faces: Option<PathBuf>,
        /// Output file (defaults to a new file in the configured output dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overlay directory (overrides config)
        #[arg(short, long)]
        assets: Option<PathBuf>,
    },
    /// Print the expression of every face in a signals file
    Classify {
        /// Face signals JSON
        faces: PathBuf,
    },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            image,
            faces,
            output,
            assets,
        } => run(&cfg, &image, faces, output, assets),
        Commands::Classify { faces } => classify_faces(&faces),
        Commands::Config => open_config(cli.config.as_deref()),
    }
}

fn run(
    cfg: &config::Config,
    image: &Path,
    faces: Option<PathBuf>,
    output: Option<PathBuf>,
    assets: Option<PathBuf>,
) -> Result<()> {
    let assets_dir = assets.unwrap_or_else(|| cfg.assets_dir.clone());
    let overlays = OverlaySet::load(&assets_dir).context("Failed to load overlay assets")?;
    let missing = overlays.missing();
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|c| c.to_string()).collect();
        warn!(
            "No overlay for {}; faces with these expressions will fail",
            names.join(", ")
        );
    }

    let detector = match faces {
        Some(path) => SignalFile::new(path),
        None => SignalFile::sidecar(image),
    };
    info!("Reading face signals from {}", detector.path().display());

    let pipeline = Pipeline::new(detector).with_scaling(cfg.height_scaling);
    let mut session = PhotoSession::new();

    session
        .capture(Capture::File(image.to_path_buf()), cfg.max_dimension)
        .context("Failed to load photo")?;

    let result = match session.process(&pipeline, &overlays) {
        Ok(result) => result,
        Err(emojify::session::SessionError::Vision(VisionError::MissingOverlay(category))) => {
            anyhow::bail!(
                "No emoji available for expression {} (expected {})",
                category,
                emojify::assets::asset_path(&assets_dir, category).display()
            );
        }
        Err(e) => return Err(e).context("Failed to emojify photo"),
    };

    if result.faces.is_empty() {
        warn!("No faces detected, photo left unchanged");
    }
    for (i, face) in result.faces.iter().enumerate() {
        match &face.status {
            FaceStatus::Applied => info!("Face {}: {}", i + 1, face.category),
            FaceStatus::Skipped(reason) => warn!("Face {}: skipped ({})", i + 1, reason),
        }
    }

    let saved = match output {
        Some(path) => {
            session.save_as(&path).context("Failed to save photo")?;
            path
        }
        None => session
            .save(&cfg.output_dir)
            .context("Failed to save photo")?,
    };

    info!("✓ Saved to {}", saved.display());
    Ok(())
}

fn classify_faces(path: &Path) -> Result<()> {
    let faces = SignalFile::new(path)
        .read()
        .context("Failed to read face signals")?;

    if faces.is_empty() {
        info!("No faces in {}", path.display());
    }
    for (i, face) in faces.iter().enumerate() {
        println!(
            "{}\t{}\t(smile {:.3}, left eye {:.3}, right eye {:.3})",
            i + 1,
            classify(face),
            face.smiling_probability,
            face.left_eye_open_probability,
            face.right_eye_open_probability
        );
    }
    Ok(())
}

fn open_config(path: Option<&Path>) -> Result<()> {
    let config_path = path.unwrap_or(&config::CONFIG_PATH);
    if !config_path.exists() {
        config::save_config(&config::Config::default(), Some(config_path))
            .context("Failed to write default config")?;
    }
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}

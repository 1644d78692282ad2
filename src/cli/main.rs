//! Staging pipeline CLI
//!
//! Local operation of the pipeline: provision a storage root, upload an
//! image, run a transformation, fetch the result. Uses the built-in
//! chroma-key segmenter; deployments with a neural model drive the library
//! directly instead.

use crate::{
    config::StorageConfig,
    pipeline::StagingPipeline,
    segmentation::ChromaKeySegmenter,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Image staging and background removal pipeline
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "recorte")]
pub struct Cli {
    /// Storage root the managed image directories live under
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub storage_root: PathBuf,

    /// Chroma-key tolerance for the built-in segmenter (0-255)
    #[arg(long, default_value_t = 16)]
    pub tolerance: u8,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the storage directories and exit
    Provision,
    /// Copy a local image into the input root
    Upload {
        /// Image file to upload
        file: PathBuf,
    },
    /// Remove the background of an uploaded image
    Remove {
        /// Logical file name in the input root
        file_name: String,
    },
    /// Remove the background and composite a solid color underneath
    Add {
        /// Logical file name in the input root
        file_name: String,
        /// Background color (hex RGB/RGBA, "black", or "white")
        #[arg(short, long, default_value = "black")]
        color: String,
    },
    /// Resize an uploaded image
    Resize {
        /// Logical file name in the input root
        file_name: String,
        /// Resize mode: "half" or an explicit "WIDTHxHEIGHT"
        #[arg(short, long, default_value = "half")]
        mode: String,
    },
    /// Read a processed image back from the output root
    Fetch {
        /// Logical file name in the output root
        file_name: String,
        /// Where to write the fetched bytes
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Print the service health report as JSON
    Health,
}

/// CLI entry point
pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = StorageConfig::new(&cli.storage_root)?;
    let segmenter = Arc::new(ChromaKeySegmenter::new(cli.tolerance));
    let pipeline = StagingPipeline::new(config, segmenter)
        .context("failed to provision the storage root")?;

    match cli.command {
        Command::Provision => {
            // Provisioning already ran in StagingPipeline::new.
            info!(root = %cli.storage_root.display(), "storage directories ready");
        },
        Command::Upload { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let name = file
                .file_name()
                .context("upload path has no file name")?
                .to_string_lossy();
            let stored = pipeline.upload(&name, &bytes)?;
            println!("{stored}");
        },
        Command::Remove { file_name } => {
            let output = pipeline.remove_background(&file_name)?;
            println!("{output}");
        },
        Command::Add { file_name, color } => {
            let output = pipeline.add_background(&file_name, Some(&color))?;
            println!("{output}");
        },
        Command::Resize { file_name, mode } => {
            let output = pipeline.resize(&file_name, &mode)?;
            println!("{output}");
        },
        Command::Fetch { file_name, output } => {
            let bytes = pipeline.fetch_output(&file_name)?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("failed to write '{}'", output.display()))?;
            println!("{}", output.display());
        },
        Command::Health => {
            let report = pipeline.health_check();
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
    }
    Ok(())
}

fn init_tracing(verbosity: u8) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recorte={default_filter}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_transformation_commands() {
        let cli = Cli::try_parse_from([
            "recorte",
            "--storage-root",
            "/srv/recorte",
            "add",
            "teste.jpg",
            "--color",
            "#FFFFFF",
        ])
        .unwrap();
        assert_eq!(cli.storage_root, PathBuf::from("/srv/recorte"));
        match cli.command {
            Command::Add { file_name, color } => {
                assert_eq!(file_name, "teste.jpg");
                assert_eq!(color, "#FFFFFF");
            },
            _ => panic!("expected add subcommand"),
        }
    }

    #[test]
    fn resize_defaults_to_half() {
        let cli = Cli::try_parse_from(["recorte", "resize", "teste.jpg"]).unwrap();
        match cli.command {
            Command::Resize { mode, .. } => assert_eq!(mode, "half"),
            _ => panic!("expected resize subcommand"),
        }
    }
}

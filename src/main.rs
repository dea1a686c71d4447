//! xrcam-anim - WebXR camera animation tool
//!
//! Inspects and converts WebXR camera pose recordings (.json), driving the
//! import and export pipelines through the in-memory host scene.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use xrcam_anim::{
    parse_clip, CoordinateSystem, ExportConfig, ImportConfig, MemoryScene, Outcome,
    ReferenceSpace, SampleMode,
};

#[derive(Parser)]
#[command(name = "xrcam-anim")]
#[command(about = "WebXR camera animation import/export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a recording
    Info {
        /// Input recording (.json)
        input: PathBuf,
    },

    /// Resample and rescale a recording through the keyframe pipelines
    Convert {
        /// Input recording (.json)
        input: PathBuf,

        /// Output .json file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keyframe conversion rate (default: 30)
        #[arg(short, long)]
        frame_rate: Option<f32>,

        /// Position scale factor (default: 1)
        #[arg(short, long)]
        scale: Option<f32>,

        /// Re-base poses relative to the origin pose instead of absolute
        #[arg(long)]
        apply_deltas: bool,

        /// Frame sampling: keyframes, all-frames, or custom-rate
        #[arg(long, default_value = "keyframes")]
        sample_mode: String,

        /// Sample every Nth frame (custom-rate mode only)
        #[arg(long, default_value_t = 1)]
        stride: u32,

        /// Leave position data out of the output
        #[arg(long)]
        no_position: bool,

        /// Reference space recorded in the output envelope
        #[arg(long, default_value = "local-floor")]
        reference_space: String,

        /// Keep host Z-up axes instead of round-tripping through WebXR space
        #[arg(long)]
        keep_space: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => {
            let text = std::fs::read_to_string(&input)?;
            let clip = parse_clip(&text)?;

            let with_position = clip.frames.iter().filter(|f| f.p.is_some()).count();
            tracing::info!("Recording {:?}:", input);
            tracing::info!(
                "  {} frames, {:.2}s ({} with position data)",
                clip.frames.len(),
                clip.duration(),
                with_position
            );
            tracing::info!(
                "  reference space: {}",
                clip.reference_space_type.as_deref().unwrap_or("(unset)")
            );
            for (key, value) in &clip.metadata {
                tracing::info!("  metadata.{}: {}", key, value);
            }
        }

        Commands::Convert {
            input,
            output,
            frame_rate,
            scale,
            apply_deltas,
            sample_mode,
            stride,
            no_position,
            reference_space,
            keep_space,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("converted.json"));
            let sample_mode: SampleMode = sample_mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let reference_space: ReferenceSpace = reference_space
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let scale_factor = scale.unwrap_or(1.0);

            let import_config = ImportConfig {
                scale_factor,
                apply_deltas,
                frame_rate: frame_rate.unwrap_or(30.0),
                coordinate_system: if keep_space {
                    CoordinateSystem::Webxr // keep wire axes on the way in
                } else {
                    CoordinateSystem::Host
                },
                ..Default::default()
            };
            let export_config = ExportConfig {
                scale_factor,
                sample_mode,
                custom_sample_rate: stride,
                export_position: !no_position,
                reference_space_type: reference_space,
                coordinate_system: if keep_space {
                    CoordinateSystem::Host // no conversion on the way out either
                } else {
                    CoordinateSystem::Webxr
                },
                ..Default::default()
            };

            tracing::info!("Converting {:?} -> {:?}", input, output);

            let mut scene = MemoryScene::new();
            finish(xrcam_anim::import_file(&mut scene, &input, &import_config))?;
            finish(xrcam_anim::export_file(&mut scene, &output, &export_config))?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}

/// Map an operation outcome onto the process boundary: log and continue on
/// success, non-zero exit otherwise.
fn finish(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Finished(message) => {
            tracing::info!("{message}");
            Ok(())
        }
        Outcome::Cancelled(message) | Outcome::Failed(message) => {
            anyhow::bail!("{message}")
        }
    }
}

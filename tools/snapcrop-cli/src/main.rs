//! Snapcrop CLI: capture a screenshot, crop it, then save, copy, or discard it.
//!
//! Usage:
//!   snapcrop capture [OPTIONS]       Capture the screen and open the editor flow
//!   snapcrop edit <ARTIFACT>         Crop an existing capture artifact
//!   snapcrop check                   Check system capabilities
//!   snapcrop clean                   Remove temp and cache artifacts
//!   snapcrop prefs                   Show or reset preferences

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

mod collaborators;
mod commands;
mod gesture;

#[derive(Parser)]
#[command(
    name = "snapcrop",
    about = "Screenshot capture with interactive cropping",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Replay a PNG from disk as the display surface
    Replay,
    /// Capture the X11 display through GStreamer
    Gst,
}

/// Options applied to the crop editor before the terminal action runs.
#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// View size the image is fitted into, as WxH (defaults to the image size)
    #[arg(long, value_parser = gesture::parse_view_size)]
    view: Option<(f64, f64)>,

    /// Aspect ratio constraint: free, 1:1, 4:3, 16:9, 9:16, or any W:H
    #[arg(long)]
    aspect: Option<String>,

    /// Rotate the displayed image (degrees, about the view center)
    #[arg(long, allow_negative_numbers = true)]
    rotate: Option<f64>,

    /// Pointer script in view coordinates, e.g. "press:300,300 move:350,320 release"
    #[arg(long)]
    gesture: Option<String>,

    /// Terminal action to run without prompting: save, copy, discard
    #[arg(long)]
    action: Option<String>,

    /// Hand the crop to the default viewer before the terminal action
    #[arg(long)]
    share: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture the screen, then crop and dispatch the result
    Capture {
        /// Capture backend
        #[arg(long, value_enum, default_value = "replay")]
        backend: BackendKind,

        /// PNG used as the display surface by the replay backend
        #[arg(long)]
        source: Option<PathBuf>,

        /// Status bar rows to trim from the top of the frame
        #[arg(long)]
        inset: Option<u32>,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Crop an existing capture artifact
    Edit {
        /// Path to the temp artifact
        artifact: PathBuf,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// Check system capabilities
    Check,

    /// Remove temp and cache artifacts
    Clean,

    /// Show or reset preferences
    Prefs {
        /// Print current preferences (the default when nothing is reset)
        #[arg(long)]
        show: bool,

        /// Forget the remembered terminal action
        #[arg(long)]
        reset_remembered: bool,

        /// Restore every preference to its default
        #[arg(long)]
        reset_all: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(snapcrop_common::config::config_file_path);
    let mut config = snapcrop_common::config::AppConfig::load_from(&config_path);

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    snapcrop_common::logging::init_logging(&config.logging);

    let prefs = std::sync::Arc::new(snapcrop_common::config::FilePreferencesStore::at(
        &config_path,
    ));

    match cli.command {
        Commands::Capture {
            backend,
            source,
            inset,
            edit,
        } => commands::capture::run(&config, prefs, backend, source, inset, edit).await,
        Commands::Edit { artifact, edit } => {
            commands::edit::run(&config, prefs, artifact, edit).await
        }
        Commands::Check => commands::check::run(),
        Commands::Clean => commands::clean::run(&config),
        Commands::Prefs {
            show,
            reset_remembered,
            reset_all,
        } => commands::prefs::run(prefs.as_ref(), show, reset_remembered, reset_all),
    }
}

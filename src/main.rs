// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qrreader::config::Config;
use qrreader::i18n;
use qrreader::logging::{self, LogTarget};
use qrreader::permissions::PermissionBackendKind;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "qrreader")]
#[command(about = "Scan QR codes from a camera or image files")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Permission backend (auto, portal, device-node, granted, denied)
    #[arg(long, global = true, value_parser = parse_backend)]
    permission: Option<PermissionBackendKind>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive scanner in the terminal (default)
    Terminal {
        /// Use image files as the camera feed (repeatable)
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,

        /// Video device to scan from, e.g. /dev/video0
        #[arg(short, long, conflicts_with = "images")]
        device: Option<String>,
    },

    /// Decode QR codes from image files
    Scan {
        /// Image files to decode
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Wait for Enter after each result
        #[arg(short, long)]
        wait: bool,
    },

    /// Check camera permission
    Permission,

    /// List video devices
    List,
}

fn parse_backend(value: &str) -> Result<PermissionBackendKind, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown permission backend '{}'", value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set RUST_LOG to control the level, e.g. RUST_LOG=qrreader=debug.
    // The terminal scanner logs to a file so output cannot land on its screen.
    let interactive = matches!(cli.command, None | Some(Commands::Terminal { .. }));
    logging::init(&LogTarget::for_command(interactive));

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    if let Some(backend) = cli.permission {
        config.permission_backend = backend;
    }

    match cli.command {
        Some(Commands::Terminal { images, device }) => {
            let source = qrreader::terminal::resolve_source(images, device, &config);
            qrreader::terminal::run(config, source)
        }
        None => {
            let source = qrreader::terminal::resolve_source(Vec::new(), None, &config);
            qrreader::terminal::run(config, source)
        }
        Some(Commands::Scan { paths, wait }) => cli::scan_images(&config, &paths, wait),
        Some(Commands::Permission) => cli::check_permission(&config),
        Some(Commands::List) => cli::list_cameras(),
    }
}

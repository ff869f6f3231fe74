#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use vitetags_core::Config;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "vitetags.json";

#[derive(Parser, Debug)]
#[command(name = "vitetags")]
#[command(author, version, about = "Inspect Vite manifests and the tags pages get from them", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Config file (defaults to ./vitetags.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Print the tags a page requiring ENTRY would receive
    Resolve {
        /// Manifest key of the entry, e.g. src/main.ts
        entry: String,

        /// Treat the entry as a stylesheet
        #[arg(long)]
        css: bool,

        /// Media query for a stylesheet entry
        #[arg(long, requires = "css")]
        media: Option<String>,

        /// Skip preload/modulepreload links
        #[arg(long)]
        no_preload: bool,

        /// Tag options as a JSON object, e.g. '{"defer":true}'
        #[arg(long, value_name = "JSON")]
        options: Option<String>,

        /// Base URL built files are served under
        #[arg(long, default_value = "/")]
        base_url: String,

        /// Directory the output base is relative to
        #[arg(long, default_value = ".", value_name = "PATH")]
        public_root: PathBuf,

        /// Fail when a built file is missing on disk
        #[arg(long)]
        verify: bool,
    },

    /// Report whether the configured dev server is reachable
    Probe,

    /// Validate the manifest against the build output on disk
    Check {
        /// Directory the output base is relative to
        #[arg(long, default_value = ".", value_name = "PATH")]
        public_root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    logging::init(cli.verbose, cli.json);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Resolve {
            entry,
            css,
            media,
            no_preload,
            options,
            base_url,
            public_root,
            verify,
        }) => {
            let config = load_config(&cwd, cli.config.as_deref())?;
            let span = tracing::info_span!("resolve", cmd = "resolve", cwd = %cwd.display());
            let _guard = span.enter();
            let action = commands::resolve::ResolveAction {
                entry,
                css,
                media,
                preload: !no_preload,
                options,
                base_url,
                public_root: absolutize(&cwd, &public_root),
                verify,
            };
            commands::resolve::run(&config, &action, cli.json)
        }
        Some(Commands::Probe) => {
            let config = load_config(&cwd, cli.config.as_deref())?;
            commands::probe::run(&config, cli.json)
        }
        Some(Commands::Check { public_root }) => {
            let config = load_config(&cwd, cli.config.as_deref())?;
            let span = tracing::info_span!("check", cmd = "check", cwd = %cwd.display());
            let _guard = span.enter();
            commands::check::run(&config, &absolutize(&cwd, &public_root), cli.json)
        }
    }
}

/// File config (explicit or `./vitetags.json`), then environment overrides.
/// A relative manifest path is taken relative to `cwd`.
fn load_config(cwd: &Path, explicit: Option<&Path>) -> Result<Config> {
    let file = match explicit {
        Some(path) => Some(absolutize(cwd, path)),
        None => Some(cwd.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    let base = match &file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            Config::load(path).into_diagnostic()?
        }
        None => Config::default(),
    };

    let mut config = base
        .with_env_overrides(|key| std::env::var(key).ok())
        .into_diagnostic()?;
    config.manifest_path = absolutize(cwd, &config.manifest_path);
    Ok(config)
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

//! `scanfuse` – command line front end for scanner registration.
//!
//! ```text
//! scanfuse solve scans.json            # beacon count + max scanner spread
//! scanfuse solve scans.json --json     # same, as a JSON object
//! scanfuse schema                      # JSON Schema of the scan document
//! scanfuse config [--init]             # show / write ~/.scanfuse/config.toml
//! ```
//!
//! Settings come from `~/.scanfuse/config.toml`, then `SCANFUSE_*`
//! environment variables, then command line flags.

mod config;
mod input;
mod telemetry;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;
use scanfuse_registration::{Engine, Registration};
use scanfuse_types::ScannerId;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "scanfuse")]
#[command(version)]
#[command(about = "Merge overlapping 3-D scanner reports into one frame", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a scan set and report its beacons and scanner spread
    Solve {
        /// Scan document (JSON)
        file: PathBuf,

        /// Correspondences needed for two scanners to overlap
        #[arg(long)]
        threshold: Option<usize>,

        /// Scanner id whose frame becomes the global frame
        #[arg(long)]
        root: Option<ScannerId>,

        /// Compare scanner pairs on a single thread
        #[arg(long)]
        sequential: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the JSON Schema of the scan document
    Schema,

    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let _guard = telemetry::init_tracing("scanfuse");
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve {
            file,
            threshold,
            root,
            sequential,
            json,
        } => cmd_solve(&file, threshold, root, sequential, json),
        Commands::Schema => input::schema_json().map(|schema| println!("{schema}")),
        Commands::Config { init } => cmd_config(init),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_solve(
    file: &Path,
    threshold: Option<usize>,
    root: Option<ScannerId>,
    sequential: bool,
    json: bool,
) -> Result<(), String> {
    let mut cfg = load_config();
    if let Some(t) = threshold {
        cfg.overlap_threshold = t;
    }
    if root.is_some() {
        cfg.root_scanner = root;
    }
    if sequential {
        cfg.parallel = false;
    }
    debug!(config = ?cfg, "effective configuration");

    let started = Instant::now();
    let doc = input::load(file)?;
    let registration = Engine::new(cfg.engine_config())
        .run(&doc.scanners)
        .map_err(|e| e.to_string())?;
    info!(
        scanners = doc.scanners.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "solved {}",
        file.display()
    );

    if json {
        let out = serde_json::to_string_pretty(&registration.summary())
            .map_err(|e| format!("Failed to serialize summary: {}", e))?;
        println!("{out}");
    } else {
        print_summary(&registration);
    }
    Ok(())
}

fn cmd_config(init: bool) -> Result<(), String> {
    let path = config::config_path();
    if init {
        if path.exists() {
            println!("  Config already exists at {}", path.display().to_string().bold());
        } else {
            config::save(&config::Config::default())?;
            println!(
                "  {} Config saved to {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
        }
    }

    let cfg = load_config();
    println!("  {:<18} {}", "overlap_threshold".dimmed(), cfg.overlap_threshold);
    println!("  {:<18} {}", "parallel".dimmed(), cfg.parallel);
    println!(
        "  {:<18} {}",
        "root_scanner".dimmed(),
        cfg.root_scanner
            .map_or_else(|| "<first report>".to_string(), |id| id.to_string())
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Config file plus env overrides; defaults when absent or unreadable.
fn load_config() -> config::Config {
    let mut cfg = match config::load() {
        Ok(Some(cfg)) => return cfg,
        Ok(None) => config::Config::default(),
        Err(e) => {
            warn!(error = %e, "config unreadable; using defaults");
            config::Config::default()
        }
    };
    config::apply_env_overrides(&mut cfg);
    cfg
}

fn print_summary(registration: &Registration) {
    let frame = &registration.frame;
    let summary = registration.summary();
    println!();
    println!(
        "  {:<22} {}",
        "Scanners placed".bold(),
        frame.placements().len()
    );
    println!("  {:<22} {}", "Overlap edges".bold(), registration.graph.edge_count());
    println!(
        "  {:<22} {}",
        "Distinct beacons".bold(),
        summary.beacon_count.to_string().green().bold()
    );
    println!(
        "  {:<22} {}",
        "Max scanner distance".bold(),
        summary.max_manhattan_distance.to_string().green().bold()
    );
    println!();
}

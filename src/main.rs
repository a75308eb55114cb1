//! jarscope: archive usage inventory
//!
//! Records which archives a process declares and which it actually loads
//! from, then aggregates those inventories across processes.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jarscope::{
    cli::{self, AggregateOptions, CaptureOptions},
    config::{AppConfig, AppConfigBuilder, ConfigPreset, Validatable},
    identity::RuntimeInfo,
    pipeline::exit_codes,
    reports::ReportFormat,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jarscope")]
#[command(version)]
#[command(about = "Archive usage inventory across processes", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Requested archive, application or manifest not found
    2  Error occurred

EXAMPLES:
    # What does a raw location normalize to?
    jarscope normalize 'jar:nested:/app/app.jar/!BOOT-INF/lib/a.jar!/'

    # Snapshot a classpath and store it
    jarscope capture app.jar lib/*.jar --nested --save --command-line 'java -jar app.jar'

    # Cross-process view of the stored snapshots
    jarscope aggregate --loaded-only")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Start from a named preset (default, ci-cd, lightweight)
    #[arg(long, global = true, value_parser = parse_preset)]
    preset: Option<ConfigPreset>,

    /// Output format
    #[arg(short, long, global = true)]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long, global = true)]
    output_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `capture` subcommand
#[derive(Parser)]
struct CaptureArgs {
    /// Archives on the load path
    #[arg(required = true)]
    archives: Vec<PathBuf>,

    /// Location a class was loaded from (repeatable)
    #[arg(long = "loaded", value_name = "LOCATION")]
    loaded: Vec<String>,

    /// Also declare archives packaged inside each archive
    #[arg(long)]
    nested: bool,

    /// Store the snapshot in the snapshot directory
    #[arg(long)]
    save: bool,

    /// Snapshot directory (overrides config)
    #[arg(long, env = "JARSCOPE_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Skip content hashing
    #[arg(long)]
    no_hash: bool,

    /// Skip manifest reads
    #[arg(long)]
    no_manifests: bool,

    /// Command line of the monitored process
    #[arg(long, default_value = "")]
    command_line: String,

    /// Runtime version
    #[arg(long, default_value = "")]
    runtime_version: String,

    /// Runtime vendor
    #[arg(long, default_value = "")]
    runtime_vendor: String,

    /// Runtime installation path
    #[arg(long, default_value = "")]
    runtime_path: String,
}

/// Arguments for the `aggregate` subcommand
#[derive(Parser)]
struct AggregateArgs {
    /// Snapshot files or directories (default: the snapshot directory)
    paths: Vec<PathBuf>,

    /// Snapshot directory (overrides config)
    #[arg(long, env = "JARSCOPE_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Show one archive by content hash or canonical id
    #[arg(long, value_name = "KEY", conflicts_with_all = ["apps", "app"])]
    detail: Option<String>,

    /// Only list archives loaded by at least one process
    #[arg(long)]
    loaded_only: bool,

    /// List applications instead of archives
    #[arg(long, conflicts_with = "app")]
    apps: bool,

    /// Only list archives referenced by this application id
    #[arg(long, value_name = "APP_ID")]
    app: Option<String>,

    /// YAML file mapping application ids to name, description and tags
    #[arg(long)]
    labels: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the canonical identifier of raw locations
    Normalize {
        /// Raw location strings
        #[arg(required = true)]
        locations: Vec<String>,
    },

    /// Print the manifest attributes of an archive or class directory
    Manifest {
        /// Raw location of the archive, nested archive or directory
        location: String,
    },

    /// Snapshot the inventory of a set of archives
    Capture(CaptureArgs),

    /// Render the inventory report of a stored snapshot
    Report {
        /// Snapshot file
        snapshot: PathBuf,
    },

    /// Aggregate snapshots across processes
    Aggregate(AggregateArgs),

    /// Generate JSON Schema for the config file format (honours -O)
    ConfigSchema,

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .jarscope.yaml in the current directory
    Init,
}

fn parse_preset(name: &str) -> std::result::Result<ConfigPreset, String> {
    ConfigPreset::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = ConfigPreset::all().iter().map(ConfigPreset::name).collect();
        format!("unknown preset '{name}' (expected one of: {})", known.join(", "))
    })
}

/// Layer the preset and global flags over the discovered config file.
fn effective_config(cli: &Cli, extra: impl FnOnce(AppConfig) -> AppConfig) -> Result<AppConfig> {
    let builder = match cli.preset {
        Some(preset) => AppConfigBuilder::from_preset(preset),
        None => AppConfig::builder(),
    };
    let mut builder = builder
        .no_color(cli.no_color)
        .output_file(cli.output_file.clone());
    if let Some(format) = cli.output {
        builder = builder.output_format(format);
    }
    let overrides = extra(builder.build());

    let (config, loaded_from) = AppConfig::from_file_with_overrides(cli.config.as_deref(), &overrides);
    if let Some(path) = loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<i32> {
    let exit_code = match &cli.command {
        Commands::Normalize { locations } => {
            let config = effective_config(cli, |c| c)?;
            cli::run_normalize(locations, &config.report)?
        }

        Commands::Manifest { location } => {
            let config = effective_config(cli, |c| c)?;
            cli::run_manifest(location, &config.report)?
        }

        Commands::Capture(args) => {
            let config = effective_config(cli, |mut c| {
                if args.no_hash {
                    c.inventory.compute_hashes = false;
                }
                if args.no_manifests {
                    c.inventory.read_manifests = false;
                }
                c.aggregate.snapshot_dir.clone_from(&args.snapshot_dir);
                c
            })?;
            let options = CaptureOptions {
                archives: args.archives.clone(),
                loaded: args.loaded.clone(),
                runtime: RuntimeInfo::new(
                    args.command_line.as_str(),
                    args.runtime_version.as_str(),
                    args.runtime_vendor.as_str(),
                    args.runtime_path.as_str(),
                ),
                nested: args.nested,
                save: args.save,
            };
            cli::run_capture(options, &config)?
        }

        Commands::Report { snapshot } => {
            let config = effective_config(cli, |c| c)?;
            cli::run_report(snapshot, &config.report)?
        }

        Commands::Aggregate(args) => {
            let config = effective_config(cli, |mut c| {
                c.aggregate.snapshot_dir.clone_from(&args.snapshot_dir);
                c.aggregate.loaded_only |= args.loaded_only;
                c
            })?;
            let options = AggregateOptions {
                paths: args.paths.clone(),
                detail: args.detail.clone(),
                applications: args.apps,
                application: args.app.clone(),
                labels: args.labels.clone(),
            };
            cli::run_aggregate(options, &config)?
        }

        Commands::ConfigSchema => {
            let schema = jarscope::config::generate_json_schema();
            match &cli.output_file {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            exit_codes::SUCCESS
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    jarscope::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml =
                    serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                exit_codes::SUCCESS
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join("jarscope").display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in &[".jarscope.yaml", ".jarscope.yml", "jarscope.yaml", "jarscope.yml"] {
                    eprintln!("  {name}");
                }
                eprintln!();
                match jarscope::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                exit_codes::SUCCESS
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".jarscope.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = jarscope::config::generate_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                exit_codes::SUCCESS
            }
        },
    };
    Ok(exit_code)
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };

    if exit_code != exit_codes::SUCCESS {
        std::process::exit(exit_code);
    }
}

//! bom-tools: CycloneDX and SPDX BOM conversion, merge and diff tool

use anyhow::{Context, Result};
use bom_tools::cli::{
    self, AddFilesArgs, AnalyzeArgs, ConvertArgs, DiffArgs, MergeArgs, RenameEntityArgs,
    ValidateArgs,
};
use bom_tools::config::{self, AppConfig, Validatable};
use bom_tools::pipeline::exit_codes;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io::{self, Write as _};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported BOM Formats:",
        "\n  CycloneDX: 1.0 - 1.5 (XML), 1.2 - 1.5 (JSON), 1.3 - 1.5 (Protobuf), CSV",
        "\n  SPDX:      2.1, 2.2 (tag-value), 2.2 (JSON)",
        "\n\nOutput-only Formats:",
        "\n  markdown"
    )
}

#[derive(Parser)]
#[command(name = "bom-tools")]
#[command(version, long_version = build_long_version())]
#[command(about = "CycloneDX and SPDX BOM conversion, merge and diff tool", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  OK
    1  OK, but a check failed (validate --fail-on-errors)
    2  I/O error, or an input that could not be read
    3  Parameter validation error
    4  Unsupported format or schema version
    5  Signature not found
    6  Signature failed verification

EXAMPLES:
    # Convert a JSON BOM to CycloneDX XML 1.2
    bom-tools convert --input-file bom.json --output-file bom.xml --output-version 1.2

    # Merge two BOMs under a new subject
    bom-tools merge --input-files a.json b.xml --output-file all.json \\
        --hierarchical --name platform --version 1.0.0

    # Which component versions changed between two releases?
    bom-tools diff old.json new.json --component-versions")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between different BOM formats and schema versions
    Convert(ConvertArgs),

    /// Merge two or more BOMs
    Merge(MergeArgs),

    /// Generate a BOM diff
    Diff(DiffArgs),

    /// Analyze a BOM
    Analyze(AnalyzeArgs),

    /// Validate a BOM against a CycloneDX schema version
    Validate(ValidateArgs),

    /// Rename an entity identified by a "bom-ref", including references to it
    RenameEntity(RenameEntityArgs),

    /// Add files to a BOM as file components
    AddFiles(AddFilesArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate a man page and print it to stdout
    Man,
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .bom-tools.yaml in the current directory
    Init,
}

fn init_logging(behavior: &config::BehaviorConfig) {
    let log_level = if behavior.verbose {
        "debug"
    } else if behavior.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// File config with the global flags applied on top.
fn effective_config(cli: &Cli) -> (AppConfig, Option<PathBuf>) {
    let (mut config, loaded_from) = config::load_or_default(cli.config.as_deref());
    let mut flags = AppConfig::default();
    flags.behavior.verbose = cli.verbose;
    flags.behavior.quiet = cli.quiet;
    config.merge(&flags);
    (config, loaded_from)
}

fn main() {
    let cli = Cli::parse();
    let (config, loaded_from) = effective_config(&cli);
    init_logging(&config.behavior);

    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }
    for problem in config.validate() {
        tracing::warn!("{problem}");
    }

    let code = match run(cli, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            cli::exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli, config: &AppConfig) -> Result<i32> {
    match cli.command {
        Commands::Convert(args) => cli::run_convert(&args, config),
        Commands::Merge(args) => cli::run_merge(&args, config),
        Commands::Diff(args) => cli::run_diff(&args, config),
        Commands::Analyze(args) => cli::run_analyze(&args, config),
        Commands::Validate(args) => cli::run_validate(&args, config),
        Commands::RenameEntity(args) => cli::run_rename_entity(&args, config),
        Commands::AddFiles(args) => cli::run_add_files(&args, config),

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "bom-tools", &mut io::stdout());
            Ok(exit_codes::OK)
        }

        Commands::ConfigSchema { output } => {
            let schema =
                config::generate_json_schema().context("failed to generate config schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::OK)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (file_config, loaded_from) = config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml =
                    serde_yaml::to_string(&file_config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::OK)
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join("bom-tools").display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in config::file::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::OK)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".bom-tools.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, config::generate_example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::OK)
            }
        },

        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut buf = Vec::new();
            man.render(&mut buf).context("failed to render man page")?;
            io::stdout().write_all(&buf)?;
            Ok(exit_codes::OK)
        }
    }
}

//! Reflexion analysis CLI.
//!
//! Provides the `reflexion` binary. `analyze` loads an implementation, an
//! architecture, and a mapping from JSON interchange files, runs the
//! analysis, and prints the report as JSON to stdout. Logs go to stderr.
//!
//! Reads `REFLEXION_ALLOW_PARENT_DEPS` from the environment (see
//! `ReflexionConfig::with_env_overrides`); `--no-parent-dependencies` wins
//! over both the environment and the config file.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use reflexion_analysis::{ChangeEvent, Reflexion, ReflexionConfig};

/// Reflexion analysis of software architectures.
#[derive(Parser)]
#[command(name = "reflexion", about = "Reflexion analysis of software architectures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compare an architecture against an implementation.
    Analyze {
        /// Implementation graph (JSON).
        #[arg(short, long)]
        implementation: PathBuf,

        /// Architecture graph (JSON).
        #[arg(short, long)]
        architecture: PathBuf,

        /// Mapping graph (JSON).
        #[arg(short, long)]
        mapping: PathBuf,

        /// Analysis configuration (JSON).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Treat dependencies onto architecture ancestors as divergent.
        #[arg(long)]
        no_parent_dependencies: bool,

        /// Write the annotated architecture graph here.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log every change event.
        #[arg(long)]
        events: bool,
    },
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            implementation,
            architecture,
            mapping,
            config,
            no_parent_dependencies,
            output,
            events,
        } => {
            let exit_code = run_analyze(
                &implementation,
                &architecture,
                &mapping,
                config,
                no_parent_dependencies,
                output,
                events,
            );
            process::exit(exit_code);
        }
    }
}

/// Execute the analyze subcommand.
///
/// Returns exit code: 0 = success, 1 = configuration or analysis error,
/// 3 = I/O error (reading inputs or writing the output graph).
fn run_analyze(
    implementation_path: &Path,
    architecture_path: &Path,
    mapping_path: &Path,
    config_path: Option<PathBuf>,
    no_parent_dependencies: bool,
    output: Option<PathBuf>,
    log_events: bool,
) -> i32 {
    let config = match load_config(config_path, no_parent_dependencies) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let implementation = match reflexion_storage::load_graph(implementation_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: failed to load implementation: {}", e);
            return 3;
        }
    };
    let architecture = match reflexion_storage::load_graph(architecture_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: failed to load architecture: {}", e);
            return 3;
        }
    };
    let mapping =
        match reflexion_storage::load_mapping_file(mapping_path, &implementation, &architecture) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("Error: failed to load mapping: {}", e);
                return 3;
            }
        };

    let mut engine = match Reflexion::new(implementation, architecture, mapping, config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    if log_events {
        engine.register(|event: &ChangeEvent| tracing::info!(%event, "change"));
    }

    let report = match engine.run().and_then(|()| engine.report()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Analysis error: {}", e);
            return 1;
        }
    };

    if let Some(path) = output {
        if let Err(e) = reflexion_storage::save_graph(&path, engine.architecture()) {
            eprintln!("Error: failed to write '{}': {}", path.display(), e);
            return 3;
        }
    }

    let json = serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize report: {}\"}}", e));
    println!("{}", json);
    0
}

/// Config file (or defaults), then environment, then command-line flags.
fn load_config(
    path: Option<PathBuf>,
    no_parent_dependencies: bool,
) -> Result<ReflexionConfig, reflexion_analysis::ReflexionError> {
    let config = match path {
        Some(path) => ReflexionConfig::from_file(path)?,
        None => ReflexionConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if no_parent_dependencies {
        config.allow_dependencies_to_parents = false;
    }
    Ok(config)
}

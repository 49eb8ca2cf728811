mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use xcintegrate_core::adapters::{FsWritePort, JsonInstallSource, JsonProjectStore};
use xcintegrate_core::pipeline::{
    ToolError, run_clean_sandbox, run_integrate, write_clean_artifacts, write_integrate_artifacts,
};
use xcintegrate_core::ports::ProjectStore;
use xcintegrate_core::settings::{CleanSettings, IntegrateSettings};
use xcintegrate_core::{IntegrationOptions, TracingSink};
use xcintegrate_domain::builtin_step_metas;
use xcintegrate_types::project::NativeTarget;
use xcintegrate_types::report::ToolInfo;

#[derive(Debug, Parser)]
#[command(
    name = "xcintegrate",
    version,
    about = "Idempotent integration of generated build phases into Xcode project graphs."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Integrate aggregate targets into the user project.
    Integrate(IntegrateArgs),
    /// Remove sandbox directories the install set no longer produces.
    CleanSandbox(CleanArgs),
    /// Print the build phase order of native targets in a project snapshot.
    ListPhases(ListPhasesArgs),
    /// List the built-in integration steps in execution order.
    ListSteps(ListStepsArgs),
}

#[derive(Debug, Parser)]
struct IntegrateArgs {
    /// Project snapshot (JSON).
    #[arg(long)]
    project: Utf8PathBuf,

    /// Install set describing the aggregate targets (JSON).
    #[arg(long)]
    install: Utf8PathBuf,

    /// Aggregate target label to integrate. Repeatable; default: all of them.
    #[arg(long = "target")]
    targets: Vec<String>,

    /// Print the project diff without saving it.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Leave input/output paths off the generated script phases.
    #[arg(long, default_value_t = false)]
    no_input_output_paths: bool,

    /// Output directory for report artifacts.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Directory holding xcintegrate.toml (default: the project's directory).
    #[arg(long)]
    config_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct CleanArgs {
    /// Install set describing the aggregate targets and units (JSON).
    #[arg(long)]
    install: Utf8PathBuf,

    /// Sandbox root (default: `Pods`, or `[sandbox] root` from xcintegrate.toml).
    #[arg(long)]
    sandbox_root: Option<Utf8PathBuf>,

    /// List stale directories without removing them.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Output directory for report artifacts.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Directory holding xcintegrate.toml (default: current directory).
    #[arg(long, default_value = ".")]
    config_dir: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct ListPhasesArgs {
    /// Project snapshot (JSON).
    #[arg(long)]
    project: Utf8PathBuf,

    /// Only show this native target.
    #[arg(long)]
    native_target: Option<String>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ListStepsArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{}", e);
        return ExitCode::from(e.exit_code());
    }
    ExitCode::from(0)
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Integrate(args) => cmd_integrate(args),
        Command::CleanSandbox(args) => cmd_clean_sandbox(args),
        Command::ListPhases(args) => cmd_list_phases(args),
        Command::ListSteps(args) => cmd_list_steps(args),
    }
}

fn cmd_integrate(args: IntegrateArgs) -> Result<(), ToolError> {
    let config_dir = args
        .config_dir
        .clone()
        .unwrap_or_else(|| parent_dir(&args.project));
    let file_config = load_config(&config_dir)?;
    let merged = ConfigMerger::new(file_config).merge_integrate_args(
        &args.targets,
        args.no_input_output_paths,
        args.out_dir,
    );
    debug!(
        "merged config: targets={:?}, input_output_paths={}, out_dir={:?}",
        merged.targets, merged.input_output_paths, merged.out_dir
    );

    let settings = IntegrateSettings {
        labels: merged.targets,
        dry_run: args.dry_run,
        options: IntegrationOptions {
            input_output_paths: merged.input_output_paths,
        },
        out_dir: merged.out_dir,
    };
    let store = JsonProjectStore::new(args.project);
    let install = JsonInstallSource::new(args.install);

    let outcome = run_integrate(&settings, &store, &install, &TracingSink, tool_info())?;

    if let Some(out_dir) = &settings.out_dir {
        write_integrate_artifacts(&outcome, out_dir, &FsWritePort)?;
        info!("wrote integration artifacts to {}", out_dir);
    }

    if settings.dry_run {
        print!("{}", outcome.diff);
    }
    let counts = &outcome.report.counts;
    if outcome.report.is_noop() {
        println!("{} is already integrated.", store.path);
    } else {
        println!(
            "{} target(s): {} phase(s) added, {} removed, {} moved; {} product reference(s) added, {} removed.",
            outcome.report.targets.len(),
            counts.phases_added,
            counts.phases_removed,
            counts.phases_moved,
            counts.product_references_added,
            counts.product_references_removed,
        );
    }
    Ok(())
}

fn cmd_clean_sandbox(args: CleanArgs) -> Result<(), ToolError> {
    let file_config = load_config(&args.config_dir)?;
    let merged = ConfigMerger::new(file_config).merge_clean_args(args.sandbox_root, args.out_dir);

    let settings = CleanSettings {
        sandbox_root: merged.sandbox_root,
        dry_run: args.dry_run,
        out_dir: merged.out_dir,
    };
    let install = JsonInstallSource::new(args.install);

    let outcome = run_clean_sandbox(&settings, &install, &TracingSink, tool_info())?;

    if let Some(out_dir) = &settings.out_dir {
        write_clean_artifacts(&outcome, out_dir, &FsWritePort)?;
        info!("wrote sandbox artifacts to {}", out_dir);
    }

    let verb = if settings.dry_run { "would remove" } else { "removed" };
    for path in &outcome.stale {
        println!("{verb} {path}");
    }
    if outcome.stale.is_empty() {
        println!("{} has no stale directories.", settings.sandbox_root);
    }
    Ok(())
}

fn cmd_list_phases(args: ListPhasesArgs) -> Result<(), ToolError> {
    let store = JsonProjectStore::new(args.project);
    let project = store.load_project().map_err(ToolError::from_load)?;

    let targets: Vec<&NativeTarget> = match &args.native_target {
        Some(name) => match project.native_target(name) {
            Some(target) => vec![target],
            None => {
                return Err(ToolError::InvalidInput(format!(
                    "unknown native target '{}' in {}",
                    name, store.path
                )));
            }
        },
        None => project.targets.iter().collect(),
    };

    match args.format {
        OutputFormat::Text => {
            for target in targets {
                println!("{}:", target.name);
                for (index, phase) in target.phase_names().iter().enumerate() {
                    println!("  {:>2}. {}", index + 1, phase);
                }
            }
        }
        OutputFormat::Json => {
            let listing: Vec<_> = targets
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "symbol_type": t.symbol_type,
                        "phases": t.phase_names(),
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&listing).context("serialize phases")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn cmd_list_steps(args: ListStepsArgs) -> Result<(), ToolError> {
    let steps = builtin_step_metas();
    match args.format {
        OutputFormat::Text => {
            println!("Integration steps:\n");
            println!("  {:<26} TITLE", "KEY");
            println!("  {:<26} -----", "---");
            for step in &steps {
                println!("  {:<26} {}", step.key, step.title);
            }
        }
        OutputFormat::Json => {
            let listing: Vec<_> = steps
                .iter()
                .map(|s| serde_json::json!({ "key": s.key, "title": s.title }))
                .collect();
            let json = serde_json::to_string_pretty(&listing).context("serialize steps")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn load_config(dir: &Utf8Path) -> Result<config::XcintegrateConfig, ToolError> {
    config::load_or_default(dir).map_err(|e| ToolError::InvalidInput(format!("{e:#}")))
}

fn parent_dir(path: &Utf8Path) -> Utf8PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    }
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "xcintegrate".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

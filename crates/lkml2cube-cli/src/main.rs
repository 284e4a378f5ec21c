use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lkml2cube_core::{
    Config, IntermediateModel, OutputFormat, OutputLayout, Report, ReportSummary, Severity,
    TranslateError,
};
use lkml2cube_lookml::{find_explores_including_view, LoadError, LookmlDocument, ModelLoader};
use lkml2cube_engine::{render, translate, write_files, TranslateOptions, TranslationOutput};

/// Config file picked up from the working directory
const DEFAULT_CONFIG: &str = "lkml2cube.toml";

/// lkml2cube - Translate LookML views and explores into Cube definitions
#[derive(Parser)]
#[command(name = "lkml2cube")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: lkml2cube.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate every view into a cube, merging in joins from explores
    Cubes {
        #[command(flatten)]
        run: RunArgs,

        /// Directory searched for explores that reference the translated views
        #[arg(long)]
        lkml_root: Option<PathBuf>,

        /// Ignore explores entirely
        #[arg(long)]
        views_only: bool,
    },

    /// Translate only the views reached through explores
    Views {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Options shared by both translation commands
#[derive(Args)]
struct RunArgs {
    /// LookML document (JSON or YAML)
    file: PathBuf,

    /// Print the parsed document and stop
    #[arg(long)]
    parseonly: bool,

    /// Directory the cube files are written to
    #[arg(short, long)]
    outputdir: Option<PathBuf>,

    /// Print the cubes to stdout instead of writing files
    #[arg(long)]
    printonly: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Output layout
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Drop explores that fail to resolve instead of aborting
    #[arg(long)]
    skip_invalid_explores: bool,

    /// Output file for report.json
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Yaml => OutputFormat::Yaml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    PerCube,
    Single,
}

impl From<LayoutArg> for OutputLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::PerCube => OutputLayout::PerCube,
            LayoutArg::Single => OutputLayout::Single,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Cubes { run, lkml_root, views_only } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            let options = TranslateOptions {
                views_only,
                ..TranslateOptions::default()
            };
            translate_command(&config, &run, lkml_root.as_deref(), options, cli.verbose)
        }
        Commands::Views { run } => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            translate_command(&config, &run, None, TranslateOptions::explores_only(), cli.verbose)
        }
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
            init_command(&path, force, cli.verbose)
        }
    }
}

/// Load config if specified, else from the working directory, else defaults
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(config_path) = path {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    Ok(config)
}

/// Init command - write the default configuration
fn init_command(path: &Path, force: bool, verbose: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        ));
    }

    Config::default().save_to_file(path)?;

    if verbose {
        eprintln!("{} {}", "Config written to:".green(), path.display());
    }

    Ok(())
}

/// Load, translate and emit one document
fn translate_command(
    config: &Config,
    args: &RunArgs,
    lkml_root: Option<&Path>,
    mut options: TranslateOptions,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading document from:".cyan(), args.file.display());
    }

    let mut document = LookmlDocument::from_file(&args.file)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", args.file.display(), e))?;

    if args.parseonly {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    if let Some(root) = lkml_root {
        if !options.views_only {
            merge_scanned_explores(&mut document, root, verbose);
        }
    }

    let model = match ModelLoader::load(&document) {
        Ok(model) => model,
        Err(LoadError::Model(e)) => {
            return finish_run(args, error_report(ReportSummary::default(), &e), verbose);
        }
        Err(e) => return Err(e.into()),
    };

    if verbose {
        eprintln!(
            "{} {} views, {} explores",
            "Loaded".cyan(),
            model.view_count(),
            model.explore_count()
        );
    }

    options.skip_invalid_explores = args.skip_invalid_explores || config.translate.skip_invalid_explores;
    options.allowlist = config.allowlist.clone();

    let output = match translate(&model, &options) {
        Ok(output) => output,
        Err(e) => {
            let summary = ReportSummary {
                views: model.view_count(),
                explores: model.explore_count(),
                ..Default::default()
            };
            return finish_run(args, error_report(summary, &e), verbose);
        }
    };

    let mut output_config = config.output.clone();
    if let Some(dir) = &args.outputdir {
        output_config.dir = dir.clone();
    }
    if let Some(format) = args.format {
        output_config.format = format.into();
    }
    if let Some(layout) = args.layout {
        output_config.layout = layout.into();
    }

    if args.printonly {
        print!("{}", render(&output.cubes, output_config.format)?);
    } else {
        let written = write_files(&output.cubes, &output_config)?;
        if verbose {
            for path in &written {
                eprintln!("  {} {}", "Wrote".green(), path.display());
            }
        }
    }

    finish_run(args, build_report(&model, output), verbose)
}

/// Save and print the report, exiting with an error code if it holds errors
fn finish_run(args: &RunArgs, report: Report, verbose: bool) -> Result<()> {
    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    if verbose || report.has_errors() {
        print_report_summary(&report);
    }

    // Exit with error code if there are errors
    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Pull in explores declared elsewhere in the project that touch our views
fn merge_scanned_explores(document: &mut LookmlDocument, root: &Path, verbose: bool) {
    if verbose {
        eprintln!("{} {}", "Scanning for explores in:".cyan(), root.display());
    }

    let view_names: Vec<String> = document.views.iter().map(|v| v.name.clone()).collect();
    for view in view_names {
        let found = find_explores_including_view(root, &view);
        let added = document.merge_explores(found);
        if added > 0 {
            tracing::info!("Merged {} explores referencing view '{}'", added, view);
        }
    }
}

fn build_report(model: &IntermediateModel, output: TranslationOutput) -> Report {
    let summary = output.summary(model);
    Report::from_diagnostics(summary, output.diagnostics)
}

/// Report for a run aborted by a translation error; no cubes were written
fn error_report(summary: ReportSummary, error: &TranslateError) -> Report {
    let mut report = Report::from_diagnostics(summary, Vec::new());
    report.add_diagnostic(error.to_diagnostic(Severity::Error));
    report
}

/// Print report summary to stderr
fn print_report_summary(report: &Report) {
    eprintln!("\n{}", "=".repeat(60).bright_blue());
    eprintln!("{}", "Translation Report".bold().bright_blue());
    eprintln!("{}", "=".repeat(60).bright_blue());
    eprintln!();

    eprintln!("Version: {}", report.version);
    eprintln!("Timestamp: {}", report.timestamp);
    eprintln!();

    eprintln!("{}", "Summary:".bold());
    eprintln!("  Views:    {}", report.summary.views);
    eprintln!("  Explores: {}", report.summary.explores);
    eprintln!("  Cubes:    {}", report.summary.cubes);
    eprintln!("  Joins:    {}", report.summary.joins);

    if report.summary.skipped_explores > 0 {
        eprintln!(
            "  Skipped:  {}",
            report.summary.skipped_explores.to_string().yellow()
        );
    }

    if report.summary.errors > 0 {
        eprintln!("  Errors:   {}", report.summary.errors.to_string().red().bold());
    }

    if report.summary.warnings > 0 {
        eprintln!("  Warnings: {}", report.summary.warnings.to_string().yellow());
    } else {
        eprintln!("  Warnings: {}", report.summary.warnings.to_string().green());
    }
    eprintln!();

    if report.diagnostics.is_empty() {
        eprintln!("{}", "✓ No issues found!".green().bold());
    } else {
        eprintln!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            eprintln!("  [{}] {}: {}", severity_str, diag.code, diag.message);
        }
    }

    eprintln!();
    eprintln!("{}", "=".repeat(60).bright_blue());
}

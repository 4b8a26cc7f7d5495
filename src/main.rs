/*!
 * Dupsweep CLI - Command Line Interface
 *
 * Walks a duplicate manifest group by group, asking which member to keep.
 */

use clap::{Parser, Subcommand, ValueEnum};
use dupsweep::{
    cli_style::print_error,
    config::{LogLevel, MalformedPolicy, OverflowPolicy, ResolveConfig, ResolveMode},
    core::dry_run::DryRunSimulator,
    error::{DupError, Result, EXIT_SUCCESS},
    logging,
    output::OutputWriter,
    resolve::{resolve_manifest, LocalFs, TerminalOperator},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dupsweep")]
#[command(
    version,
    about = "Interactively resolve the duplicate groups listed in a manifest",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Duplicate manifest to resolve; rewritten on exit with the unresolved groups
    #[arg(value_name = "MANIFEST")]
    manifest: Option<PathBuf>,

    /// Re-create every removed duplicate as a hard link to the preserved member
    #[arg(short = 'l', long = "link")]
    link: bool,

    /// Path to a TOML config file; flags given here override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum members per duplicate group
    #[arg(long, value_name = "N")]
    max_group_size: Option<usize>,

    /// What to do with a group larger than --max-group-size
    #[arg(long, value_enum)]
    on_overflow: Option<OverflowArg>,

    /// What to do with a manifest line that cannot be parsed
    #[arg(long, value_enum)]
    on_malformed: Option<MalformedArg>,

    /// Do not flush filesystem caches after each group's removals
    #[arg(long)]
    no_sync: bool,

    /// Show what would be removed and linked without touching any file
    #[arg(long)]
    dry_run: bool,

    /// Print the session summary as a JSON line
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, value_enum)]
    log_level: Option<LogLevelArg>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OverflowArg {
    Truncate,
    Reject,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Truncate => OverflowPolicy::Truncate,
            OverflowArg::Reject => OverflowPolicy::Reject,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MalformedArg {
    Stop,
    Skip,
    Reject,
}

impl From<MalformedArg> for MalformedPolicy {
    fn from(arg: MalformedArg) -> Self {
        match arg {
            MalformedArg::Stop => MalformedPolicy::Stop,
            MalformedArg::Skip => MalformedPolicy::Skip,
            MalformedArg::Reject => MalformedPolicy::Reject,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    let code = match run(cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            if output.is_json() {
                output.error(&e.category().to_string(), &e.to_string());
            } else {
                print_error(&e.to_string(), hint(&e));
            }
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        use clap::CommandFactory;
        use clap_complete::generate;
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "dupsweep", &mut std::io::stdout());
        return Ok(());
    }

    let manifest = cli
        .manifest
        .clone()
        .ok_or_else(|| DupError::Config("Manifest path required".to_string()))?;

    let config = build_config(&cli)?;
    config.validate()?;

    if let Err(e) = logging::init_logging(&config) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let output = OutputWriter::new(config.json_output);
    let operator = TerminalOperator::stdio();

    let report = if config.dry_run {
        let mut simulator = DryRunSimulator::new();
        let report = resolve_manifest(&manifest, &config, operator, &mut simulator)?;
        output.dry_run_summary(&simulator.summary());
        report
    } else {
        resolve_manifest(&manifest, &config, operator, LocalFs)?
    };

    output.session_summary(&report);
    Ok(())
}

/// Layer command-line flags over the config file, if one was given
fn build_config(cli: &Cli) -> Result<ResolveConfig> {
    let mut config = match cli.config {
        Some(ref path) => ResolveConfig::from_file(path)?,
        None => ResolveConfig::default(),
    };

    if cli.link {
        config.mode = ResolveMode::Link;
    }
    if let Some(size) = cli.max_group_size {
        config.max_group_size = size;
    }
    if let Some(policy) = cli.on_overflow {
        config.on_overflow = policy.into();
    }
    if let Some(policy) = cli.on_malformed {
        config.on_malformed = policy.into();
    }
    if cli.no_sync {
        config.sync_after_remove = false;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log.is_some() {
        config.log_file = cli.log.clone();
    }
    config.dry_run |= cli.dry_run;
    config.verbose |= cli.verbose;
    config.json_output |= cli.json;

    Ok(config)
}

fn hint(err: &DupError) -> Option<&'static str> {
    match err {
        DupError::ManifestNotFound(_) => Some("Check the manifest path"),
        DupError::MalformedRecord { .. } => {
            Some("Fix the line, or use --on-malformed stop to resolve the groups before it")
        }
        DupError::Config(_) => Some("See dupsweep --help"),
        _ => None,
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tailwatch::config::{self, Config, ConfigError};
use tailwatch::signal::setup_shutdown_handlers;
use tailwatch::{SessionError, SessionEvent, StopReason, TailSession};
use tracing_subscriber::EnvFilter;

// Constants
const SHUTDOWN_POLL_DURATION_MS: u64 = 100;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Parser, Debug)]
#[command(name = "tailwatch")]
#[command(about = "Keep the last lines of a file on screen until stopped", long_about = None)]
struct Args {
    /// File to tail
    #[arg(value_name = "FILE", required_unless_present = "show_config")]
    file: Option<String>,

    /// Number of trailing lines to show
    #[arg(short = 'n', long = "lines")]
    lines: Option<usize>,

    /// Milliseconds to wait between re-reads
    #[arg(long = "interval", value_name = "MS")]
    interval_ms: Option<u64>,

    /// Consecutive failed reads before giving up
    #[arg(long = "max-failures")]
    max_failures: Option<u32>,

    /// Disable filesystem notifications (poll only)
    #[arg(long = "no-watch")]
    no_watch: bool,

    /// Use this config file instead of discovering one
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long = "show-config")]
    show_config: bool,

    /// Print one JSON object per event instead of raw text
    #[arg(long)]
    json: bool,

    /// Clear the terminal before printing each new snapshot
    #[arg(long)]
    clear: bool,

    /// Verbose logging on stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let (mut config, config_files) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprint!("{}", err.format_cargo_style());
            return Ok(ExitCode::FAILURE);
        }
    };
    apply_overrides(&mut config, &args)?;

    if args.show_config {
        print_config(&config, &config_files);
        return Ok(ExitCode::SUCCESS);
    }

    let file = args.file.clone().unwrap_or_default();
    let (session, events) = TailSession::new(config.worker_options());

    if let Err(err) = session.start(&file) {
        show_notice(&err);
        return Ok(ExitCode::FAILURE);
    }
    if !session.is_running() {
        eprintln!("Usage: tailwatch <FILE>");
        return Ok(ExitCode::FAILURE);
    }

    let shutdown_flag = setup_shutdown_handlers().context("Failed to set signal handlers")?;
    let mut stop_requested = false;

    loop {
        if !stop_requested && shutdown_flag.load(Ordering::SeqCst) {
            stop_requested = true;
            if let Err(err) = session.stop() {
                tracing::debug!(error = %err, "stop after shutdown signal");
            }
        }

        match events.recv_timeout(Duration::from_millis(SHUTDOWN_POLL_DURATION_MS)) {
            Ok(event) => {
                present(&event, &args)?;
                if let SessionEvent::Stopped { reason } = event {
                    return Ok(match reason {
                        StopReason::Requested => ExitCode::SUCCESS,
                        StopReason::ReadFailures | StopReason::Panicked => ExitCode::FAILURE,
                    });
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(ExitCode::FAILURE),
        }
    }
}

/// Filter used when `RUST_LOG` is unset; read-error warnings stay visible
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Explicit `--config` wins; otherwise merge the discovered global and
/// project files.
fn load_config(args: &Args) -> Result<(Config, Vec<PathBuf>), ConfigError> {
    if let Some(path) = &args.config {
        let path = config::expand_path(path);
        let loaded = config::load_single_file(&path)?;
        return Ok((loaded, vec![path]));
    }

    let discovery = config::discover();
    for path in &discovery.searched {
        tracing::debug!(path = %path.display(), "searched for config");
    }

    let loaded = config::load(&discovery)?;
    Ok((loaded, discovery.files().cloned().collect()))
}

fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(lines) = args.lines {
        anyhow::ensure!(lines >= 1, "--lines must be at least 1");
        config.max_lines = lines;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.poll_interval_ms = interval_ms;
    }
    if let Some(max_failures) = args.max_failures {
        anyhow::ensure!(max_failures >= 1, "--max-failures must be at least 1");
        config.max_read_failures = max_failures;
    }
    if args.no_watch {
        config.watch = false;
    }
    Ok(())
}

fn print_config(config: &Config, files: &[PathBuf]) {
    if files.is_empty() {
        println!("# no config files found, using defaults");
    }
    for file in files {
        println!("# from {}", file.display());
    }
    println!("max_lines: {}", config.max_lines);
    println!("poll_interval_ms: {}", config.poll_interval_ms);
    println!("max_read_failures: {}", config.max_read_failures);
    println!("watch: {}", config.watch);
}

/// Blocking notice for a rejected start
fn show_notice(err: &SessionError) {
    tracing::debug!(error = %err, "start rejected");
    eprintln!("{}: {}", err.caption().red().bold(), err.user_message());
}

fn present(event: &SessionEvent, args: &Args) -> Result<()> {
    let mut stdout = io::stdout().lock();

    if args.json {
        let line = serde_json::to_string(event).context("Failed to encode event")?;
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        return Ok(());
    }

    match event {
        SessionEvent::Started { path } => {
            eprintln!("{} {}", "Tailing".green().bold(), path.display());
        }
        SessionEvent::OutputChanged { text } => {
            if args.clear {
                write!(stdout, "{}", CLEAR_SCREEN)?;
            }
            write!(stdout, "{}", text)?;
            stdout.flush()?;
        }
        SessionEvent::ReadError {
            message,
            consecutive,
        } => {
            eprintln!(
                "{} {} (attempt {})",
                "warning:".yellow().bold(),
                message,
                consecutive
            );
        }
        SessionEvent::Stopped { reason } => {
            let label = match reason {
                StopReason::Requested => "Stopped".normal(),
                StopReason::ReadFailures => "Stopped: file could not be read".red(),
                StopReason::Panicked => "Stopped: worker failed".red(),
            };
            eprintln!("{}", label);
        }
    }

    Ok(())
}

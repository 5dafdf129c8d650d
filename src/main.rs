use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;
use iterloop::context::{FixedResolver, WalkUpResolver};
use iterloop::controller::LoopController;
use iterloop::storage::FileStore;
use iterloop::{IterloopError, Report};

/// Exit code for `check` when the loop could not be checked
const CHECK_ERROR_EXIT: i32 = 2;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("iterloop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("iterloop.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn open_controller(cli: &Cli, config: &Config) -> iterloop::Result<LoopController<FileStore>> {
    let store = match &cli.dir {
        Some(dir) => FileStore::open(&FixedResolver::new(dir))?,
        None => FileStore::open(&WalkUpResolver::from_cwd(&config.harness.dir_name)?)?,
    };

    if cli.is_verbose() {
        eprintln!("{} {}", "Context:".yellow(), store.dir().display());
    }
    info!("Using context directory {}", store.dir().display());

    Ok(LoopController::new(store, config.controller()))
}

fn report_error(err: &IterloopError) {
    warn!("Command failed: {}", err);
    eprintln!("{} {}", "Error:".red(), err);
}

fn print_report(report: &Report) {
    print!("{}", report);
}

/// Read the agent's last output from stdin unless stdin is a terminal.
fn read_piped_stdin() -> iterloop::Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buf = String::new();
    stdin.lock().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

/// Exit code for a failure that happens before the command produces a report
fn error_exit_code(command: &Commands) -> i32 {
    match command {
        Commands::Check { .. } => CHECK_ERROR_EXIT,
        _ => 1,
    }
}

fn run_application(cli: &Cli, config: &Config) -> Result<i32> {
    info!("Running command: {:?}", cli.command);

    let controller = match open_controller(cli, config) {
        Ok(controller) => controller,
        Err(e) => {
            report_error(&e);
            return Ok(error_exit_code(&cli.command));
        }
    };

    let code = match &cli.command {
        Commands::Start { prompt, promise, max } => handle_start(&controller, prompt, promise.as_deref(), *max),
        Commands::Check { output } => handle_check(&controller, output.as_deref()),
        Commands::Cancel => handle_cancel(&controller),
        Commands::Status => handle_status(&controller),
    };
    Ok(code)
}

fn handle_start(controller: &LoopController<FileStore>, prompt: &str, promise: Option<&str>, max: u32) -> i32 {
    match controller.start(prompt, promise, max) {
        Ok(report) => {
            print_report(&report);
            0
        }
        Err(e) => {
            report_error(&e);
            1
        }
    }
}

fn handle_check(controller: &LoopController<FileStore>, output: Option<&str>) -> i32 {
    let piped = match output {
        Some(_) => None,
        None => match read_piped_stdin() {
            Ok(text) => text,
            Err(e) => {
                report_error(&e);
                return CHECK_ERROR_EXIT;
            }
        },
    };
    let last_output = output.or(piped.as_deref());

    match controller.check(last_output) {
        Ok(report) => {
            print_report(&report);
            report.exit_code()
        }
        Err(e) => {
            report_error(&e);
            CHECK_ERROR_EXIT
        }
    }
}

fn handle_cancel(controller: &LoopController<FileStore>) -> i32 {
    match controller.cancel() {
        Ok(report) => {
            print_report(&report);
            0
        }
        Err(IterloopError::NoActiveLoop) => {
            println!("No active loop to cancel.");
            0
        }
        Err(e) => {
            report_error(&e);
            1
        }
    }
}

fn handle_status(controller: &LoopController<FileStore>) -> i32 {
    match controller.status() {
        Ok(report) => {
            print_report(&report);
            0
        }
        Err(e) => {
            report_error(&e);
            1
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(cli, &config).context("Application failed")
}

fn main() {
    // Parse CLI arguments; usage errors exit through clap
    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:?}", "Error:".red(), e);
            error_exit_code(&cli.command)
        }
    };

    std::process::exit(code);
}

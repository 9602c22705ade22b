use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mem_persist::output;
use mem_persist::{ApiError, Config, SaveOptions, SessionError, run_diagnostics, save};

#[derive(Parser)]
#[command(
    name = "mem-persist",
    version,
    about = "Save Claude Code conversation threads to Nowledge Mem"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save current session to Nowledge Mem
    #[command(name = "save")]
    Save {
        /// Custom thread title (auto-generated if not provided)
        #[arg(short = 't', long)]
        title: Option<String>,
        /// Project directory path (default: PROJECT_PATH or current directory)
        #[arg(short = 'p', long, value_parser = existing_dir)]
        project_path: Option<PathBuf>,
        /// Enable debug mode (show full error details)
        #[arg(long)]
        debug: bool,
    },

    /// Run diagnostic checks
    #[command(name = "diagnose")]
    Diagnose {
        /// Project directory path (default: PROJECT_PATH or current directory)
        #[arg(short = 'p', long, value_parser = existing_dir)]
        project_path: Option<PathBuf>,
    },
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("directory '{value}' does not exist"))
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "mem_persist=debug"
    } else {
        "mem_persist=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Save {
            title,
            project_path,
            debug,
        } => {
            init_tracing(debug);
            run_save(title, project_path, debug)
        }
        Commands::Diagnose { project_path } => {
            init_tracing(false);
            run_diagnose(project_path)
        }
    };
    std::process::exit(code);
}

fn run_save(title: Option<String>, project_path: Option<PathBuf>, debug: bool) -> i32 {
    let result = Config::load(project_path, None)
        .and_then(|config| save(&config, &SaveOptions { title }));
    match result {
        Ok(outcome) => {
            debug!(
                session = %outcome.session_file.display(),
                messages = outcome.messages_sent,
                thread_id = %outcome.thread.thread_id,
                "save finished"
            );
            0
        }
        Err(err) => {
            report_error(&err, debug);
            1
        }
    }
}

fn run_diagnose(project_path: Option<PathBuf>) -> i32 {
    match Config::load(project_path, None) {
        Ok(config) => {
            if run_diagnostics(&config) {
                0
            } else {
                1
            }
        }
        Err(err) => {
            report_error(&err, false);
            1
        }
    }
}

/// Print a one-line message for the failure category; `debug` adds the full chain.
fn report_error(err: &anyhow::Error, debug: bool) {
    if let Some(session_err) = err.downcast_ref::<SessionError>() {
        eprintln!("\n{}\n", output::error_line("Error", &session_err.to_string()));
    } else if let Some(api_err) = err.downcast_ref::<ApiError>() {
        eprintln!("\n{}\n", output::error_line("API Error", &api_err.to_string()));
    } else {
        eprintln!(
            "\n{}\n",
            output::error_line("Unexpected error", &format!("{err:#}"))
        );
        if debug {
            eprintln!("{err:?}");
        }
    }
}

mod agent;
mod cli;
mod config;
mod diag;
mod engine;
mod error;
mod paths;
mod resource;
mod runner;
mod schema;
mod ui;
mod workspace;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use declarative::{ExecuteOptions, NoRestart, Status};
use serde::Serialize;
use std::io;
use std::process::ExitCode;

use config::ProviderConfig;
use engine::Provider;
use schema::StatusReport;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let status = match run(cli) {
        Ok(status) => status,
        Err(e) => {
            ui::error(&format!("{:#}", e));
            print_json(&StatusReport {
                status: Status::Failure,
            });
            Status::Failure
        }
    };

    if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(cli: Cli) -> Result<Status> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "agentplug", &mut io::stdout());
        return Ok(Status::Success);
    }

    let config = ProviderConfig::load(cli.config.as_deref())?;

    let status = match cli.command {
        Command::Get(args) => {
            let report = Provider::new(config).get(&args.name);
            print_json(&report);
            report.status
        }
        Command::Test(args) => {
            let specs = args.declarations()?;
            report_status(Provider::new(config).test(&specs))
        }
        Command::Set(args) => {
            let specs = args.verb.declarations()?;
            let provider = if args.no_restart {
                let diag = diag::for_config(&config);
                Provider::with_collaborators(config, diag, Box::new(NoRestart))
            } else {
                Provider::new(config)
            };
            if args.dry_run {
                ui::warn("Dry run: no files will be changed and the agent will not be restarted");
            }
            let opts = ExecuteOptions {
                dry_run: args.dry_run,
                verbose: cli.verbose > 0,
            };
            report_status(provider.set(&specs, opts))
        }
        Command::Completions { .. } => Status::Success,
    };
    Ok(status)
}

fn report_status(status: Status) -> Status {
    print_json(&StatusReport { status });
    status
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize report: {}", e),
    }
}

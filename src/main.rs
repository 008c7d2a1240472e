// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use epoch_audit::Config;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Seed {
            packages,
            cache,
            url,
            jobs,
            quiet,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(cache) = cache {
                config.cache_path = cache;
            }
            if let Some(url) = url {
                config.snapshot_url = url;
            }
            if let Some(jobs) = jobs {
                config.jobs = jobs;
            }
            commands::cmd_seed(&config, packages, !quiet)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Scan {
            files,
            cache,
            format,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(cache) = cache {
                config.cache_path = cache;
            }
            let found = commands::cmd_scan(&config, &files, format)?;
            Ok(if found { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        Commands::Show { package, cache } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(cache) = cache {
                config.cache_path = cache;
            }
            commands::cmd_show(&config, &package)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Minimize { versions } => {
            commands::cmd_minimize(&versions)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fix { version, summary } => {
            commands::cmd_fix(&version, &summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            commands::cmd_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

// src/commands.rs
//! Command handlers for the epoch-audit CLI

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::Shell;
use epoch_audit::control::{parse_control, read_control_file};
use epoch_audit::{
    BinaryHistory, Config, Paragraph, ReportFormat, Scanner, SeedOptions, SnapshotClient,
    SqliteStore, SummaryLookup, fix_version, minimize, render,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::Cli;

/// Fetch histories and rebuild the cache
pub fn cmd_seed(config: &Config, packages: Vec<String>, show_progress: bool) -> Result<()> {
    let client = SnapshotClient::new(&config.snapshot_url, config.http_timeout())?;
    let history = BinaryHistory::new(client);
    let mut store = SqliteStore::open(&config.cache_path)
        .with_context(|| format!("opening cache {}", config.cache_path.display()))?;

    let options = SeedOptions {
        packages,
        jobs: config.jobs,
        show_progress,
    };
    let stats = epoch_audit::seed(&history, &mut store, &options)?;

    println!(
        "Seeded {} packages into {}",
        stats.packages,
        config.cache_path.display()
    );
    println!(
        "  {} versions reduced to {} summary entries",
        stats.versions, stats.summary_entries
    );
    if !stats.missing.is_empty() {
        println!("  Not found: {}", stats.missing.join(", "));
    }
    Ok(())
}

/// Scan control files; returns true when anything was found
pub fn cmd_scan(config: &Config, files: &[PathBuf], format: ReportFormat) -> Result<bool> {
    let store = open_existing_cache(&config.cache_path)?;

    let mut paragraphs: Vec<Paragraph> = Vec::new();
    for file in files {
        paragraphs.extend(read_paragraphs(file)?);
    }
    info!(
        "Scanning {} paragraphs from {} files",
        paragraphs.len(),
        files.len()
    );

    let findings = Scanner::new(&store).scan_parallel(&paragraphs)?;
    print!("{}", render(&findings, format)?);

    Ok(!findings.is_empty())
}

/// Print a package's stored summary
pub fn cmd_show(config: &Config, package: &str) -> Result<()> {
    let store = open_existing_cache(&config.cache_path)?;

    match store.summary(package)? {
        Some(summary) => {
            println!("{package}:");
            for version in &summary {
                println!("  {version}");
            }
            if let Some(updated_at) = store.updated_at(package)? {
                println!("  (seeded {updated_at})");
            }
        }
        None => println!("{package}: not tracked"),
    }
    Ok(())
}

/// Minimize versions given on the command line
pub fn cmd_minimize(versions: &[String]) -> Result<()> {
    for version in minimize(versions)? {
        println!("{version}");
    }
    Ok(())
}

/// Reconcile one constraint version against a summary
pub fn cmd_fix(version: &str, summary: &[String]) -> Result<()> {
    let fixed = fix_version(version, summary)?;
    if fixed == version {
        println!("{version}: no change");
    } else {
        println!("{version} -> {fixed}");
    }
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "epoch-audit", &mut io::stdout());
}

fn open_existing_cache(path: &Path) -> Result<SqliteStore> {
    if !path.exists() {
        anyhow::bail!(
            "Summary cache {} does not exist; run 'epoch-audit seed' first",
            path.display()
        );
    }
    SqliteStore::open(path).with_context(|| format!("opening cache {}", path.display()))
}

fn read_paragraphs(path: &Path) -> Result<Vec<Paragraph>> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading standard input")?;
        return Ok(parse_control(&text)?);
    }
    read_control_file(path).with_context(|| format!("scanning {}", path.display()))
}

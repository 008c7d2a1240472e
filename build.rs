// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: summary cache path
fn cache_arg() -> Arg {
    Arg::new("cache")
        .long("cache")
        .value_name("PATH")
        .help("Path to the summary cache")
}

fn build_cli() -> Command {
    Command::new("epoch-audit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Epoch Audit Contributors")
        .about("Find dependency constraints invalidated by an epoch bump")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .help("Configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("seed")
                .about("Fetch version histories and rebuild the summary cache")
                .arg(Arg::new("packages").num_args(0..).help("Binary packages to seed"))
                .arg(cache_arg())
                .arg(Arg::new("url").long("url").help("Snapshot archive base URL"))
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help("Concurrent history fetches"),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .action(ArgAction::SetTrue)
                        .help("Hide the progress bar"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Scan control files for constraints that predate an epoch bump")
                .arg(
                    Arg::new("files")
                        .required(true)
                        .num_args(1..)
                        .help("Control files to scan"),
                )
                .arg(cache_arg())
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .default_value("text")
                        .value_parser(["text", "json"])
                        .help("Output format"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show the stored summary for a package")
                .arg(Arg::new("package").required(true).help("Package name"))
                .arg(cache_arg()),
        )
        .subcommand(
            Command::new("minimize")
                .about("Minimize a version history given on the command line")
                .arg(
                    Arg::new("versions")
                        .required(true)
                        .num_args(1..)
                        .help("Observed versions"),
                ),
        )
        .subcommand(
            Command::new("fix")
                .about("Check a single constraint version against a summary")
                .arg(Arg::new("version").required(true).help("Constraint version"))
                .arg(Arg::new("summary").num_args(0..).help("Minimized summary")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    if let Err(e) = fs::write(man_dir.join("epoch-audit.1"), buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}

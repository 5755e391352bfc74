mod config;
mod dry;
mod toolchain;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use rodzo_core::{discover_spec_files, Compilation, CompileError};
use rodzo_eval::Filters;
use rodzo_table::NodeTable;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Settings;

/// Compile `*_spec.c` files into one self-contained C test program.
#[derive(Parser)]
#[command(name = "rodzo", version, about = "BDD spec compiler for C", disable_version_flag = true)]
struct Cli {
    /// Generated C file [default: spec.c]
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write <stem>.tree.json and <stem>.pseudo.txt next to the output
    #[arg(short = 'd', long)]
    debug: bool,

    /// Compile the generated program and run it
    #[arg(short = 'r', long)]
    run: bool,

    /// Run the compiled program under valgrind (implies -r)
    #[arg(short = 'V', long)]
    valgrind: bool,

    /// Show what the E/L/I/F filters select, without compiling
    #[arg(short = 'n', long = "dry-run")]
    dry_run: bool,

    /// Print the dry run as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Dry-run a node table written by -d instead of compiling sources
    #[arg(long, value_name = "FILE", requires = "dry_run")]
    table: Option<PathBuf>,

    /// Config file [default: rodzo.toml when present]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,

    /// Print version
    #[arg(long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Spec files or directories to scan [default: .]
    paths: Vec<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let file = config::load(cli.config.as_deref()).unwrap_or_else(|e| fail(&e.to_string()));
    let settings = Settings::resolve(cli.output.clone(), file, |k| std::env::var(k).ok());

    if cli.dry_run {
        cmd_dry_run(&cli, &settings);
        return;
    }

    let compilation = compile_sources(&cli, &settings);
    write_output(&cli, &settings, &compilation);

    if cli.run || cli.valgrind {
        process::exit(build_and_run(&cli, &settings));
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RODZO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn compile_sources(cli: &Cli, settings: &Settings) -> Compilation {
    let roots = if cli.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.paths.clone()
    };

    let files = discover_spec_files(&roots, &settings.suffix);
    if files.is_empty() {
        fail(&CompileError::NoInput(roots).to_string());
    }
    for file in &files {
        progress(cli, &format!(". processing {}", file.display()));
    }

    let compilation = rodzo_core::compile(&files).unwrap_or_else(|e| fail(&e.to_string()));
    for (path, reason) in &compilation.skipped {
        report_error(&format!("warning: {} skipped: {}", path.display(), reason));
    }
    compilation
}

fn write_output(cli: &Cli, settings: &Settings, compilation: &Compilation) {
    let (tree, table) = (&compilation.tree, &compilation.table);

    if let Err(e) = rodzo_codegen::write_program(&settings.output, tree, table) {
        fail(&e.to_string());
    }
    progress(cli, &format!(". wrote {}", settings.output.display()));

    if cli.debug {
        match rodzo_codegen::write_dumps(&settings.output, tree, table) {
            Ok((json, pseudo)) => {
                progress(cli, &format!(". wrote {}", json.display()));
                progress(cli, &format!(". wrote {}", pseudo.display()));
            }
            Err(e) => fail(&e.to_string()),
        }
    }
}

fn build_and_run(cli: &Cli, settings: &Settings) -> i32 {
    progress(cli, &format!(". compiling {}", settings.output.display()));
    if let Err(e) = toolchain::compile(settings) {
        report_error(&e.to_string());
        progress(cli, ". failure.");
        return 1;
    }

    progress(cli, ". running specs");
    match toolchain::run(settings, cli.valgrind) {
        Ok(code) => {
            info!(code, "specs finished");
            code
        }
        Err(e) => {
            report_error(&e.to_string());
            1
        }
    }
}

fn cmd_dry_run(cli: &Cli, settings: &Settings) {
    let table = match &cli.table {
        Some(path) => load_table(path),
        None => compile_sources(cli, settings).table,
    };

    let filters = Filters::from_env();
    let program = settings.executable().display().to_string();
    let stdout = std::io::stdout();
    match dry::dry_run(&table, &filters, &program, cli.json, stdout.lock()) {
        Ok(session) if session.failed() => process::exit(1),
        Ok(_) => {}
        Err(e) => fail(&format!("cannot write report: {}", e)),
    }
}

/// Accepts the `-d` dump (`{"files": .., "table": ..}`) or a bare table.
fn load_table(path: &Path) -> NodeTable {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("could not read '{}': {}", path.display(), e)));

    let json = match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(serde_json::Value::Object(mut map)) if map.contains_key("table") => {
            map.remove("table").map(|t| t.to_string()).unwrap_or_default()
        }
        Ok(_) => content,
        Err(e) => fail(&format!("could not parse '{}': {}", path.display(), e)),
    };
    NodeTable::from_json(&json).unwrap_or_else(|e| {
        warn!(path = %path.display(), "rejected node table");
        fail(&format!("{}: {}", path.display(), e))
    })
}

/// Progress goes to stdout, except during a dry run where stdout carries
/// the report.
fn progress(cli: &Cli, msg: &str) {
    if !cli.quiet && !cli.dry_run {
        println!("{}", msg);
    }
}

fn report_error(msg: &str) {
    eprintln!("{}", msg);
}

fn fail(msg: &str) -> ! {
    report_error(&format!("error: {}", msg));
    process::exit(1);
}

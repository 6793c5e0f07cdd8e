//! Single-instruction conformance harness CLI.
//!
//! This binary replays a JSON corpus of single-instruction test vectors against the
//! built-in RISC-V stepper. It performs:
//! 1. **Setup:** Merges the optional JSON config file with command-line flags, loads the
//!    register map, the architecture descriptor, and the corpus.
//! 2. **Run:** Executes the selected range on a worker pool, printing one line per case
//!    and a full state dump for every failure.
//! 3. **Exit:** 0 when every case ran without exhausting the failure budget, 1 on a
//!    threshold abort, 2 for configuration errors, 3 for load errors, and 4 for fatal
//!    setup or execution errors.
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); results go to stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use stepcheck_core::common::ConfigError;
use stepcheck_core::config::HarnessConfig;
use stepcheck_core::corpus::load_corpus;
use stepcheck_core::report::{ConsoleReporter, RunReport, write_summary};
use stepcheck_core::run::FaultPolicy;
use stepcheck_core::run::SetupPolicy;
use stepcheck_core::stepper::{RiscvStepper, Stepper};
use stepcheck_core::{
    ArchitectureDescriptor, Coordinator, HarnessError, RegisterMapping, RunConfig, RunStatus,
};

#[derive(Parser, Debug)]
#[command(
    name = "stepcheck",
    author,
    version,
    about = "Replay single-instruction test vectors against an instruction stepper",
    long_about = "Replay single-instruction test vectors against an instruction stepper.\n\n\
                  Each vector gives an initial state and the state expected after exactly \
                  one instruction. The harness loads the initial state, steps once, and \
                  compares every expected register and memory byte.\n\n\
                  Examples:\n  \
                  stepcheck -s rv32.sla -j addi.json -p pc\n  \
                  stepcheck -s rv64.sla -j tests.json -p pc -t 8 --max-failures 50 \
                  --report out/report.json"
)]
struct Cli {
    /// Compiled architecture descriptor (XML).
    #[arg(short = 's', long)]
    sla_file: PathBuf,

    /// JSON test corpus.
    #[arg(short = 'j', long)]
    json_test: PathBuf,

    /// Program counter register name.
    #[arg(short = 'p', long, required_unless_present = "config")]
    program_counter: Option<String>,

    /// First test to run.
    #[arg(long)]
    start_test: Option<usize>,

    /// One past the last test to run (defaults to the corpus length).
    #[arg(long)]
    end_test: Option<usize>,

    /// Number of worker threads.
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Stop admitting tests after this many failures.
    #[arg(long)]
    max_failures: Option<usize>,

    /// Register mapping file (`test_name=backend_name` per line).
    #[arg(long)]
    register_map: Option<PathBuf>,

    /// JSON harness configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Setup error handling: `abort` the run or `fail` the test.
    #[arg(long)]
    setup_policy: Option<SetupPolicy>,

    /// Stepper fault handling: `fail` the test or `abort` the run.
    #[arg(long)]
    fault_policy: Option<FaultPolicy>,

    /// Key of the memory list inside each corpus state.
    #[arg(long)]
    memory_key: Option<String>,

    /// Write a JSON report of the run to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Do not print a line for passing tests.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Loads the config file (if any) and applies flag overrides.
    fn settings(&self) -> Result<HarnessConfig, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(pc) = &self.program_counter {
            settings.program_counter = Some(pc.clone());
        }
        if let Some(start) = self.start_test {
            settings.start_test = start;
        }
        if self.end_test.is_some() {
            settings.end_test = self.end_test;
        }
        if let Some(threads) = self.threads {
            settings.threads = threads;
        }
        if let Some(max) = self.max_failures {
            settings.max_failures = max;
        }
        if self.register_map.is_some() {
            settings.register_map.clone_from(&self.register_map);
        }
        if let Some(policy) = self.setup_policy {
            settings.setup_policy = policy;
        }
        if let Some(policy) = self.fault_policy {
            settings.fault_policy = policy;
        }
        if let Some(key) = &self.memory_key {
            settings.memory_key.clone_from(key);
        }
        settings.quiet |= self.quiet;

        Ok(settings)
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            eprintln!("[-] {err}");
            err.exit_code()
        }
    };
    process::exit(code);
}

/// Loads all inputs, runs the corpus, and returns the exit code.
fn run(cli: &Cli) -> Result<i32, HarnessError> {
    let settings = cli.settings()?;
    let run_config = settings.run_config()?;

    let mapping = RegisterMapping::from_file(settings.register_map.as_deref())?;
    let descriptor = ArchitectureDescriptor::open(&cli.sla_file)?;
    let cases = load_corpus(&cli.json_test, &mapping, &settings.corpus_format())?;

    let range = run_config.range(cases.len());
    println!("[*] {}: Loaded {} test cases.", cli.json_test.display(), cases.len());
    print_settings(cli, &descriptor, &mapping, &run_config, range.end);

    let stepper = RiscvStepper::new();
    let mut reporter = ConsoleReporter::new(io::stdout().lock(), settings.quiet);
    let outcome = Coordinator::new(&descriptor, &stepper, &run_config).run(&cases, &mut reporter)?;

    match reporter.finish() {
        Ok(mut out) => {
            if outcome.status == RunStatus::Aborted {
                let _ = writeln!(out, "[-] Max failures encountered {}", run_config.max_failures);
            }
            if let Err(err) = write_summary(&mut out, &outcome.stats, outcome.elapsed) {
                tracing::warn!(error = %err, "failed to write summary");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to write results to stdout"),
    }

    if let Some(path) = &cli.report {
        write_report(path, stepper.name(), &outcome)?;
    }

    Ok(outcome.exit_code())
}

fn write_report(
    path: &Path,
    backend: &str,
    outcome: &stepcheck_core::RunOutcome<'_>,
) -> Result<(), ConfigError> {
    RunReport::new(backend, outcome)
        .write_json(path)
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn print_settings(
    cli: &Cli,
    descriptor: &ArchitectureDescriptor,
    mapping: &RegisterMapping,
    config: &RunConfig,
    end: usize,
) {
    println!("[*] Settings:");
    println!("\t[*] Compiled SLA file: {}", cli.sla_file.display());
    println!("\t[*] JSON Test file: {}", cli.json_test.display());
    println!("\t[*] Program counter register: {}", config.program_counter);
    println!("\t[*] Word size: {}", descriptor.word_size());
    println!("\t[*] Register Mapping Count: {}", mapping.len());
    println!("\t[*] Max allowed failures: {}", config.max_failures);
    println!("\t[*] Start test: {}", config.start_index);
    println!("\t[*] End test: {end}");
    println!("\t[*] Threads: {}", config.concurrency);
}

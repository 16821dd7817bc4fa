//! # Passport CLI
//!
//! Counts valid passport records in files, directories or stdin.

mod cli;
mod log_bridge;

use clap::Parser;
use cli::Cli;
use passport_core::batch::{self, BatchConfig, BatchResults};
use passport_core::config::{ConfigError, RuntimeConfig};
use passport_core::pipeline::{self, PipelineOptions, PipelineOutput, PipelineResult};
use serde::Serialize;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Debug, Serialize)]
struct FailureOutput {
    path: String,
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    total_valid_records: usize,
    total_records: usize,
    files: Vec<PipelineOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailureOutput>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match load_runtime(&cli) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let preferences = log_bridge::effective_preferences(&runtime.logging, cli.verbose);
    if let Err(e) = log_bridge::init(&preferences) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_USAGE);
    }

    let options = build_options(&cli, &runtime);

    let outcome = if cli.reads_stdin() {
        run_stdin(&cli, &options)
    } else {
        run_paths(&cli, options)
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn load_runtime(cli: &Cli) -> Result<RuntimeConfig, ConfigError> {
    match &cli.config {
        Some(path) => RuntimeConfig::load(path),
        None => Ok(RuntimeConfig::default()),
    }
}

fn build_options(cli: &Cli, runtime: &RuntimeConfig) -> PipelineOptions {
    let mut options = PipelineOptions::from(runtime);
    if cli.threaded {
        options.scanner.threaded = true;
    }
    if cli.strict_hcl {
        options.validation.strict_hair_color = true;
    }
    if cli.report {
        options.validation.collect_reports = true;
    }
    options
}

fn run_stdin(cli: &Cli, options: &PipelineOptions) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let reader = BufReader::new(std::io::stdin());
    let result = pipeline::process_reader("<stdin>", reader, options)?;
    print_single(cli, &result)?;
    Ok(ExitCode::SUCCESS)
}

fn run_paths(cli: &Cli, options: PipelineOptions) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = BatchConfig {
        recursive: cli.recursive,
        fail_fast: cli.fail_fast,
        extension: cli.extension.clone(),
        options,
        ..BatchConfig::default()
    };
    config.max_threads = cli.threads.unwrap_or_else(num_cpus::get).max(1);

    let files = collect_files(&cli.inputs, &config)?;

    if files.len() == 1 && cli.inputs[0].is_file() {
        let result = pipeline::process_file(&files[0], &config.options)?;
        print_single(cli, &result)?;
        return Ok(ExitCode::SUCCESS);
    }

    let results = batch::process_files(&files, &config)?;
    print_batch(cli, &results)?;

    if results.failure_count() > 0 {
        Ok(ExitCode::from(EXIT_FAILURE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn collect_files(inputs: &[PathBuf], config: &BatchConfig) -> Result<Vec<PathBuf>, batch::BatchError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(batch::discover_files(input, config)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn print_single(cli: &Cli, result: &PipelineResult) -> Result<(), serde_json::Error> {
    if cli.json {
        println!("{}", PipelineOutput::new(result).to_json()?);
        return Ok(());
    }

    println!("{}", result.valid_count());
    if cli.report {
        for record in result.reports() {
            println!("  record {}: {}", record.index, record.report.summary());
        }
    }
    Ok(())
}

fn print_batch(cli: &Cli, results: &BatchResults) -> Result<(), serde_json::Error> {
    if cli.json {
        let output = BatchOutput {
            total_valid_records: results.total_valid_records(),
            total_records: results.total_records(),
            files: results
                .successful_files
                .iter()
                .map(|(_, result)| PipelineOutput::new(result))
                .collect(),
            failures: results
                .failed_files
                .iter()
                .map(|(path, error)| FailureOutput {
                    path: path.display().to_string(),
                    code: error.error_code().as_str().to_string(),
                    message: error.to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (path, result) in &results.successful_files {
        println!("{}: {}", path.display(), result.valid_count());
        if cli.report {
            for record in result.reports() {
                println!("  record {}: {}", record.index, record.report.summary());
            }
        }
    }
    for (path, error) in &results.failed_files {
        eprintln!("{}: error [{}] {}", path.display(), error.error_code().as_str(), error);
    }
    println!("total: {}", results.total_valid_records());
    eprintln!("{}", results.summary());
    Ok(())
}

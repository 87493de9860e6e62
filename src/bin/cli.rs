// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Brushwork CLI

use anyhow::{bail, Result};
use brushwork::cli::{load_planes, validate_file, BrushSummary, Reporter};
use brushwork::validation::{Fuzzer, FuzzerConfig};
use brushwork::{Kernel, KernelConfig};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "brushwork")]
#[command(about = "Brushwork - convex brush geometry kernel for level editors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a brush from a plane file and describe it
    Inspect {
        /// JSON plane file
        input: String,

        /// Print vertices and faces as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check topology and round-trip stability of brush files
    Validate {
        /// JSON plane file(s)
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Build random convex brushes and check every invariant
    Fuzz {
        /// Number of brushes to generate
        #[arg(short, long, default_value = "500")]
        count: usize,

        /// Random seed
        #[arg(short, long, default_value = "24301")]
        seed: u64,
    },

    /// Print the effective configuration, or write it to a file
    Config {
        /// Write the configuration to this path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let kernel = Kernel::load()?;

    match &cli.command {
        Commands::Inspect { input, json } => inspect_command(&kernel, input, *json),
        Commands::Validate { inputs } => validate_command(&kernel, inputs),
        Commands::Fuzz { count, seed } => fuzz_command(&kernel, *count, *seed, cli.verbose),
        Commands::Config { output } => config_command(kernel.config(), output.as_deref()),
        Commands::Version => {
            println!("Brushwork v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn inspect_command(kernel: &Kernel, input: &str, json: bool) -> Result<()> {
    let planes = load_planes(input)?;

    let start = Instant::now();
    let brush = kernel.build_brush(planes)?;
    let build_time = start.elapsed();
    log::debug!("built {} in {:.2?}", input, build_time);

    if json {
        let summary = BrushSummary {
            vertices: brush.geometry().positions().copied().collect(),
            edge_count: brush.geometry().edge_count(),
            faces: brush.face_records(),
            report: brush.build_report().clone(),
            volume: brush.volume(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        Reporter::report_brush(input, &brush, build_time);
        if !brush.is_within(kernel.scene().world_bounds()) {
            Reporter::report_warning("brush extends outside the world bounds");
        }
    }
    Ok(())
}

fn validate_command(kernel: &Kernel, inputs: &[String]) -> Result<()> {
    let mut failed = 0;
    for input in inputs {
        match validate_file(kernel, input) {
            Ok(result) => {
                let ok = result.is_valid(kernel);
                if !ok {
                    failed += 1;
                }
                Reporter::report_validation(input, &result.topology, &result.round_trip, ok);
            }
            Err(err) => {
                Reporter::report_error(&format!("{}: {:#}", input, err));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} brush files failed validation", failed, inputs.len());
    }
    Reporter::success(&format!("{} brush files valid", inputs.len()));
    Ok(())
}

fn fuzz_command(kernel: &Kernel, count: usize, seed: u64, verbose: bool) -> Result<()> {
    let mut fuzzer = Fuzzer::new(FuzzerConfig {
        count,
        seed,
        ..FuzzerConfig::default()
    });
    let cases = fuzzer.run();

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let settings = kernel.config().brush_settings();
    let mut failures = Vec::new();
    for case in &cases {
        if let Err(failure) = fuzzer.check(case, settings) {
            log::warn!("{} failed: {:?}", case.name, failure);
            failures.push((case, failure));
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Reporter::report_fuzz(cases.len() - failures.len(), failures.len(), start.elapsed());
    if verbose {
        for (case, _) in &failures {
            println!("{}", serde_json::to_string(&case.planes)?);
        }
    }
    if !failures.is_empty() {
        bail!("{} fuzz cases failed (seed {})", failures.len(), seed);
    }
    Ok(())
}

fn config_command(config: &KernelConfig, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            config.save(path)?;
            Reporter::success(&format!("Configuration written to {}", path));
        }
        None => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}

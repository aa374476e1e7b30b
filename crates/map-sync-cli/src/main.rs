mod commands;
mod logging;
mod progress;

use std::env;
use std::process;

use clap::Parser;
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use map_sync_core::config::KNOWN_GAME_TYPES;
use map_sync_core::{
    dedupe, layout, AppConfig, Error, HttpRepository, SyncEngine, SyncSummary,
};
use progress::CliReporter;
use tracing::{debug, error, info, warn};

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let loaded = map_sync_core::config::load_configuration();
    let debug_enabled = args.overrides.debug || loaded.as_ref().map(|c| c.debug).unwrap_or(false);
    let _guard = logging::init_logger(debug_enabled);

    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };
    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            error!("Error reading working directory: {}", err);
            process::exit(1);
        }
    };
    let config = args.overrides.apply(config).resolve_destination(&cwd);

    let result = match args.command.unwrap_or(Commands::Sync) {
        Commands::Sync => run_sync(&config),
        Commands::Dedupe => run_dedupe(&config),
        Commands::Sort => run_layout(&config, true),
        Commands::Unsort => run_layout(&config, false),
        Commands::PrintConfig => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {}", err);
        process::exit(1);
    }
}

fn run_sync(config: &AppConfig) -> Result<(), Error> {
    config.validate()?;
    if !KNOWN_GAME_TYPES
        .iter()
        .any(|(key, _)| *key == config.game_type)
    {
        warn!(
            "Game type '{}' is not one of the known catalog keys, trying anyway",
            config.game_type
        );
    }
    debug!("Configuration: {:?}", config);

    let repository = HttpRepository::new(&config.base_url, config.request_timeout());
    let engine = SyncEngine::new(config.clone(), repository);
    let reporter = CliReporter::new();
    let summary = engine.run(&reporter)?;

    print_summary(&summary);
    Ok(())
}

fn run_dedupe(config: &AppConfig) -> Result<(), Error> {
    let reporter = CliReporter::new();
    let removed = dedupe::remove_duplicates(&config.destination_dir, &reporter)?;
    info!(
        "Removed {} files that appeared to be duplicates",
        format!("{}", removed).yellow()
    );
    Ok(())
}

fn run_layout(config: &AppConfig, sort: bool) -> Result<(), Error> {
    let reporter = CliReporter::new();
    let destination = &config.destination_dir;
    let moved = if sort {
        layout::sort_maps(destination, &reporter)?
    } else {
        layout::unsort_maps(destination, &reporter)?
    };
    let removed = layout::remove_empty_directories(destination)?;
    info!(
        "Moved {} files, removed {} empty directories",
        format!("{}", moved).cyan(),
        format!("{}", removed).cyan(),
    );
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("Done in {:.2}s. Here's the executive summary:", summary.duration.as_secs_f64());
    println!(
        "    -  {}",
        format!(
            "Downloaded & unzipped: {}",
            summary.files_wrote.len().to_string().bold()
        )
        .green()
    );
    if summary.files_errored.is_empty() {
        println!("    -  {}", "All downloads successful.".green());
    } else {
        println!(
            "    -  {}",
            format!(
                "Failed to download: {}",
                summary.files_errored.len().to_string().bold()
            )
            .red()
        );
        for failed in &summary.files_errored {
            println!("         {} ({}): {}", failed.name, failed.fingerprint, failed.error);
        }
    }
    if summary.number_of_files_skipped > 0 {
        println!(
            "    -  {}",
            format!(
                "Skipped {} files that were previously downloaded.",
                summary.number_of_files_skipped
            )
            .yellow()
        );
    } else {
        println!("    -  No files skipped.");
    }
    if summary.files_deduped > 0 {
        println!(
            "    -  {}",
            format!(
                "Removed {} files that appeared to be duplicates.",
                summary.files_deduped
            )
            .yellow()
        );
    } else {
        println!("    -  No duplicates found.");
    }
    println!(
        "    -  Moved {} files, removed {} empty directories.",
        summary.files_moved, summary.directories_removed
    );
}

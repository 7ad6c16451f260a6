use clap::Parser;
use log::{error, info, warn};
use std::process::ExitCode;

use vantage::aggregation::RunResult;
use vantage::configuration::{Args, Config};
use vantage::controller::Controller;
use vantage::error_handling::types::ControllerError;
use vantage::identity_rotation::{HttpAddressLookup, SystemCommandRunner};
use vantage::session_management::ChromiumLauncher;
use vantage::storage::FileStorage;

const EXIT_FAILURE: u8 = 1;
const EXIT_ROTATION_UNAVAILABLE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins when set; otherwise info, or debug with --verbose
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let mut logger = env_logger::Builder::new();
    logger.filter_level(level).format_target(false).parse_default_env().init();

    println!(
        "
==============================================================================
                 vantage v{}: hotel prices across VPN countries
==============================================================================
",
        env!("CARGO_PKG_VERSION")
    );

    info!("Importing configuration");
    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to load configuration: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    info!("Configuration imported successfully");

    let lookup = match HttpAddressLookup::new(&config.egress) {
        Ok(lookup) => lookup,
        Err(e) => {
            error!("Unable to build the egress lookup client: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let output_dir = config.output.dir.clone();
    let file_prefix = config.output.file_prefix.clone();
    let mut controller = Controller::new(config, ChromiumLauncher::new(), SystemCommandRunner, lookup);

    let result = match controller.run().await {
        Ok(result) => result,
        Err(ControllerError::RotationUnavailable) => {
            error!("Identity rotation unavailable, no run performed");
            return ExitCode::from(EXIT_ROTATION_UNAVAILABLE);
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    print_summary(&result);

    if result.records.is_empty() {
        warn!("No data collected");
        return ExitCode::SUCCESS;
    }

    let saved = FileStorage::new(&output_dir, &file_prefix)
        .map_err(ControllerError::from)
        .and_then(|storage| controller.persist(&storage, &result));
    match saved {
        Ok(stored) => {
            println!("\nResults saved to:");
            println!("  {}", stored.csv_path.display());
            println!("  {}", stored.json_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Unable to save results: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn print_summary(result: &RunResult) {
    println!("\n{}", "=".repeat(60));
    println!("HOTEL PRICE SUMMARY");
    println!("{}", "=".repeat(60));

    for record in &result.records {
        println!("\n{}: {}", record.identity, record.raw_price);
        if let Some(price) = record.normalized_price {
            println!("  normalized: {:.2}", price);
        }
        println!("  hotel: {}", record.hotel_name);
        println!("  egress: {}", record.ip_address);
        println!("  screenshot: {}", record.screenshot);
    }

    let join = |ids: &[vantage::identity_rotation::Identity]| {
        ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
    };
    println!("\nSuccessful: {} ({})", result.succeeded.len(), join(&result.succeeded));
    println!("Failed: {} ({})", result.failed.len(), join(&result.failed));

    if let Some(stats) = &result.statistics {
        println!("\nPRICE ANALYSIS");
        println!("  Lowest:     {:.2}", stats.min);
        println!("  Highest:    {:.2}", stats.max);
        println!("  Average:    {:.2}", stats.mean);
        println!("  Difference: {:.2}", stats.spread);
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the MineSight dashboard.
//!
//! `summary` and `report` run one load cycle through the view coordinator
//! (probing the prediction service at `MINESIGHT_API_URL` and falling back
//! to the bundled dataset) and print the result. `serve` runs the mock
//! prediction service.
//!
//! Uses `indicatif-log-bridge` (via [`minesight_cli_utils::init_logger`])
//! so log lines and the load spinner never fight for the terminal.

mod render;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use minesight_analytics_models::{
    ConfidenceThreshold, FilterCriteria, Layer, StateFilter, VisibleLayers,
};
use minesight_cli_utils::{LoadSpinner, MultiProgress};
use minesight_dashboard::ViewCoordinator;
use minesight_dataset::StaticDataset;
use minesight_prediction::{BackendConfig, DataSourceSelector};
use minesight_server::ServerConfig;

#[derive(Parser)]
#[command(name = "minesight", about = "Coal mine intelligence dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the data and print filtered counts plus global analytics
    Summary {
        /// Only count mines and zones in this state ("All" for no restriction)
        #[arg(long)]
        state: Option<String>,
        /// Minimum zone confidence, inclusive, in [0, 1]
        #[arg(long)]
        confidence: Option<ConfidenceThreshold>,
        /// Comma-separated layers to show (existing, predicted-surface,
        /// predicted-underground). Defaults to all.
        #[arg(long, value_delimiter = ',')]
        layers: Option<Vec<Layer>>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the report tables (summary, states, top zones)
    Report {
        /// Number of highest-confidence zones to list
        #[arg(long, default_value = "10")]
        top: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the mock prediction service (`BIND_ADDR`, `PORT`)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = minesight_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary {
            state,
            confidence,
            layers,
            json,
        } => {
            let criteria = FilterCriteria {
                state: state.as_deref().map(StateFilter::parse).unwrap_or_default(),
                confidence: confidence.unwrap_or_default(),
            };
            let layers = layers.map_or_else(VisibleLayers::default, |l| VisibleLayers::only(&l));

            let view = load_view(&multi, criteria, layers).await?;
            if json {
                let value = render::summary_json(&view);
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                render::print_summary(&view);
            }
        }
        Commands::Report { top, json } => {
            let view =
                load_view(&multi, FilterCriteria::default(), VisibleLayers::default()).await?;
            let report = view.report(top);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render::print_report(&report);
            }
        }
        Commands::Serve => {
            let config = ServerConfig::from_env();
            // actix-web needs its own system runtime; run it off the tokio
            // worker threads.
            tokio::task::spawn_blocking(move || {
                actix_web::rt::System::new().block_on(minesight_server::run_server(config))
            })
            .await??;
        }
    }

    Ok(())
}

async fn load_view(
    multi: &MultiProgress,
    criteria: FilterCriteria,
    layers: VisibleLayers,
) -> Result<ViewCoordinator, Box<dyn std::error::Error>> {
    let dataset = Arc::new(StaticDataset::load()?);
    let backend = BackendConfig::load()?;
    log::debug!("Prediction service at {}", backend.api_url);
    let selector = DataSourceSelector::from_config(&backend)?;

    let mut view = ViewCoordinator::new(dataset, selector)
        .with_criteria(criteria)
        .with_layers(layers);

    let spinner = LoadSpinner::start(multi, "Loading mine data...");
    match view.load().await {
        Ok(()) => spinner.finish(&format!(
            "Loaded {} mines and {} zones ({})",
            view.mines().len(),
            view.zones().len(),
            view.source(),
        )),
        Err(e) => {
            spinner.clear();
            return Err(e.into());
        }
    }

    Ok(view)
}

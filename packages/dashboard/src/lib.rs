#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! View coordinator for the mine intelligence dashboard.
//!
//! [`ViewCoordinator`] owns every piece of mutable view state: the loaded
//! collections, filter criteria, visible layers and the live/static source
//! flag. Renderers read from it; user input reaches it only through its
//! transition methods.
//!
//! A load cycle runs as an ordered pipeline:
//!
//! 1. probe the prediction service (first load only)
//! 2. decide the zone source
//! 3. fetch mines and zones concurrently, then join
//! 4. compute the analytics snapshot over the full collections
//! 5. publish everything at once and recompute the filtered view

pub mod coordinator;
pub mod report;

use minesight_dataset::DatasetError;
use minesight_prediction::{ConnectionState, PredictionError};
use thiserror::Error;

pub use coordinator::ViewCoordinator;
pub use report::{ReportData, StateRow, SummaryRow, ZoneRow};

/// Errors surfaced to the dashboard user.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A required collection could not be loaded.
    #[error("Failed to load data: {0}")]
    Load(#[from] DatasetError),

    /// A manual refresh was requested while the prediction service is not
    /// connected.
    #[error("Live predictions are unavailable (prediction service is {state})")]
    RefreshRejected {
        /// Connection state at the time of the request.
        state: ConnectionState,
    },

    /// A manual refresh reached the prediction service but failed.
    #[error("Failed to refresh predictions: {0}")]
    Refresh(PredictionError),
}

impl From<PredictionError> for DashboardError {
    fn from(value: PredictionError) -> Self {
        match value {
            PredictionError::NotConnected { state } => Self::RefreshRejected { state },
            other => Self::Refresh(other),
        }
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter evaluation and aggregate analytics.
//!
//! Everything here is pure and deterministic: functions take borrowed
//! collections, never mutate them, and return freshly derived values.
//! Empty inputs produce empty or zero outputs rather than errors.
//!
//! * [`filter`] maps a collection plus criteria to the matching subset.
//! * [`aggregate`] derives the global [`AnalyticsSnapshot`] from the full,
//!   unfiltered collections.
//!
//! [`AnalyticsSnapshot`]: minesight_analytics_models::AnalyticsSnapshot

pub mod aggregate;
pub mod filter;

pub use aggregate::compute_snapshot;
pub use filter::{filter_mines, filter_zones};

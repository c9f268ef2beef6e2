//! Earthquake map pipeline: fetch the feed, style every event, and expose the
//! composed scene through a Leaflet preview.
//!
//! The module is split into focused submodules:
//! - `config`: CLI configuration parsing.
//! - `pipeline`: Orchestrates the fetch → transform → compose → publish pass.
//! - `data`: The scene slot shared between the refresh loop and handlers.
//! - `render`: Renderer adapter (radius floor, page templating).
//! - `server`: Actix Web preview endpoints.
//! - `telemetry`: Tracing subscriber and Prometheus recorder setup.

/// Re-export settings so callers can configure runs without reaching into
/// submodules.
pub use config::{ExportArgs, ServeArgs};
/// Entry points for the two subcommands.
pub use pipeline::{export, serve};

mod config;
mod data;
mod pipeline;
mod render;
mod server;
mod telemetry;

//! Rendering selections to images and delivering them.
//!
//! This module ties the core together:
//! - layout, rasterization and encoding on blocking worker threads
//! - saving under a non-overwriting timestamped name
//! - multi-flavor clipboard transfer
//! - a background manager for callers that must not wait

pub mod clipboard;
pub mod file;
pub mod types;

mod dependencies;
mod manager;
mod pipeline;
#[cfg(test)]
mod tests;

pub use dependencies::{ShotClipboard, ShotDependencies, ShotFileSaver, ShotLayoutSource};
pub use manager::ShotManager;
pub use pipeline::{ShotRequest, perform_shot};
pub use types::{ShotDestination, ShotError, ShotOutcome, ShotResult, ShotStatus};

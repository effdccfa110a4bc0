//! Core falling-sand simulation engine.
//!
//! Main components:
//! - [`material`] — material tags, display colors and brush footprints.
//! - [`cell`] — per-cell state: material, burn deadline, tint.
//! - [`grid`] — fixed-size double-buffered cell container.
//! - [`claim_mask`] — per-tick movement claim set.
//! - [`config`] — rule constants (probabilities, burn durations).
//! - [`phases`] — the per-tick update passes.
//! - [`brush`] — pointer-driven material painting.
//! - [`importer`] — atomic and progressive image-to-grid import.
//! - [`simulation`] — the facade the platform layer talks to.

pub mod brush;
pub mod cell;
pub mod claim_mask;
pub mod config;
pub mod grid;
pub mod importer;
pub mod material;
pub mod phases;
pub mod simulation;

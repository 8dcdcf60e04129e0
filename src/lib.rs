//! # Track Vetter
//!
//! A duplicate-aware music library indexer that vets new tracks before import.
//!
//! ## Core Philosophy
//! - **Never delete** - The core only classifies and reports; destructive
//!   actions belong to an external, explicitly-confirmed step
//! - **Show confidence** - Every verdict carries a score and a match type
//! - **Bulk-friendly** - Indexing and vetting thousands of files uses batched
//!   queries and single transactions, never per-file round-trips
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - The library index, duplicate engine, and vetting orchestrator
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, TrackVetterError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}

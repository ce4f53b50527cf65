//! # Hive Core
//!
//! Core types and pure state machines for Hive agent simulations.
//!
//! Everything in this crate is independent of the async runtime that drives
//! a world forward. It defines:
//!
//! - **types** - agent identity, grid positions, vitals and lifecycle state
//! - **observation** - what an agent sees when it is asked to decide
//! - **decision** - what the reasoning service answers
//! - **priority** - advisory urgency buckets derived from vitals
//! - **needs** - the per-tick hunger/energy/health decay state machine
//! - **store** - the persistence seam the needs engine writes through
//! - **config** - runtime-tunable parameters for every component
//!
//! ## Quick Start
//!
//! ```rust
//! use hive_core::prelude::*;
//!
//! let vitals = Vitals::new(80.0, 80.0, 100.0);
//! assert_eq!(priority(&vitals), Priority::Normal);
//!
//! let engine = NeedsEngine::new(NeedsConfig::default());
//! let ticks = engine.survival_ticks(60.0, 30.0);
//! assert!(ticks > 0.0);
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod needs;
pub mod observation;
pub mod prelude;
pub mod priority;
pub mod store;
pub mod types;

//! nexus-2048 (workspace facade crate).
//!
//! Re-exports the member crates under short names and adds the pieces that
//! only the binary needs: environment configuration, best-score records and
//! logging setup.

pub use nexus_2048_adapter as adapter;
pub use nexus_2048_core as core;
pub use nexus_2048_engine as engine;
pub use nexus_2048_input as input;
pub use nexus_2048_term as term;
pub use nexus_2048_types as types;

pub mod config;
pub mod logging;
pub mod records;

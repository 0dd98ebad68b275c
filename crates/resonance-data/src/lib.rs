//! Data-driven configuration for Resonance.
//!
//! A data directory may hold two optional files, each in RON, TOML, or JSON:
//!
//! - `conduit.{ron,toml,json}` -- network tuning, resolved into a
//!   [`ConduitConfig`](resonance_conduit::ConduitConfig).
//! - `machines.{ron,toml,json}` -- named energy storage templates, resolved
//!   into a [`MachineCatalog`].

pub mod conduit_config;
pub mod loader;
pub mod machines;
pub mod schema;

pub use conduit_config::{load_conduit_config, resolve_conduit_config};
pub use loader::{DataLoadError, ResonanceData, load_resonance_data};
pub use machines::{MachineCatalog, load_machines};

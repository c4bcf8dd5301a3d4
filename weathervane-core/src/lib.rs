//! Core library for the `weathervane` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather orchestrator and its observable state
//! - The injectable clock and transport seams it is built around
//! - Caching, unit conversion, and error classification
//!
//! It is used by `weathervane-cli`, but can also be reused by other binaries
//! or services.

pub mod cache;
pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod rotation;
pub mod state;
pub mod transport;
pub mod units;

pub use cache::{CacheEntry, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use decode::{DecodeError, decode};
pub use error::{ErrorKind, FetchError};
pub use model::{WeatherRecord, normalize_key};
pub use orchestrator::WeatherOrchestrator;
pub use rotation::KeyRotator;
pub use state::OrchestratorState;
pub use transport::{HttpTransport, Transport, TransportError};
pub use units::TemperatureUnit;

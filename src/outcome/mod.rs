//! Server-authoritative outcome generation
//!
//! A drop is decided here, before any ball exists: a fair binary random walk
//! picks the bin, the shared table prices it, and the walk itself becomes the
//! step pattern the simulation replays.

pub mod generator;
pub mod service;
pub mod table;
pub mod wire;

pub use generator::{DropOutcome, OutcomeGenerator};
pub use service::{OutcomeServer, OutcomeService};
pub use table::MultiplierTable;
pub use wire::DropResponse;

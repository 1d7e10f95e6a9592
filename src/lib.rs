mod conductor;
mod config;
mod error;
mod events;
pub mod genetics;
mod model;
pub mod server;
mod votes;

pub use conductor::{Conductor, ConductorHandle, ConductorState, CurrentBar, Tick, spawn_conductor};
pub use config::{Config, ValueRange};
pub use error::{BreedError, ConfigError, Error, VoteError};
pub use events::{ConductorCommand, ConductorUpdate};
pub use model::{Bar, BarId, Note, NoteId, Population};
pub use votes::VoteStore;

mod breeder;
mod generator;
mod selection;

pub use breeder::{BreedReport, Breeder};
pub use generator::{generate_bar, generate_note, generate_population};
pub use selection::{Selection, select_parents};

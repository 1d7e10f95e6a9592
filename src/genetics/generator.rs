use rand::Rng;

use crate::config::Config;
use crate::model::{Bar, Note, Population};

pub fn generate_note<R: Rng + ?Sized>(rng: &mut R, config: &Config) -> Note {
    let end = rng.random::<f32>();
    let pitch = config.pitch.sample(rng) as i32;
    let velocity = config.velocity.sample(rng) as i32;
    Note::new(rng, end, pitch, velocity, config.pitch, config.velocity)
}

pub fn generate_bar<R: Rng + ?Sized>(rng: &mut R, config: &Config) -> Bar {
    let count = config.note_count(rng);
    let notes = (0..count).map(|_| generate_note(rng, config)).collect();
    Bar::new(rng, notes)
}

/// Builds a fresh random generation. Nothing is registered for voting; the
/// caller owns that step.
pub fn generate_population<R: Rng + ?Sized>(rng: &mut R, config: &Config) -> Population {
    Population::new(
        (0..config.population_size)
            .map(|_| generate_bar(rng, config))
            .collect(),
    )
}

use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashMap;

use super::generator::generate_note;
use super::selection::select_parents;
use crate::config::Config;
use crate::error::BreedError;
use crate::model::{Bar, BarId, Note, Population};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedReport {
    pub total_votes: u64,
    pub parents: Vec<BarId>,
    pub uniform: bool,
}

pub struct Breeder<'a> {
    config: &'a Config,
}

impl<'a> Breeder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Breeds a generation of the same size as `population` from the bars the
    /// votes favour. Each child bar descends from a single parent bar: every
    /// child note crosses two notes drawn (with replacement) from that parent.
    pub fn breed<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        population: &Population,
        votes: &HashMap<BarId, u32>,
    ) -> Result<(Population, BreedReport), BreedError> {
        let selection = select_parents(population, votes)?;

        let mut bars = Vec::with_capacity(population.len());
        for _ in 0..population.len() {
            let parent = selection
                .parents
                .choose(rng)
                .ok_or(BreedError::EmptyParentSet)?;
            let count = self.config.note_count(rng);
            let mut notes = Vec::with_capacity(count);
            for _ in 0..count {
                let note = match (parent.notes.choose(rng), parent.notes.choose(rng)) {
                    (Some(mother), Some(father)) => self.reproduce_notes(rng, mother, father),
                    _ => generate_note(rng, self.config),
                };
                notes.push(note);
            }
            bars.push(Bar::new(rng, notes));
        }

        let report = BreedReport {
            total_votes: selection.total_votes,
            parents: selection.parents.iter().map(|bar| bar.id).collect(),
            uniform: selection.uniform,
        };
        Ok((Population::new(bars), report))
    }

    /// Crosses two notes into a new one with a fresh id.
    ///
    /// `end` is inherited half the time (from either parent) and redrawn
    /// otherwise. Pitch and velocity come from either parent plus a signed
    /// error of at most `mutation_error`. A velocity pushed under the floor
    /// lands `mutation_error` above it instead of on it.
    pub fn reproduce_notes<R: Rng + ?Sized>(&self, rng: &mut R, mother: &Note, father: &Note) -> Note {
        let end = if rng.random_bool(0.5) {
            pick(rng, mother, father).end
        } else {
            rng.random::<f32>()
        };

        let pitch = pick(rng, mother, father).pitch as i32 + self.error(rng);

        let velocity_range = self.config.velocity;
        let mut velocity = pick(rng, mother, father).velocity as i32 + self.error(rng);
        if velocity < velocity_range.min as i32 {
            velocity = velocity_range.min as i32 + self.config.mutation_error as i32;
        }

        Note::new(rng, end, pitch, velocity, self.config.pitch, velocity_range)
    }

    fn error<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let bound = self.config.mutation_error as i32;
        rng.random_range(-bound..=bound)
    }
}

fn pick<'n, R: Rng + ?Sized>(rng: &mut R, mother: &'n Note, father: &'n Note) -> &'n Note {
    if rng.random_bool(0.5) { mother } else { father }
}

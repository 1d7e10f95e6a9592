use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::ValueRange;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                Self(random_uuid(rng))
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(NoteId);
entity_id!(BarId);

/// 128 random bits in UUID v4 layout, drawn from the caller's RNG so seeded
/// runs produce the same identities.
fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub start: f32,
    pub end: f32,
    #[serde(rename = "note")]
    pub pitch: u8,
    pub velocity: u8,
}

impl Note {
    /// Builds a note with a fresh id, clamping `pitch` and `velocity` into
    /// their ranges. `start` is always 0.
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        end: f32,
        pitch: i32,
        velocity: i32,
        pitch_range: ValueRange,
        velocity_range: ValueRange,
    ) -> Self {
        Self {
            id: NoteId::random(rng),
            start: 0.0,
            end,
            pitch: pitch_range.clamp(pitch),
            velocity: velocity_range.clamp(velocity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub id: BarId,
    pub notes: Vec<Note>,
}

impl Bar {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, notes: Vec<Note>) -> Self {
        Self {
            id: BarId::random(rng),
            notes,
        }
    }
}

/// One generation of bars. Bars are shared immutably so the conductor can
/// publish them without copying.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    bars: Vec<Arc<Bar>>,
}

impl Population {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars: bars.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Bar>> {
        self.bars.get(index)
    }

    pub fn bars(&self) -> &[Arc<Bar>] {
        &self.bars
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Bar>> {
        self.bars.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = BarId> + '_ {
        self.bars.iter().map(|bar| bar.id)
    }
}

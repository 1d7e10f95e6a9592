use crate::model::BarId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductorCommand {
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConductorUpdate {
    BarStarted {
        generation: u64,
        index: usize,
        bar_id: BarId,
    },
    GenerationBred {
        generation: u64,
        total_votes: u64,
        parents: Vec<BarId>,
        uniform: bool,
    },
    BreedingSkipped {
        generation: u64,
        reason: String,
    },
}

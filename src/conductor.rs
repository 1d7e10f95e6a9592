use arc_swap::ArcSwap;
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BreedError, Error};
use crate::events::{ConductorCommand, ConductorUpdate};
use crate::genetics::{Breeder, generate_population};
use crate::model::{Bar, Population};
use crate::votes::VoteStore;

const UPDATE_BUFFER: usize = 256;

/// Read side of the bar that is playing right now. Cloning is cheap and every
/// clone sees the same published bar.
#[derive(Debug, Clone)]
pub struct CurrentBar(Arc<ArcSwap<Bar>>);

impl CurrentBar {
    fn new(bar: Arc<Bar>) -> Self {
        Self(Arc::new(ArcSwap::new(bar)))
    }

    pub fn load(&self) -> Arc<Bar> {
        self.0.load_full()
    }

    fn publish(&self, bar: Arc<Bar>) {
        self.0.store(bar);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductorState {
    Playing { bar: usize, note: usize },
    Breeding,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Hold the current note for this long.
    Wait(Duration),
    Update(ConductorUpdate),
    Continue,
}

pub struct Conductor {
    config: Config,
    rng: ChaCha8Rng,
    population: Population,
    votes: Arc<VoteStore>,
    current: CurrentBar,
    state: ConductorState,
    generation: u64,
    pending: Option<ConductorUpdate>,
}

impl Conductor {
    /// Seeds from `config.seed` when set, otherwise from the OS. Failing to
    /// get OS entropy is fatal: bar identities depend on it.
    pub fn new(config: Config, votes: Arc<VoteStore>) -> Result<Self, Error> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::try_from_os_rng().map_err(|e| Error::Identity(e.to_string()))?,
        };
        Self::with_rng(config, votes, rng)
    }

    pub fn with_rng(config: Config, votes: Arc<VoteStore>, mut rng: ChaCha8Rng) -> Result<Self, Error> {
        config.validate()?;
        let population = generate_population(&mut rng, &config);
        votes.register_all(population.ids());
        let first = population
            .get(0)
            .cloned()
            .ok_or(BreedError::EmptyParentSet)?;

        let mut conductor = Self {
            config,
            rng,
            population,
            votes,
            current: CurrentBar::new(first),
            state: ConductorState::Playing { bar: 0, note: 0 },
            generation: 0,
            pending: None,
        };
        conductor.enter_bar(0);
        Ok(conductor)
    }

    pub fn current_bar(&self) -> CurrentBar {
        self.current.clone()
    }

    pub fn votes(&self) -> Arc<VoteStore> {
        Arc::clone(&self.votes)
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn state(&self) -> ConductorState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advances the state machine by one step without sleeping.
    pub fn tick(&mut self) -> Tick {
        if let Some(update) = self.pending.take() {
            return Tick::Update(update);
        }

        match self.state {
            ConductorState::Playing { bar, note } => {
                let end = self
                    .population
                    .get(bar)
                    .and_then(|playing| playing.notes.get(note))
                    .map(|n| n.end);
                match end {
                    Some(end) => {
                        self.state = ConductorState::Playing { bar, note: note + 1 };
                        Tick::Wait(self.config.note_duration(end))
                    }
                    None => {
                        self.finish_bar(bar);
                        Tick::Continue
                    }
                }
            }
            ConductorState::Breeding => Tick::Update(self.breed()),
        }
    }

    /// Runs ticks, ignoring waits, until the current generation has been
    /// replaced (or breeding was skipped). Returns the breeding outcome.
    pub fn advance_generation(&mut self) -> ConductorUpdate {
        loop {
            if let Tick::Update(
                update @ (ConductorUpdate::GenerationBred { .. } | ConductorUpdate::BreedingSkipped { .. }),
            ) = self.tick()
            {
                return update;
            }
        }
    }

    pub fn run(mut self, commands: Receiver<ConductorCommand>, updates: Sender<ConductorUpdate>) {
        info!(
            population = self.population.len(),
            notes_per_bar = ?(self.config.min_notes_per_bar..=self.config.max_notes_per_bar),
            "conductor started"
        );
        loop {
            match self.tick() {
                Tick::Wait(duration) => match commands.recv_timeout(duration) {
                    Ok(ConductorCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                },
                Tick::Update(update) => {
                    // Nobody is obliged to listen; drop updates when the buffer is full.
                    let _ = updates.try_send(update);
                    if stop_requested(&commands) {
                        break;
                    }
                }
                Tick::Continue => {
                    if stop_requested(&commands) {
                        break;
                    }
                }
            }
        }
        info!(generation = self.generation, "conductor stopped");
    }

    fn finish_bar(&mut self, bar: usize) {
        let next = bar + 1;
        if next < self.population.len() {
            self.enter_bar(next);
        } else {
            self.state = ConductorState::Breeding;
        }
    }

    fn enter_bar(&mut self, index: usize) {
        self.state = ConductorState::Playing { bar: index, note: 0 };
        let Some(bar) = self.population.get(index).cloned() else {
            return;
        };
        debug!(
            generation = self.generation,
            index,
            bar = %bar.id,
            notes = bar.notes.len(),
            "current bar"
        );
        self.pending = Some(ConductorUpdate::BarStarted {
            generation: self.generation,
            index,
            bar_id: bar.id,
        });
        self.current.publish(bar);
    }

    fn breed(&mut self) -> ConductorUpdate {
        let votes = self.votes.snapshot_and_clear();
        let update = match Breeder::new(&self.config).breed(&mut self.rng, &self.population, &votes) {
            Ok((population, report)) => {
                self.votes.register_all(population.ids());
                self.population = population;
                self.generation += 1;
                info!(
                    generation = self.generation,
                    total_votes = report.total_votes,
                    parents = report.parents.len(),
                    uniform = report.uniform,
                    "bred new generation"
                );
                ConductorUpdate::GenerationBred {
                    generation: self.generation,
                    total_votes: report.total_votes,
                    parents: report.parents,
                    uniform: report.uniform,
                }
            }
            Err(err) => {
                warn!(generation = self.generation, error = %err, "breeding skipped, replaying generation");
                self.votes.register_all(self.population.ids());
                ConductorUpdate::BreedingSkipped {
                    generation: self.generation,
                    reason: err.to_string(),
                }
            }
        };
        self.enter_bar(0);
        update
    }
}

fn stop_requested(commands: &Receiver<ConductorCommand>) -> bool {
    match commands.try_recv() {
        Ok(ConductorCommand::Shutdown) | Err(TryRecvError::Disconnected) => true,
        Err(TryRecvError::Empty) => false,
    }
}

pub struct ConductorHandle {
    pub command_tx: Sender<ConductorCommand>,
    pub update_rx: Receiver<ConductorUpdate>,
    pub current_bar: CurrentBar,
    pub votes: Arc<VoteStore>,
    thread: JoinHandle<()>,
}

impl ConductorHandle {
    pub fn shutdown(self) {
        let _ = self.command_tx.send(ConductorCommand::Shutdown);
        if self.thread.join().is_err() {
            warn!("conductor thread panicked");
        }
    }
}

pub fn spawn_conductor(conductor: Conductor) -> Result<ConductorHandle, Error> {
    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::bounded(UPDATE_BUFFER);
    let current_bar = conductor.current_bar();
    let votes = conductor.votes();

    let thread = std::thread::Builder::new()
        .name("conductor".into())
        .spawn(move || conductor.run(command_rx, update_tx))?;

    Ok(ConductorHandle {
        command_tx,
        update_rx,
        current_bar,
        votes,
        thread,
    })
}

#![deny(warnings)]

//! ECS runtime for the simulation.
//!
//! [`Simulation`] is the single owner of a game: the state, rules and seeded
//! RNG live as resources in a `bevy_ecs` world and a tick is one run of a
//! single-threaded schedule. [`clock`] drives it from a tokio task.

pub mod clock;

pub use clock::{ClockError, Command, SimHandle, SimulationClock};

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sim_core::{
    validate_catalog, validate_config, validate_state, Catalog, ConfigError, GameState,
    SimConfig, ValidationError,
};
use sim_econ::{apply_action, apply_tick, Action, ActionError, ActionOutcome, EconError, TickSummary};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The tick failed; the previous state was kept.
    #[error("tick failed: {0}")]
    Tick(#[from] EconError),
    #[error("tick schedule produced no result")]
    Stalled,
}

/// Live game state.
#[derive(Resource)]
struct Game(GameState);

/// Immutable rules of the run.
#[derive(Resource)]
struct Rules {
    catalog: Catalog,
    config: SimConfig,
}

/// Generator behind every random draw of the run.
#[derive(Resource)]
struct TickRng(ChaCha8Rng);

/// Result of the current schedule run, taken by [`Simulation::step`].
#[derive(Resource, Default)]
struct TickOutcome(Option<Result<TickSummary, EconError>>);

fn advance_tick(
    mut game: ResMut<Game>,
    rules: Res<Rules>,
    mut rng: ResMut<TickRng>,
    mut outcome: ResMut<TickOutcome>,
) {
    match apply_tick(&game.0, &rules.catalog, &rules.config, &mut rng.0) {
        Ok(report) => {
            game.0 = report.state;
            outcome.0 = Some(Ok(report.summary));
        }
        Err(e) => {
            error!(tick = game.0.tick, error = %e, "tick failed; state kept");
            outcome.0 = Some(Err(e));
        }
    }
}

fn publish_tick(mut game: ResMut<Game>, outcome: Res<TickOutcome>) {
    if let Some(Ok(summary)) = &outcome.0 {
        game.0.last_tick_at = Some(Utc::now());
        debug!(tick = summary.tick, cash = %summary.cash, share_price = %summary.share_price, "tick published");
    }
}

/// Point-in-time view handed to observers.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub state: GameState,
    pub last: Option<TickSummary>,
}

pub struct Simulation {
    world: World,
    schedule: Schedule,
    last: Option<TickSummary>,
}

impl Simulation {
    /// Start a new game.
    pub fn new(catalog: Catalog, config: SimConfig) -> Result<Self, SimError> {
        let state = GameState::new_game(&catalog, &config.start);
        Self::from_state(catalog, config, state)
    }

    /// Resume from an existing state. Everything is validated first.
    pub fn from_state(
        catalog: Catalog,
        config: SimConfig,
        state: GameState,
    ) -> Result<Self, SimError> {
        validate_config(&config)?;
        validate_catalog(&catalog)?;
        validate_state(&state, &catalog, config.contracts.max_offers)?;

        let mut world = World::new();
        world.insert_resource(TickRng(ChaCha8Rng::seed_from_u64(config.rng_seed)));
        world.insert_resource(Game(state));
        world.insert_resource(Rules { catalog, config });
        world.init_resource::<TickOutcome>();

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((advance_tick, publish_tick).chain());

        Ok(Self {
            world,
            schedule,
            last: None,
        })
    }

    /// Run one tick.
    pub fn step(&mut self) -> Result<TickSummary, SimError> {
        self.schedule.run(&mut self.world);
        match self.world.resource_mut::<TickOutcome>().0.take() {
            Some(Ok(summary)) => {
                self.last = Some(summary.clone());
                Ok(summary)
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(SimError::Stalled),
        }
    }

    /// Run `n` ticks, stopping at the first failure.
    pub fn run_ticks(&mut self, n: u64) -> Result<Option<TickSummary>, SimError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(self.last.clone())
    }

    /// Apply a player action between ticks.
    pub fn apply(&mut self, action: Action) -> Result<ActionOutcome, ActionError> {
        self.world.resource_scope(|world, mut game: Mut<Game>| {
            let rules = world.resource::<Rules>();
            let result = apply_action(&mut game.0, &rules.catalog, &rules.config, action);
            if let Err(e) = &result {
                warn!(error = %e, "action rejected");
            }
            result
        })
    }

    pub fn state(&self) -> &GameState {
        &self.world.resource::<Game>().0
    }

    pub fn catalog(&self) -> &Catalog {
        &self.world.resource::<Rules>().catalog
    }

    pub fn config(&self) -> &SimConfig {
        &self.world.resource::<Rules>().config
    }

    pub fn last_summary(&self) -> Option<&TickSummary> {
        self.last.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state().clone(),
            last: self.last.clone(),
        }
    }
}

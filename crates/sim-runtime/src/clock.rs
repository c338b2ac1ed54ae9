//! Real-time driver.
//!
//! A spawned task owns the [`Simulation`] outright and multiplexes a tick
//! timer with a command queue, so ticks and actions never interleave.
//! Every change is published as a fresh [`Snapshot`] on a watch channel.

use crate::{Simulation, Snapshot};
use sim_econ::{Action, ActionError, ActionOutcome};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("simulation clock has stopped")]
    Stopped,
}

/// Requests accepted by the clock task.
#[derive(Debug)]
pub enum Command {
    Act {
        action: Action,
        reply: oneshot::Sender<Result<ActionOutcome, ActionError>>,
    },
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

/// Cloneable client side of a running clock.
#[derive(Clone)]
pub struct SimHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl SimHandle {
    /// Queue an action; resolves once it has been applied or rejected.
    pub async fn act(&self, action: Action) -> Result<Result<ActionOutcome, ActionError>, ClockError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Act { action, reply })
            .await
            .map_err(|_| ClockError::Stopped)?;
        rx.await.map_err(|_| ClockError::Stopped)
    }

    /// Fresh snapshot taken after every command queued before it.
    pub async fn snapshot(&self) -> Result<Snapshot, ClockError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply))
            .await
            .map_err(|_| ClockError::Stopped)?;
        rx.await.map_err(|_| ClockError::Stopped)
    }

    /// Most recently published snapshot, without waiting.
    pub fn latest(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshots.clone()
    }

    pub async fn shutdown(&self) -> Result<(), ClockError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| ClockError::Stopped)
    }
}

pub struct SimulationClock {
    sim: Simulation,
    period: Duration,
}

impl SimulationClock {
    pub fn new(sim: Simulation) -> Self {
        let period = sim.config().tick_interval();
        Self { sim, period }
    }

    pub fn with_period(sim: Simulation, period: Duration) -> Self {
        Self { sim, period }
    }

    /// Start ticking on the current tokio runtime. The join handle yields
    /// the simulation back after shutdown.
    pub fn spawn(self) -> (SimHandle, JoinHandle<Simulation>) {
        let (commands, inbox) = mpsc::channel::<Command>(100);
        let (publisher, snapshots) = watch::channel(Arc::new(self.sim.snapshot()));
        let task = tokio::spawn(self.run(inbox, publisher));
        (
            SimHandle {
                commands,
                snapshots,
            },
            task,
        )
    }

    async fn run(
        mut self,
        mut inbox: mpsc::Receiver<Command>,
        publisher: watch::Sender<Arc<Snapshot>>,
    ) -> Simulation {
        let mut ticker = time::interval_at(time::Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(period_ms = self.period.as_millis() as u64, "simulation clock started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sim.step() {
                        Ok(_) => {
                            publisher.send_replace(Arc::new(self.sim.snapshot()));
                        }
                        Err(e) => error!(error = %e, "tick skipped"),
                    }
                }
                cmd = inbox.recv() => match cmd {
                    Some(Command::Act { action, reply }) => {
                        let result = self.sim.apply(action);
                        if result.is_ok() {
                            publisher.send_replace(Arc::new(self.sim.snapshot()));
                        }
                        let _ = reply.send(result);
                    }
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.sim.snapshot());
                    }
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        info!(tick = self.sim.state().tick, "simulation clock stopped");
        self.sim
    }
}

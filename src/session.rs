/// Game session controller.
///
/// Owns the `SessionState` and the two self-rescheduling tasks that drive
/// it: the frame task and the spawn task. `stop` and `halt` cancel both
/// handles before returning, so no callback can reach the state after the
/// session has ended.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::compute::{init_state, move_catcher, spawn_item, tick};
use crate::config::{ConfigError, GameConfig};
use crate::entities::{Outcome, SessionState, SessionStatus};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::stage::Renderer;

/// Tasks a session puts on the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTimer {
    Frame,
    Spawn,
}

pub struct GameSession {
    config: GameConfig,
    state: SessionState,
    rng: StdRng,
    frame_task: Option<TaskHandle>,
    spawn_task: Option<TaskHandle>,
    runs: u32,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            state: init_state(&config),
            config,
            rng,
            frame_task: None,
            spawn_task: None,
            runs: 0,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Number of times `start` has been called.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Reset everything and begin a new run. Safe to call in any state.
    pub fn start<T: From<SessionTimer>>(&mut self, sched: &mut Scheduler<T>) {
        self.cancel_tasks(sched);
        self.runs += 1;
        self.state = SessionState {
            status: SessionStatus::Active,
            ..init_state(&self.config)
        };
        debug!("session run {} started", self.runs);

        self.state = spawn_item(&self.state, &self.config, &mut self.rng);
        self.spawn_task = Some(sched.schedule(
            self.config.spawn_interval_ms,
            SessionTimer::Spawn.into(),
        ));
        self.frame_task = Some(sched.schedule(0, SessionTimer::Frame.into()));
    }

    pub fn restart<T: From<SessionTimer>>(&mut self, sched: &mut Scheduler<T>) {
        self.start(sched);
    }

    /// Route a fired session task. Returns the outcome if this frame ended
    /// the session.
    pub fn on_timer<T: From<SessionTimer>, R: Renderer + ?Sized>(
        &mut self,
        timer: SessionTimer,
        handle: TaskHandle,
        sched: &mut Scheduler<T>,
        renderer: &mut R,
    ) -> Option<Outcome> {
        match timer {
            SessionTimer::Frame => self.on_frame(handle, sched, renderer),
            SessionTimer::Spawn => {
                self.on_spawn(handle, sched);
                None
            }
        }
    }

    pub fn on_frame<T: From<SessionTimer>, R: Renderer + ?Sized>(
        &mut self,
        handle: TaskHandle,
        sched: &mut Scheduler<T>,
        renderer: &mut R,
    ) -> Option<Outcome> {
        if !self.is_active() || self.frame_task != Some(handle) {
            warn!("ignoring stale frame task {:?}", handle);
            return None;
        }
        self.frame_task = None;

        let (next, outcome) = tick(&self.state, &self.config);
        self.state = next;
        renderer.render(&self.state);

        match outcome {
            Some(outcome) => Some(self.stop(sched, outcome)),
            None => {
                self.frame_task = Some(sched.schedule(
                    self.config.frame_interval_ms,
                    SessionTimer::Frame.into(),
                ));
                None
            }
        }
    }

    pub fn on_spawn<T: From<SessionTimer>>(
        &mut self,
        handle: TaskHandle,
        sched: &mut Scheduler<T>,
    ) {
        if !self.is_active() || self.spawn_task != Some(handle) {
            warn!("ignoring stale spawn task {:?}", handle);
            return;
        }
        self.state = spawn_item(&self.state, &self.config, &mut self.rng);
        self.spawn_task = Some(sched.schedule(
            self.config.spawn_interval_ms,
            SessionTimer::Spawn.into(),
        ));
    }

    /// End the run with `outcome`, cancelling both tasks first.
    pub fn stop<T>(&mut self, sched: &mut Scheduler<T>, outcome: Outcome) -> Outcome {
        self.cancel_tasks(sched);
        self.state.status = match outcome {
            Outcome::Win => SessionStatus::Won,
            Outcome::Lose => SessionStatus::Lost,
        };
        info!(
            "session run {} ended: {:?} with score {}",
            self.runs, outcome, self.state.score
        );
        outcome
    }

    /// Abandon the run without an outcome.
    pub fn halt<T>(&mut self, sched: &mut Scheduler<T>) {
        self.cancel_tasks(sched);
        if self.is_active() {
            self.state.status = SessionStatus::Idle;
            debug!("session run {} halted", self.runs);
        }
    }

    /// Follow the pointer. Ignored unless a run is in progress.
    pub fn pointer_moved(&mut self, x: f32) {
        if !self.is_active() {
            return;
        }
        self.state = move_catcher(&self.state, x);
    }

    fn cancel_tasks<T>(&mut self, sched: &mut Scheduler<T>) {
        if let Some(handle) = self.frame_task.take() {
            sched.cancel(handle);
        }
        if let Some(handle) = self.spawn_task.take() {
            sched.cancel(handle);
        }
    }
}

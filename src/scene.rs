/// Page-level scene sequence.
///
/// `Valentine` owns the scheduler, the game session and the poem reveal,
/// and walks the scenes forward: Landing, Reaction, Game, Trust, Poem,
/// Final. The host feeds it user actions (`confirm`, `pointer_moved`) and
/// elapsed time (`advance`); everything visible goes out through the
/// `Stage`.

use log::{info, warn};

use crate::config::{ConfigError, GameConfig, PoemFinish, RetryMode};
use crate::entities::{Outcome, SessionStatus};
use crate::poem::{PoemPhase, PoemReveal, PoemTimer};
use crate::scheduler::{Millis, Scheduler, TaskHandle};
use crate::session::{GameSession, SessionTimer};
use crate::stage::{Burst, Stage};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scene {
    Landing,
    Reaction,
    Game,
    Trust,
    Poem,
    Final,
}

/// Everything that can sit on the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    Session(SessionTimer),
    Poem(PoemTimer),
    /// Leave the game scene after a win.
    LeaveGame,
    /// Start a new run after a loss.
    RetryGame,
    /// Leave the trust scene without waiting for the player.
    LeaveTrust,
}

impl From<SessionTimer> for Timer {
    fn from(timer: SessionTimer) -> Self {
        Timer::Session(timer)
    }
}

impl From<PoemTimer> for Timer {
    fn from(timer: PoemTimer) -> Self {
        Timer::Poem(timer)
    }
}

pub struct Valentine<S: Stage> {
    scene: Scene,
    scheduler: Scheduler<Timer>,
    session: GameSession,
    poem: PoemReveal,
    /// Pending delayed transition owned by the current scene.
    scene_task: Option<TaskHandle>,
    stage: S,
}

impl<S: Stage> Valentine<S> {
    /// Validate `config` and show the landing scene.
    pub fn new(config: GameConfig, mut stage: S) -> Result<Self, ConfigError> {
        let poem = PoemReveal::new(
            config.poem.clone(),
            config.poem_line_delay_ms,
            config.poem_trailing_delay_ms,
        );
        let session = GameSession::new(config)?;
        stage.activate(Scene::Landing);
        Ok(Self {
            scene: Scene::Landing,
            scheduler: Scheduler::new(),
            session,
            poem,
            scene_task: None,
            stage,
        })
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn poem(&self) -> &PoemReveal {
        &self.poem
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// The player pressed the current scene's confirmation control.
    pub fn confirm(&mut self) {
        match self.scene {
            Scene::Landing => self.enter(Scene::Reaction),
            Scene::Reaction => {
                self.enter(Scene::Game);
                self.session.start(&mut self.scheduler);
            }
            Scene::Game => {
                let waiting_for_retry = self.session.state().status == SessionStatus::Lost
                    && self.session.config().retry == RetryMode::OnConfirm;
                if waiting_for_retry {
                    self.session.restart(&mut self.scheduler);
                }
            }
            Scene::Trust => self.enter_poem(),
            Scene::Poem => {
                if self.poem.phase() == PoemPhase::Ready {
                    self.enter_final();
                }
            }
            Scene::Final => {}
        }
    }

    /// Field-local pointer position. Only moves the catcher during a run.
    pub fn pointer_moved(&mut self, x: f32) {
        if self.scene != Scene::Game {
            return;
        }
        self.session.pointer_moved(x);
    }

    /// Let `elapsed` ms of virtual time pass, firing every task that falls
    /// due in order.
    pub fn advance(&mut self, elapsed: Millis) {
        let target = self.scheduler.now().saturating_add(elapsed);
        while let Some((handle, timer)) = self.scheduler.pop_due(target) {
            self.dispatch(handle, timer);
        }
        self.scheduler.advance_to(target);
    }

    /// Cancel everything outstanding, e.g. before the host exits.
    pub fn shutdown(&mut self) {
        self.session.halt(&mut self.scheduler);
        self.poem.cancel(&mut self.scheduler);
        self.scene_task = None;
        self.scheduler.clear();
    }

    fn dispatch(&mut self, handle: TaskHandle, timer: Timer) {
        match timer {
            Timer::Session(timer) => {
                if self.scene != Scene::Game {
                    warn!("session task {:?} fired outside the game scene", timer);
                    return;
                }
                let outcome =
                    self.session
                        .on_timer(timer, handle, &mut self.scheduler, &mut self.stage);
                if let Some(outcome) = outcome {
                    self.on_outcome(outcome);
                }
            }
            Timer::Poem(timer) => {
                let ready = self
                    .poem
                    .on_timer(timer, handle, &mut self.scheduler, &mut self.stage);
                let finish = self.session.config().poem_finish;
                if ready {
                    match finish {
                        PoemFinish::Auto => self.enter_final(),
                        PoemFinish::OnConfirm => self.stage.offer_next(),
                    }
                }
            }
            scene_timer => {
                if self.scene_task != Some(handle) {
                    warn!("ignoring stale scene task {:?}", scene_timer);
                    return;
                }
                self.scene_task = None;
                match scene_timer {
                    Timer::LeaveGame => self.leave_game(),
                    Timer::RetryGame => self.session.restart(&mut self.scheduler),
                    Timer::LeaveTrust => self.enter_poem(),
                    Timer::Session(_) | Timer::Poem(_) => {}
                }
            }
        }
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => {
                self.stage.celebrate(Burst::WIN);
                let delay = self.session.config().win_transition_delay_ms;
                self.scene_task = Some(self.scheduler.schedule(delay, Timer::LeaveGame));
            }
            Outcome::Lose => {
                let retry = self.session.config().retry;
                if let RetryMode::Auto { delay_ms } = retry {
                    self.scene_task = Some(self.scheduler.schedule(delay_ms, Timer::RetryGame));
                }
            }
        }
    }

    fn leave_game(&mut self) {
        let config = self.session.config();
        let (include_trust, trust_auto) =
            (config.include_trust_scene, config.trust_auto_advance_ms);
        if !include_trust {
            self.enter_poem();
            return;
        }
        self.enter(Scene::Trust);
        if let Some(delay) = trust_auto {
            self.scene_task = Some(self.scheduler.schedule(delay, Timer::LeaveTrust));
        }
    }

    fn enter_poem(&mut self) {
        self.enter(Scene::Poem);
        self.poem.start(&mut self.scheduler);
    }

    fn enter_final(&mut self) {
        self.enter(Scene::Final);
        self.stage.celebrate(Burst::FINALE);
    }

    /// Switch scenes. Whatever the old scene had running is cancelled
    /// before the new one becomes visible.
    fn enter(&mut self, next: Scene) {
        debug_assert!(next > self.scene, "scenes only move forward");
        if let Some(handle) = self.scene_task.take() {
            self.scheduler.cancel(handle);
        }
        match self.scene {
            Scene::Game => self.session.halt(&mut self.scheduler),
            Scene::Poem => self.poem.cancel(&mut self.scheduler),
            _ => {}
        }
        let prev = self.scene;
        self.stage.deactivate(prev);
        self.stage.activate(next);
        self.scene = next;
        info!("scene {:?} -> {:?}", prev, next);
    }
}

use valentine_catch::config::{ConfigError, GameConfig, LossMode};
use valentine_catch::entities::*;
use valentine_catch::scheduler::Scheduler;
use valentine_catch::session::{GameSession, SessionTimer};
use valentine_catch::stage::Renderer;

#[derive(Default)]
struct Frames(Vec<SessionState>);

impl Renderer for Frames {
    fn render(&mut self, state: &SessionState) {
        self.0.push(state.clone());
    }
}

/// No hazards, and items far enough apart that only one falls at a time.
fn config() -> GameConfig {
    GameConfig {
        hazard_probability: 0.0,
        spawn_interval_ms: 3000,
        seed: Some(7),
        ..GameConfig::classic()
    }
}

fn started(config: GameConfig) -> (GameSession, Scheduler<SessionTimer>, Frames) {
    let mut session = GameSession::new(config).unwrap();
    let mut sched = Scheduler::<SessionTimer>::new();
    session.start(&mut sched);
    (session, sched, Frames::default())
}

/// Fire everything due up to `now + ms`, collecting outcomes.
fn pump(
    session: &mut GameSession,
    sched: &mut Scheduler<SessionTimer>,
    frames: &mut Frames,
    ms: u64,
) -> Vec<Outcome> {
    let until = sched.now() + ms;
    let mut outcomes = Vec::new();
    while let Some((handle, timer)) = sched.pop_due(until) {
        if let Some(outcome) = session.on_timer(timer, handle, sched, frames) {
            outcomes.push(outcome);
        }
    }
    sched.advance_to(until);
    outcomes
}

fn lowest_item_centre(state: &SessionState) -> Option<f32> {
    state
        .items
        .iter()
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .map(|item| item.x + item.width / 2.0)
}

// ── construction & start ──────────────────────────────────────────────────────

#[test]
fn new_rejects_invalid_config() {
    let bad = GameConfig { hazard_probability: 1.5, ..config() };
    assert!(matches!(GameSession::new(bad), Err(ConfigError::HazardProbability(_))));
}

#[test]
fn new_session_is_idle() {
    let session = GameSession::new(config()).unwrap();
    assert_eq!(session.state().status, SessionStatus::Idle);
    assert_eq!(session.runs(), 0);
}

#[test]
fn start_activates_and_spawns_first_item() {
    let (session, sched, _) = started(config());
    let s = session.state();
    assert!(s.is_active());
    assert_eq!(s.score, 0);
    assert_eq!(s.items.len(), 1);
    assert_eq!(sched.pending_count(), 2); // frame + spawn
}

#[test]
fn spawns_follow_the_interval() {
    let cfg = GameConfig { spawn_interval_ms: 800, ..config() };
    let (mut session, mut sched, mut frames) = started(cfg);
    pump(&mut session, &mut sched, &mut frames, 799);
    assert_eq!(session.state().items.len(), 1);
    pump(&mut session, &mut sched, &mut frames, 1);
    assert_eq!(session.state().items.len(), 2);
}

#[test]
fn renders_once_per_frame_with_post_update_state() {
    let (mut session, mut sched, mut frames) = started(config());
    pump(&mut session, &mut sched, &mut frames, 160);
    assert_eq!(frames.0.len(), 11); // 0, 16, ..., 160
    assert_eq!(session.state().frame, 11);
    assert_eq!(frames.0.last(), Some(session.state()));
}

// ── restart ───────────────────────────────────────────────────────────────────

#[test]
fn restart_fully_resets() {
    let (mut session, mut sched, mut frames) = started(config());
    session.pointer_moved(0.0);
    pump(&mut session, &mut sched, &mut frames, 500);
    session.restart(&mut sched);
    session.restart(&mut sched);

    let fresh = {
        let mut other = GameSession::new(config()).unwrap();
        let mut other_sched = Scheduler::<SessionTimer>::new();
        other.start(&mut other_sched);
        other.state().clone()
    };
    let s = session.state();
    assert_eq!(s.score, 0);
    assert_eq!(s.frame, 0);
    assert_eq!(s.catcher, fresh.catcher);
    assert_eq!(s.emitter, fresh.emitter);
    assert_eq!(s.items.len(), 1);
    assert_eq!(sched.pending_count(), 2); // old tasks were cancelled
    assert_eq!(session.runs(), 3);
}

// ── stop & halt ───────────────────────────────────────────────────────────────

#[test]
fn stop_mid_session_freezes_state() {
    let (mut session, mut sched, mut frames) = started(config());
    pump(&mut session, &mut sched, &mut frames, 200);
    let outcome = session.stop(&mut sched, Outcome::Lose);
    assert_eq!(outcome, Outcome::Lose);
    assert_eq!(sched.pending_count(), 0);

    let frozen = session.state().clone();
    let rendered = frames.0.len();
    pump(&mut session, &mut sched, &mut frames, 5000);
    assert_eq!(session.state(), &frozen);
    assert_eq!(frames.0.len(), rendered);
    assert_eq!(frozen.status, SessionStatus::Lost);
}

#[test]
fn stale_frame_handle_is_ignored() {
    let mut session = GameSession::new(config()).unwrap();
    let mut sched = Scheduler::<SessionTimer>::new();
    let mut frames = Frames::default();
    session.start(&mut sched);
    let (handle, timer) = sched.pop_due(0).unwrap();
    assert_eq!(timer, SessionTimer::Frame);

    session.stop(&mut sched, Outcome::Win);
    let before = session.state().clone();
    assert_eq!(session.on_frame(handle, &mut sched, &mut frames), None);
    assert_eq!(session.state(), &before);
    assert!(frames.0.is_empty());
    assert_eq!(sched.pending_count(), 0);
}

#[test]
fn halt_returns_to_idle_without_outcome() {
    let (mut session, mut sched, mut frames) = started(config());
    pump(&mut session, &mut sched, &mut frames, 100);
    session.halt(&mut sched);
    assert_eq!(session.state().status, SessionStatus::Idle);
    assert_eq!(sched.pending_count(), 0);
}

// ── input ─────────────────────────────────────────────────────────────────────

#[test]
fn pointer_ignored_before_start() {
    let mut session = GameSession::new(config()).unwrap();
    session.pointer_moved(0.0);
    assert_eq!(session.state().catcher.x, 170.0);
}

#[test]
fn pointer_moves_catcher_while_active() {
    let (mut session, _, _) = started(config());
    session.pointer_moved(0.0);
    assert_eq!(session.state().catcher.x, 0.0);
    session.pointer_moved(10_000.0);
    assert_eq!(session.state().catcher.x, 340.0);
}

#[test]
fn pointer_ignored_after_stop() {
    let (mut session, mut sched, _) = started(config());
    session.stop(&mut sched, Outcome::Lose);
    session.pointer_moved(0.0);
    assert_eq!(session.state().catcher.x, 170.0);
}

// ── whole runs ────────────────────────────────────────────────────────────────

#[test]
fn fifteen_catches_win_with_lives_untouched() {
    let cfg = GameConfig { loss_mode: LossMode::Lives(3), ..config() };
    let (mut session, mut sched, mut frames) = started(cfg);
    let mut outcomes = Vec::new();
    let mut last_score = 0;

    for _ in 0..4000 {
        if let Some(x) = lowest_item_centre(session.state()) {
            session.pointer_moved(x);
        }
        outcomes.extend(pump(&mut session, &mut sched, &mut frames, 16));
        let score = session.state().score;
        assert!(score >= last_score, "score went down");
        last_score = score;
        if !outcomes.is_empty() {
            break;
        }
    }

    assert_eq!(outcomes, vec![Outcome::Win]);
    let s = session.state();
    assert_eq!(s.score, 15);
    assert_eq!(s.lives, Some(3));
    assert_eq!(s.status, SessionStatus::Won);
    assert_eq!(sched.pending_count(), 0);

    // nothing moves after the outcome
    let frozen = s.clone();
    pump(&mut session, &mut sched, &mut frames, 10_000);
    assert_eq!(session.state(), &frozen);
}

#[test]
fn third_miss_loses() {
    let cfg = GameConfig { loss_mode: LossMode::Lives(3), ..config() };
    let (mut session, mut sched, mut frames) = started(cfg);
    let mut lives_seen = vec![Some(3)];

    for _ in 0..4000 {
        // keep the catcher on the far side from the falling item
        if let Some(x) = lowest_item_centre(session.state()) {
            session.pointer_moved(if x < 200.0 { 400.0 } else { 0.0 });
        }
        let outcomes = pump(&mut session, &mut sched, &mut frames, 16);
        let lives = session.state().lives;
        if lives_seen.last() != Some(&lives) {
            lives_seen.push(lives);
        }
        if !outcomes.is_empty() {
            assert_eq!(outcomes, vec![Outcome::Lose]);
            break;
        }
    }

    assert_eq!(lives_seen, vec![Some(3), Some(2), Some(1), Some(0)]);
    assert_eq!(session.state().status, SessionStatus::Lost);
    assert_eq!(session.state().score, 0);
}

#[test]
fn hazard_catch_loses_immediately() {
    let cfg = GameConfig { hazard_probability: 1.0, ..config() };
    let (mut session, mut sched, mut frames) = started(cfg);
    let mut outcomes = Vec::new();
    for _ in 0..500 {
        if let Some(x) = lowest_item_centre(session.state()) {
            session.pointer_moved(x);
        }
        outcomes.extend(pump(&mut session, &mut sched, &mut frames, 16));
        if !outcomes.is_empty() {
            break;
        }
    }
    assert_eq!(outcomes, vec![Outcome::Lose]);
    assert_eq!(session.state().score, 0);
    assert!(session.state().items.is_empty());
}

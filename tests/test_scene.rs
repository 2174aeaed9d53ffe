use std::collections::BTreeSet;

use valentine_catch::config::{GameConfig, PoemFinish, RetryMode};
use valentine_catch::entities::{SessionState, SessionStatus};
use valentine_catch::scene::{Scene, Valentine};
use valentine_catch::stage::{Burst, Celebration, PoemView, Renderer, SceneContainer};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Activate(Scene),
    Deactivate(Scene),
}

/// Records every callback and checks the single-visible-scene rule as it goes.
#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    visible: BTreeSet<Scene>,
    frames: usize,
    bursts: Vec<Burst>,
    lines: Vec<String>,
    complete: bool,
    offered: bool,
}

impl SceneContainer for Recorder {
    fn activate(&mut self, scene: Scene) {
        self.visible.insert(scene);
        assert_eq!(self.visible.len(), 1, "two scenes visible: {:?}", self.visible);
        self.calls.push(Call::Activate(scene));
    }

    fn deactivate(&mut self, scene: Scene) {
        assert!(self.visible.remove(&scene), "{:?} was not visible", scene);
        self.calls.push(Call::Deactivate(scene));
    }
}

impl Renderer for Recorder {
    fn render(&mut self, _state: &SessionState) {
        self.frames += 1;
    }
}

impl Celebration for Recorder {
    fn celebrate(&mut self, burst: Burst) {
        self.bursts.push(burst);
    }
}

impl PoemView for Recorder {
    fn reveal_line(&mut self, index: usize, line: &str) {
        assert_eq!(index, self.lines.len(), "lines revealed out of order");
        self.lines.push(line.to_string());
    }

    fn reveal_complete(&mut self) {
        self.complete = true;
    }

    fn offer_next(&mut self) {
        self.offered = true;
    }
}

fn config() -> GameConfig {
    GameConfig {
        hazard_probability: 0.0,
        win_threshold: 2,
        spawn_interval_ms: 3000,
        poem: vec!["roses".into(), "violets".into(), "you".into()],
        poem_line_delay_ms: 100,
        poem_trailing_delay_ms: 50,
        seed: Some(11),
        ..GameConfig::classic()
    }
}

fn app(config: GameConfig) -> Valentine<Recorder> {
    Valentine::new(config, Recorder::default()).unwrap()
}

fn to_game(app: &mut Valentine<Recorder>) {
    app.confirm();
    app.confirm();
    assert_eq!(app.scene(), Scene::Game);
}

/// Chase items in 16 ms steps until the run ends.
fn play_until_over(app: &mut Valentine<Recorder>, catch: bool) {
    for _ in 0..10_000 {
        let state = app.session().state();
        if !state.is_active() {
            return;
        }
        let lowest = state
            .items
            .iter()
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .map(|item| item.x + item.width / 2.0);
        if let Some(x) = lowest {
            let target = if catch {
                x
            } else if x < 200.0 {
                400.0
            } else {
                0.0
            };
            app.pointer_moved(target);
        }
        app.advance(16);
    }
    panic!("run never ended");
}

// ── construction ──────────────────────────────────────────────────────────────

#[test]
fn starts_on_landing() {
    let app = app(config());
    assert_eq!(app.scene(), Scene::Landing);
    assert_eq!(app.stage().calls, vec![Call::Activate(Scene::Landing)]);
    assert_eq!(app.pending_tasks(), 0);
}

#[test]
fn invalid_config_is_rejected() {
    let bad = GameConfig { win_threshold: 0, ..config() };
    assert!(Valentine::new(bad, Recorder::default()).is_err());
}

// ── user-driven transitions ──────────────────────────────────────────────────

#[test]
fn confirm_walks_landing_to_game() {
    let mut app = app(config());
    app.confirm();
    assert_eq!(app.scene(), Scene::Reaction);
    assert!(!app.session().is_active());
    app.confirm();
    assert_eq!(app.scene(), Scene::Game);
    assert!(app.session().is_active());
    assert_eq!(
        app.stage().calls,
        vec![
            Call::Activate(Scene::Landing),
            Call::Deactivate(Scene::Landing),
            Call::Activate(Scene::Reaction),
            Call::Deactivate(Scene::Reaction),
            Call::Activate(Scene::Game),
        ]
    );
}

#[test]
fn pointer_ignored_outside_game() {
    let mut app = app(config());
    app.pointer_moved(0.0);
    app.confirm();
    app.pointer_moved(0.0);
    assert_eq!(app.session().state().catcher.x, 170.0);
}

#[test]
fn confirm_during_a_run_does_nothing() {
    let mut app = app(config());
    to_game(&mut app);
    app.advance(100);
    app.confirm();
    assert_eq!(app.session().runs(), 1);
    assert!(app.session().is_active());
}

// ── win ───────────────────────────────────────────────────────────────────────

#[test]
fn win_celebrates_then_moves_to_trust_after_delay() {
    let mut app = app(config());
    to_game(&mut app);
    play_until_over(&mut app, true);

    assert_eq!(app.session().state().status, SessionStatus::Won);
    assert_eq!(app.stage().bursts, vec![Burst::WIN]);
    assert_eq!(app.scene(), Scene::Game);

    // The leave-game timer is due 1000 ms after the winning frame, which
    // happened within the last 16 ms step.
    app.advance(1000 - 16);
    assert_eq!(app.scene(), Scene::Game);
    app.advance(16);
    assert_eq!(app.scene(), Scene::Trust);
    assert_eq!(app.pending_tasks(), 0);
}

#[test]
fn win_skips_trust_when_disabled() {
    let mut app = app(GameConfig { include_trust_scene: false, ..config() });
    to_game(&mut app);
    play_until_over(&mut app, true);
    app.advance(1000);
    assert_eq!(app.scene(), Scene::Poem);
    assert_eq!(app.stage().lines, vec!["roses".to_string()]);
}

#[test]
fn trust_advances_on_its_own_when_configured() {
    let mut app = app(GameConfig { trust_auto_advance_ms: Some(2000), ..config() });
    to_game(&mut app);
    play_until_over(&mut app, true);
    app.advance(1000);
    assert_eq!(app.scene(), Scene::Trust);
    app.advance(1999);
    assert_eq!(app.scene(), Scene::Trust);
    app.advance(1);
    assert_eq!(app.scene(), Scene::Poem);
}

#[test]
fn confirming_trust_cancels_its_timer() {
    let mut app = app(GameConfig { trust_auto_advance_ms: Some(2000), ..config() });
    to_game(&mut app);
    play_until_over(&mut app, true);
    app.advance(1000);
    app.confirm();
    assert_eq!(app.scene(), Scene::Poem);
    // only the poem's own task is left
    assert_eq!(app.pending_tasks(), 1);
}

// ── lose ──────────────────────────────────────────────────────────────────────

#[test]
fn lose_waits_for_retry_confirmation() {
    let mut app = app(GameConfig { hazard_probability: 1.0, ..config() });
    to_game(&mut app);
    play_until_over(&mut app, true);

    assert_eq!(app.session().state().status, SessionStatus::Lost);
    assert_eq!(app.pending_tasks(), 0);
    app.advance(10_000);
    assert_eq!(app.scene(), Scene::Game);
    assert_eq!(app.session().runs(), 1);

    app.confirm();
    assert_eq!(app.scene(), Scene::Game);
    assert_eq!(app.session().runs(), 2);
    assert!(app.session().is_active());
    assert_eq!(app.session().state().score, 0);
    assert!(app.stage().bursts.is_empty());
}

#[test]
fn lose_restarts_automatically_after_delay() {
    let cfg = GameConfig {
        hazard_probability: 1.0,
        retry: RetryMode::Auto { delay_ms: 1500 },
        ..config()
    };
    let mut app = app(cfg);
    to_game(&mut app);
    play_until_over(&mut app, true);
    assert_eq!(app.session().state().status, SessionStatus::Lost);

    app.advance(1499);
    assert_eq!(app.session().runs(), 1);
    app.advance(1);
    assert_eq!(app.session().runs(), 2);
    assert!(app.session().is_active());
    assert_eq!(app.scene(), Scene::Game);
}

#[test]
fn lives_mode_loses_on_misses() {
    let cfg = GameConfig {
        loss_mode: valentine_catch::config::LossMode::Lives(3),
        ..config()
    };
    let mut app = app(cfg);
    to_game(&mut app);
    play_until_over(&mut app, false);
    let s = app.session().state();
    assert_eq!(s.status, SessionStatus::Lost);
    assert_eq!(s.lives, Some(0));
}

// ── poem & final ──────────────────────────────────────────────────────────────

fn to_poem(app: &mut Valentine<Recorder>) {
    to_game(app);
    play_until_over(app, true);
    app.advance(1000);
    app.confirm();
    assert_eq!(app.scene(), Scene::Poem);
}

#[test]
fn poem_reveals_one_line_per_delay() {
    let mut app = app(config());
    to_poem(&mut app);
    app.advance(0);
    assert_eq!(app.stage().lines.len(), 1);
    app.advance(99);
    assert_eq!(app.stage().lines.len(), 1);
    app.advance(1);
    assert_eq!(app.stage().lines.len(), 2);
    app.advance(100);
    assert_eq!(app.stage().lines, vec!["roses", "violets", "you"]);
    assert!(!app.stage().complete);
    app.advance(100);
    assert!(app.stage().complete);
}

#[test]
fn poem_needs_confirmation_once_ready() {
    let mut app = app(config());
    to_poem(&mut app);
    // lines at 0, 100, 200; complete at 300; next offered at 350
    app.advance(300);
    assert!(app.stage().complete);
    app.confirm();
    assert_eq!(app.scene(), Scene::Poem);
    app.advance(50);
    assert!(app.stage().offered);
    app.advance(5000);
    assert_eq!(app.scene(), Scene::Poem);

    app.confirm();
    assert_eq!(app.scene(), Scene::Final);
    assert_eq!(app.stage().bursts, vec![Burst::WIN, Burst::FINALE]);
    assert_eq!(app.pending_tasks(), 0);
}

#[test]
fn poem_finishes_on_its_own_when_configured() {
    let mut app = app(GameConfig { poem_finish: PoemFinish::Auto, ..config() });
    to_poem(&mut app);
    app.advance(349);
    assert_eq!(app.scene(), Scene::Poem);
    app.advance(1);
    assert_eq!(app.scene(), Scene::Final);
    assert!(!app.stage().offered);
}

#[test]
fn full_walk_visits_every_scene_once() {
    let mut app = app(GameConfig { poem_finish: PoemFinish::Auto, ..config() });
    to_poem(&mut app);
    app.advance(1000);
    let activated: Vec<Scene> = app
        .stage()
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Activate(s) => Some(*s),
            Call::Deactivate(_) => None,
        })
        .collect();
    assert_eq!(
        activated,
        vec![
            Scene::Landing,
            Scene::Reaction,
            Scene::Game,
            Scene::Trust,
            Scene::Poem,
            Scene::Final
        ]
    );
    // every deactivate is immediately followed by the next activate
    for pair in app.stage().calls[1..].chunks(2) {
        assert!(matches!(pair, [Call::Deactivate(_), Call::Activate(_)]), "{:?}", pair);
    }
}

// ── shutdown ──────────────────────────────────────────────────────────────────

#[test]
fn shutdown_mid_game_stops_everything() {
    let mut app = app(config());
    to_game(&mut app);
    app.advance(200);
    app.shutdown();
    assert_eq!(app.pending_tasks(), 0);
    assert_eq!(app.session().state().status, SessionStatus::Idle);

    let frames = app.stage().frames;
    let frozen = app.session().state().clone();
    app.advance(5000);
    assert_eq!(app.stage().frames, frames);
    assert_eq!(app.session().state(), &frozen);
}

#[test]
fn advancing_past_the_end_of_the_clock_saturates() {
    let mut app = app(config());
    app.advance(5);
    app.advance(u64::MAX);
    assert_eq!(app.now(), u64::MAX);
    assert_eq!(app.scene(), Scene::Landing);
}

#[test]
fn longest_allowed_retry_delay_still_restarts() {
    let cfg = GameConfig {
        hazard_probability: 1.0,
        retry: RetryMode::Auto { delay_ms: valentine_catch::config::MAX_DELAY_MS },
        ..config()
    };
    let mut app = app(cfg);
    to_game(&mut app);
    play_until_over(&mut app, true);
    assert_eq!(app.session().state().status, SessionStatus::Lost);

    app.advance(valentine_catch::config::MAX_DELAY_MS);
    assert_eq!(app.session().runs(), 2);
    assert!(app.session().is_active());
}

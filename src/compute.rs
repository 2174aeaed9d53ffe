/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `SessionState` (plus the config and, where needed, an RNG handle) and
/// returns a brand-new `SessionState`. Side effects are limited to the
/// injected RNG.

use rand::Rng;

use crate::config::{
    GameConfig, CATCHER_BOTTOM_OFFSET, CATCHER_SIZE, EMITTER_SIZE, EMITTER_SPEED, EMITTER_TOP,
    ITEM_SIZE,
};
use crate::entities::{
    Catcher, Emitter, FallingItem, Field, ItemKind, Outcome, SessionState, SessionStatus,
};

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the state of a fresh, not yet started session.
pub fn init_state(config: &GameConfig) -> SessionState {
    let field = config.field;
    SessionState {
        field,
        catcher: Catcher {
            x: field.width / 2.0 - CATCHER_SIZE / 2.0,
            y: field.height - CATCHER_BOTTOM_OFFSET,
            width: CATCHER_SIZE,
            height: CATCHER_SIZE,
        },
        emitter: Emitter {
            x: 0.0,
            y: EMITTER_TOP,
            width: EMITTER_SIZE,
            height: EMITTER_SIZE,
            speed: EMITTER_SPEED,
            direction: 1.0,
        },
        items: Vec::new(),
        score: 0,
        lives: config.initial_lives(),
        status: SessionStatus::Idle,
        frame: 0,
    }
}

// ── Entity rules ─────────────────────────────────────────────────────────────

/// Place the catcher's left edge at `x`, clamped into the field.
pub fn clamp_catcher_x(catcher: &Catcher, field: &Field, x: f32) -> Catcher {
    let max_x = (field.width - catcher.width).max(0.0);
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, max_x) };
    Catcher { x, ..catcher.clone() }
}

/// Move the emitter one frame, turning it around once it is past an edge.
pub fn step_emitter(emitter: &Emitter, field: &Field) -> Emitter {
    let x = emitter.x + emitter.speed * emitter.direction;
    let direction = if x + emitter.width > field.width || x < 0.0 {
        -emitter.direction
    } else {
        emitter.direction
    };
    Emitter {
        x,
        direction,
        ..emitter.clone()
    }
}

/// Strict axis-aligned overlap; touching edges do not count.
pub fn overlaps(item: &FallingItem, catcher: &Catcher) -> bool {
    item.x < catcher.x + catcher.width
        && item.x + item.width > catcher.x
        && item.y < catcher.y + catcher.height
        && item.y + item.height > catcher.y
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Centre the catcher under a field-local pointer coordinate.
pub fn move_catcher(state: &SessionState, pointer_x: f32) -> SessionState {
    if !state.is_active() {
        return state.clone();
    }
    let catcher = clamp_catcher_x(
        &state.catcher,
        &state.field,
        pointer_x - state.catcher.width / 2.0,
    );
    SessionState {
        catcher,
        ..state.clone()
    }
}

// ── Spawner ──────────────────────────────────────────────────────────────────

/// Drop one new item from the emitter's current position.
pub fn spawn_item(state: &SessionState, config: &GameConfig, rng: &mut impl Rng) -> SessionState {
    if !state.is_active() {
        return state.clone();
    }
    let kind = if rng.gen_bool(config.hazard_probability) {
        ItemKind::Hazard
    } else {
        ItemKind::Benign
    };
    let item = FallingItem {
        kind,
        x: state.emitter.x + state.emitter.width / 4.0,
        y: state.emitter.y + state.emitter.height,
        width: ITEM_SIZE,
        height: ITEM_SIZE,
        speed: rng.gen_range(config.item_speed_min..config.item_speed_max),
    };
    let mut items = state.items.clone();
    items.push(item);
    SessionState {
        items,
        ..state.clone()
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the session by one frame.
///
/// Returns the new state and, when the frame ended the session, its
/// outcome. Once an outcome fires the remaining items are left exactly as
/// they were after falling this frame; they are neither scored nor missed.
/// The status is left `Active`; stopping is the controller's job.
pub fn tick(state: &SessionState, config: &GameConfig) -> (SessionState, Option<Outcome>) {
    if !state.is_active() {
        return (state.clone(), None);
    }

    // ── 1. Emitter ───────────────────────────────────────────────────────────
    let emitter = step_emitter(&state.emitter, &state.field);

    // ── 2. Items fall ────────────────────────────────────────────────────────
    let fallen: Vec<FallingItem> = state
        .items
        .iter()
        .map(|item| FallingItem {
            y: item.y + item.speed,
            ..item.clone()
        })
        .collect();

    // ── 3. Catches & misses, stopping at the first outcome ───────────────────
    let mut score = state.score;
    let mut lives = state.lives;
    let mut outcome = None;
    let mut items = Vec::with_capacity(fallen.len());
    let mut remaining = fallen.into_iter();

    for item in remaining.by_ref() {
        if overlaps(&item, &state.catcher) {
            match item.kind {
                ItemKind::Hazard => {
                    outcome = Some(Outcome::Lose);
                    break;
                }
                ItemKind::Benign => {
                    score += 1;
                    if score >= config.win_threshold {
                        outcome = Some(Outcome::Win);
                        break;
                    }
                }
            }
        } else if item.y > state.field.height {
            if let Some(left) = lives.as_mut() {
                *left = left.saturating_sub(1);
                if *left == 0 {
                    outcome = Some(Outcome::Lose);
                    break;
                }
            }
        } else {
            items.push(item);
        }
    }
    items.extend(remaining);

    let next = SessionState {
        emitter,
        items,
        score,
        lives,
        frame: state.frame + 1,
        ..state.clone()
    };
    (next, outcome)
}

/// All game entity types: pure data, no logic.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// Worth one point when caught.
    Benign,
    /// Ends the session when caught.
    Hazard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Active,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

// ── Play field ────────────────────────────────────────────────────────────────

/// Dimensions of the play field in field units (400×500 by default).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

// ── Catcher, emitter & items ──────────────────────────────────────────────────

/// The player-controlled bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct Catcher {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The boss sprite bouncing along the top edge. Items drop from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Emitter {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Horizontal distance per frame, always positive.
    pub speed: f32,
    /// +1.0 moving right, -1.0 moving left.
    pub direction: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FallingItem {
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Downward distance per frame, sampled once at spawn.
    pub speed: f32,
}

// ── Session state ─────────────────────────────────────────────────────────────

/// Everything one run of the catch game owns. Cloneable so the pure update
/// functions in `compute` can hand back a new copy.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub field: Field,
    pub catcher: Catcher,
    pub emitter: Emitter,
    /// Live falling items. Order carries no meaning.
    pub items: Vec<FallingItem>,
    pub score: u32,
    /// Remaining lives; `None` unless the lives loss mode is configured.
    pub lives: Option<u32>,
    pub status: SessionStatus,
    pub frame: u64,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

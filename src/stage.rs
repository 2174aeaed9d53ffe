/// Collaborators the core drives but does not implement: drawing, scene
/// visibility, confetti and the poem text. The terminal front-end
/// implements all of them; tests use a recorder.

use crate::entities::SessionState;
use crate::scene::Scene;

/// Draws the game field. Called once per accepted frame with the
/// post-update state.
pub trait Renderer {
    fn render(&mut self, state: &SessionState);
}

/// Marks one named scene visible at a time.
pub trait SceneContainer {
    fn activate(&mut self, scene: Scene);
    fn deactivate(&mut self, scene: Scene);
}

/// Parameters of a confetti-style burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burst {
    pub particles: u32,
    /// Cone width in degrees.
    pub spread: f32,
    /// Vertical origin as a fraction of the screen height.
    pub origin_y: f32,
}

impl Burst {
    pub const WIN: Burst = Burst {
        particles: 150,
        spread: 70.0,
        origin_y: 0.6,
    };
    pub const FINALE: Burst = Burst {
        particles: 200,
        spread: 100.0,
        origin_y: 0.6,
    };
}

/// Fire-and-forget celebration.
pub trait Celebration {
    fn celebrate(&mut self, burst: Burst);
}

pub trait PoemView {
    fn reveal_line(&mut self, index: usize, line: &str);
    /// Every line is visible and the last line's delay has elapsed.
    fn reveal_complete(&mut self) {}
    /// The control leading to the final scene may be shown.
    fn offer_next(&mut self) {}
}

/// Everything the scene machine needs from its host.
pub trait Stage: Renderer + SceneContainer + Celebration + PoemView {}

impl<T: Renderer + SceneContainer + Celebration + PoemView> Stage for T {}

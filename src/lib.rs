/// Core of the valentine catch game: a virtual clock, the catch-game
/// session and the scene sequence wrapped around it. Nothing in here
/// touches the terminal; the binary supplies a [`stage::Stage`].

pub mod compute;
pub mod config;
pub mod entities;
pub mod evasive;
pub mod poem;
pub mod scene;
pub mod scheduler;
pub mod session;
pub mod stage;

/// Rendering layer: all terminal I/O lives here.
///
/// `TerminalStage` receives the core's callbacks and keeps just enough to
/// draw (active scene, last rendered frame, revealed poem lines, confetti).
/// `render` then turns that into terminal commands once per host frame.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use rand::Rng;
use valentine_catch::config::{GameConfig, RetryMode};
use valentine_catch::entities::{FallingItem, ItemKind, SessionState, SessionStatus};
use valentine_catch::evasive::{Dodge, Rect};
use valentine_catch::scene::{Scene, Valentine};
use valentine_catch::stage::{Burst, Celebration, PoemView, Renderer, SceneContainer};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkMagenta;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_TITLE: Color = Color::Magenta;
const C_TEXT: Color = Color::White;
const C_BUTTON_YES: Color = Color::Green;
const C_BUTTON_NO: Color = Color::Red;
const C_CATCHER: Color = Color::Cyan;
const C_EMITTER: Color = Color::Yellow;
const C_ITEM_BENIGN: Color = Color::DarkYellow;
const C_ITEM_HAZARD: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;
const CONFETTI_COLORS: [Color; 5] = [
    Color::Red,
    Color::Magenta,
    Color::Yellow,
    Color::Cyan,
    Color::White,
];

/// Beyond this many lives the HUD shows a count instead of hearts.
const MAX_HEARTS: u32 = 5;

const YES_LABEL: &str = "[ Yes ]";
const NO_LABEL: &str = "[ No ]";

pub const NO_BUTTON_DODGE: Dodge = Dodge {
    trigger_radius: 8.0,
    step: 5.0,
    margin: 1.0,
};

// ── Confetti ──────────────────────────────────────────────────────────────────

struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    life: u32,
    color: Color,
}

#[derive(Default)]
pub struct Confetti {
    particles: Vec<Particle>,
}

impl Confetti {
    /// Terminal cells are coarse, so one drawn particle stands for ten.
    fn burst(&mut self, burst: Burst, size: (u16, u16)) {
        let mut rng = rand::thread_rng();
        let origin_x = size.0 as f32 / 2.0;
        let origin_y = size.1 as f32 * burst.origin_y;
        let half_spread = burst.spread.to_radians() / 2.0;
        for _ in 0..(burst.particles / 10).max(1) {
            // Straight up is -90°; scatter within the spread cone around it.
            let angle = -std::f32::consts::FRAC_PI_2 + rng.gen_range(-half_spread..=half_spread);
            let speed = rng.gen_range(0.8..2.2);
            self.particles.push(Particle {
                x: origin_x,
                y: origin_y,
                vx: angle.cos() * speed * 2.0, // cells are twice as tall as wide
                vy: angle.sin() * speed,
                life: rng.gen_range(15..35),
                color: CONFETTI_COLORS[rng.gen_range(0..CONFETTI_COLORS.len())],
            });
        }
    }

    /// Advance one host frame: move, apply gravity, drop expired particles.
    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.vy += 0.15;
            p.vx *= 0.96;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }
}

// ── Stage ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct TerminalStage {
    pub size: (u16, u16),
    active: Option<Scene>,
    frame: Option<SessionState>,
    poem_lines: Vec<String>,
    poem_complete: bool,
    next_offered: bool,
    pub confetti: Confetti,
    no_button: Option<Rect>,
}

impl TerminalStage {
    pub fn new(size: (u16, u16)) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn yes_button(&self) -> Rect {
        let (w, h) = self.size;
        Rect {
            x: (w / 2).saturating_sub(YES_LABEL.len() as u16 + 2) as f32,
            y: (h / 2 + 1) as f32,
            width: YES_LABEL.len() as f32,
            height: 1.0,
        }
    }

    pub fn no_button(&self) -> Rect {
        self.no_button.unwrap_or_else(|| {
            let (w, h) = self.size;
            Rect {
                x: (w / 2 + 2) as f32,
                y: (h / 2 + 1) as f32,
                width: NO_LABEL.len() as f32,
                height: 1.0,
            }
        })
    }

    /// Let the "No" button run from a pointer at (`col`, `row`).
    pub fn dodge(&mut self, col: u16, row: u16) {
        let viewport = (self.size.0 as f32, self.size.1 as f32);
        let pointer = (col as f32, row as f32);
        if let Some(rect) = NO_BUTTON_DODGE.flee(self.no_button(), pointer, viewport) {
            self.no_button = Some(rect);
        }
    }

    /// Field-local x for a terminal column inside the game border.
    pub fn column_to_field_x(&self, col: u16, field_width: f32) -> f32 {
        let inner = self.size.0.saturating_sub(2).max(1) as f32;
        (col.saturating_sub(1) as f32 / inner) * field_width
    }
}

impl Renderer for TerminalStage {
    fn render(&mut self, state: &SessionState) {
        self.frame = Some(state.clone());
    }
}

impl SceneContainer for TerminalStage {
    fn activate(&mut self, scene: Scene) {
        self.active = Some(scene);
        if scene == Scene::Poem {
            self.poem_lines.clear();
            self.poem_complete = false;
            self.next_offered = false;
        }
    }

    fn deactivate(&mut self, scene: Scene) {
        if self.active == Some(scene) {
            self.active = None;
        }
    }
}

impl Celebration for TerminalStage {
    fn celebrate(&mut self, burst: Burst) {
        let size = self.size;
        self.confetti.burst(burst, size);
    }
}

impl PoemView for TerminalStage {
    fn reveal_line(&mut self, _index: usize, line: &str) {
        self.poem_lines.push(line.to_string());
    }

    fn reveal_complete(&mut self) {
        self.poem_complete = true;
    }

    fn offer_next(&mut self) {
        self.next_offered = true;
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete host frame.
pub fn render<W: Write>(out: &mut W, app: &Valentine<TerminalStage>) -> std::io::Result<()> {
    let stage = app.stage();
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    match stage.active {
        Some(Scene::Landing) => draw_landing(out, stage)?,
        Some(Scene::Reaction) => draw_reaction(out, stage)?,
        Some(Scene::Game) => draw_game(out, stage, app.session().config())?,
        Some(Scene::Trust) => draw_trust(out, stage)?,
        Some(Scene::Poem) => draw_poem(out, stage)?,
        Some(Scene::Final) => draw_final(out, stage)?,
        None => {}
    }
    draw_confetti(out, stage)?;

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, stage.size.1.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn centered<W: Write>(
    out: &mut W,
    width: u16,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_hint<W: Write>(out: &mut W, stage: &TerminalStage, hint: &str) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, stage.size.1.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Scenes ────────────────────────────────────────────────────────────────────

fn draw_landing<W: Write>(out: &mut W, stage: &TerminalStage) -> std::io::Result<()> {
    let (w, h) = stage.size;
    centered(out, w, (h / 2).saturating_sub(3), "♥  Will you be my Valentine?  ♥", C_TITLE)?;

    let yes = stage.yes_button();
    out.queue(cursor::MoveTo(yes.x as u16, yes.y as u16))?;
    out.queue(style::SetForegroundColor(C_BUTTON_YES))?;
    out.queue(Print(YES_LABEL))?;

    let no = stage.no_button();
    out.queue(cursor::MoveTo(no.x as u16, no.y as u16))?;
    out.queue(style::SetForegroundColor(C_BUTTON_NO))?;
    out.queue(Print(NO_LABEL))?;

    draw_hint(out, stage, "Enter / Y / click Yes : Yes   Q : Quit")
}

fn draw_reaction<W: Write>(out: &mut W, stage: &TerminalStage) -> std::io::Result<()> {
    let (w, h) = stage.size;
    centered(out, w, (h / 2).saturating_sub(2), "Yaaay!  ♥ ♥ ♥", C_TITLE)?;
    centered(out, w, h / 2, "I knew you would say yes.", C_TEXT)?;
    centered(out, w, h / 2 + 2, "But first, a little game...", C_HINT)?;
    draw_hint(out, stage, "Enter : Next   Q : Quit")
}

fn draw_trust<W: Write>(out: &mut W, stage: &TerminalStage) -> std::io::Result<()> {
    let (w, h) = stage.size;
    centered(out, w, (h / 2).saturating_sub(2), "You caught them all!", C_TITLE)?;
    centered(out, w, h / 2, "Thank you for trusting me with your heart.", C_TEXT)?;
    draw_hint(out, stage, "Enter : Next   Q : Quit")
}

fn draw_poem<W: Write>(out: &mut W, stage: &TerminalStage) -> std::io::Result<()> {
    let (w, h) = stage.size;
    // Keep the newest lines on screen, scrolling older ones off the top.
    let rows = h.saturating_sub(4) as usize;
    let skip = stage.poem_lines.len().saturating_sub(rows);
    for (i, line) in stage.poem_lines.iter().skip(skip).enumerate() {
        centered(out, w, 1 + i as u16, line, C_TEXT)?;
    }
    if stage.next_offered {
        centered(out, w, h.saturating_sub(2), "[ Next ▸ ]", C_BUTTON_YES)?;
        draw_hint(out, stage, "Enter : Next   Q : Quit")?;
    } else if !stage.poem_complete {
        draw_hint(out, stage, "Q : Quit")?;
    }
    Ok(())
}

fn draw_final<W: Write>(out: &mut W, stage: &TerminalStage) -> std::io::Result<()> {
    let (w, h) = stage.size;
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════════════════╗", C_TITLE),
        ("║   Happy Valentine's Day! ♥   ║", C_TITLE),
        ("╚══════════════════════════════╝", C_TITLE),
    ];
    let start_row = (h / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        centered(out, w, start_row + i as u16, msg, *color)?;
    }
    draw_hint(out, stage, "Q : Quit")
}

// ── Game ──────────────────────────────────────────────────────────────────────

/// Maps field units onto the cells inside the border.
struct Projection {
    cols: f32,
    rows: f32,
    sx: f32,
    sy: f32,
}

impl Projection {
    fn new(stage: &TerminalStage, state: &SessionState) -> Self {
        let cols = stage.size.0.saturating_sub(2).max(1) as f32;
        let rows = stage.size.1.saturating_sub(4).max(1) as f32;
        Self {
            cols,
            rows,
            sx: cols / state.field.width,
            sy: rows / state.field.height,
        }
    }

    /// Top-left cell of a field-space point, or `None` when off the field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = (x * self.sx).floor();
        let row = (y * self.sy).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols || row >= self.rows {
            return None;
        }
        Some((1 + col as u16, 2 + row as u16))
    }
}

fn draw_game<W: Write>(
    out: &mut W,
    stage: &TerminalStage,
    config: &GameConfig,
) -> std::io::Result<()> {
    draw_border(out, stage)?;
    let Some(state) = stage.frame.as_ref() else {
        return draw_hint(out, stage, "Move: mouse / ← → / A D   Q : Quit");
    };
    let proj = Projection::new(stage, state);

    draw_hud(out, stage, state, config)?;

    if let Some((col, row)) = proj.cell(state.emitter.x, state.emitter.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_EMITTER))?;
        out.queue(Print("=^.^="))?;
    }
    for item in &state.items {
        draw_item(out, &proj, item)?;
    }
    if let Some((col, row)) = proj.cell(state.catcher.x, state.catcher.y) {
        let width = ((state.catcher.width * proj.sx).round() as usize).max(3);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_CATCHER))?;
        out.queue(Print(format!("\\{}/", "_".repeat(width - 2))))?;
    }

    match state.status {
        SessionStatus::Lost => draw_game_over(out, stage, config)?,
        SessionStatus::Won => draw_banner(out, stage, "♥  YOU WIN  ♥", Color::Green, "")?,
        _ => {}
    }
    draw_hint(out, stage, "Move: mouse / ← → / A D   Q : Quit")
}

fn draw_border<W: Write>(out: &mut W, stage: &TerminalStage) -> std::io::Result<()> {
    let (w, h) = stage.size;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2) as usize))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2) as usize))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(w.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

fn draw_hud<W: Write>(
    out: &mut W,
    stage: &TerminalStage,
    state: &SessionState,
    config: &GameConfig,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Caught: {:>2} / {}",
        state.score, config.win_threshold
    )))?;

    if let Some(lives) = state.lives {
        let lives_str = if lives <= MAX_HEARTS {
            format!("Lives:{}", "♥".repeat(lives as usize))
        } else {
            format!("Lives:♥×{}", lives)
        };
        let col = stage
            .size
            .0
            .saturating_sub(lives_str.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(col, 0))?;
        out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
        out.queue(Print(&lives_str))?;
    }
    Ok(())
}

fn draw_item<W: Write>(out: &mut W, proj: &Projection, item: &FallingItem) -> std::io::Result<()> {
    let Some((col, row)) = proj.cell(item.x, item.y) else {
        return Ok(());
    };
    out.queue(cursor::MoveTo(col, row))?;
    match item.kind {
        ItemKind::Benign => {
            out.queue(style::SetForegroundColor(C_ITEM_BENIGN))?;
            out.queue(Print("●"))?;
        }
        ItemKind::Hazard => {
            out.queue(style::SetForegroundColor(C_ITEM_HAZARD))?;
            out.queue(Print("✹"))?;
        }
    }
    Ok(())
}

fn draw_game_over<W: Write>(
    out: &mut W,
    stage: &TerminalStage,
    config: &GameConfig,
) -> std::io::Result<()> {
    let hint = match config.retry {
        RetryMode::OnConfirm => "Enter / R : Try Again   Q : Quit",
        RetryMode::Auto { .. } => "Restarting...",
    };
    draw_banner(out, stage, "   OOPS!  GAME  OVER  ", Color::Red, hint)
}

fn draw_banner<W: Write>(
    out: &mut W,
    stage: &TerminalStage,
    title: &str,
    color: Color,
    hint: &str,
) -> std::io::Result<()> {
    let (w, h) = stage.size;
    let inner = title.chars().count();
    let top = format!("╔{}╗", "═".repeat(inner));
    let mid = format!("║{}║", title);
    let bottom = format!("╚{}╝", "═".repeat(inner));
    let start_row = (h / 2).saturating_sub(2);
    for (i, line) in [top, mid, bottom].iter().enumerate() {
        centered(out, w, start_row + i as u16, line, color)?;
    }
    if !hint.is_empty() {
        centered(out, w, start_row + 3, hint, C_TEXT)?;
    }
    Ok(())
}

fn draw_confetti<W: Write>(out: &mut W, stage: &TerminalStage) -> std::io::Result<()> {
    let (w, h) = stage.size;
    for p in &stage.confetti.particles {
        if p.x < 0.0 || p.y < 0.0 || p.x >= w as f32 || p.y >= h as f32 {
            continue;
        }
        out.queue(cursor::MoveTo(p.x as u16, p.y as u16))?;
        out.queue(style::SetForegroundColor(p.color))?;
        out.queue(Print(if p.life > 8 { "✦" } else { "·" }))?;
    }
    Ok(())
}

mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal, ExecutableCommand,
};
use log::info;

use display::TerminalStage;
use valentine_catch::config::{
    GameConfig, LossMode, PoemFinish, RetryMode, MAX_DELAY_MS, MAX_LIVES,
};
use valentine_catch::scene::{Scene, Valentine};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Field units the catcher moves per arrow-key press.
const KEY_STEP: f32 = 25.0;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Preset {
    /// Hazards end the game, 15 catches to win, manual retry.
    Classic,
    /// No hazards, 3 lives, 10 catches to win, automatic retry.
    Hard,
}

/// A terminal valentine with a little catch game inside.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Rule set to start from; the options below override it.
    #[arg(long, value_enum, default_value_t = Preset::Classic)]
    preset: Preset,
    /// Chance that a dropped item is a hazard (0..=1).
    #[arg(long, value_name = "P")]
    hazard_probability: Option<f64>,
    /// Catches needed to win.
    #[arg(long, value_name = "COUNT")]
    win_threshold: Option<u32>,
    /// Lose a life per missed item, starting with this many.
    #[arg(
        long,
        value_name = "COUNT",
        value_parser = clap::value_parser!(u32).range(1..=MAX_LIVES as i64)
    )]
    lives: Option<u32>,
    /// Skip the trust scene between the game and the poem.
    #[arg(long)]
    no_trust: bool,
    /// Leave the trust scene on its own after this long.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        value_parser = clap::value_parser!(u64).range(..=MAX_DELAY_MS)
    )]
    trust_auto_ms: Option<u64>,
    /// Restart automatically this long after a loss instead of waiting.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        value_parser = clap::value_parser!(u64).range(..=MAX_DELAY_MS)
    )]
    auto_retry_ms: Option<u64>,
    /// Delay between poem lines.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        value_parser = clap::value_parser!(u64).range(1..=MAX_DELAY_MS)
    )]
    poem_line_delay_ms: Option<u64>,
    /// Go to the final scene as soon as the poem is done.
    #[arg(long)]
    poem_auto_finish: bool,
    /// Text file with one poem line per line.
    #[arg(long, value_name = "PATH")]
    poem: Option<PathBuf>,
    /// Seed for item spawning.
    #[arg(long)]
    seed: Option<u64>,
    /// Write logs here (filter with RUST_LOG).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<GameConfig> {
        let mut config = match self.preset {
            Preset::Classic => GameConfig::classic(),
            Preset::Hard => GameConfig::hard(),
        };
        if let Some(p) = self.hazard_probability {
            config.hazard_probability = p;
        }
        if let Some(n) = self.win_threshold {
            config.win_threshold = n;
        }
        if let Some(n) = self.lives {
            config.loss_mode = LossMode::Lives(n);
        }
        if self.no_trust {
            config.include_trust_scene = false;
        }
        if self.trust_auto_ms.is_some() {
            config.trust_auto_advance_ms = self.trust_auto_ms;
        }
        if let Some(delay_ms) = self.auto_retry_ms {
            config.retry = RetryMode::Auto { delay_ms };
        }
        if let Some(ms) = self.poem_line_delay_ms {
            config.poem_line_delay_ms = ms;
        }
        if self.poem_auto_finish {
            config.poem_finish = PoemFinish::Auto;
        }
        if let Some(path) = &self.poem {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading poem from {}", path.display()))?;
            config.poem = text.lines().map(|line| line.trim_end().to_string()).collect();
        }
        config.seed = self.seed.or(config.seed);
        config.validate().context("invalid game configuration")?;
        Ok(config)
    }
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    // The terminal is in raw alternate-screen mode, so logs only go to a file.
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Input ─────────────────────────────────────────────────────────────────────

enum Flow {
    Continue,
    Quit,
}

struct Controls {
    /// Last field-local pointer x, shared by mouse and keyboard.
    pointer_x: f32,
}

impl Controls {
    fn handle(&mut self, app: &mut Valentine<TerminalStage>, ev: Event) -> Flow {
        match ev {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                modifiers,
                ..
            }) => self.key(app, code, modifiers),
            Event::Mouse(mouse) => {
                self.mouse(app, mouse);
                Flow::Continue
            }
            Event::Resize(w, h) => {
                app.stage_mut().size = (w, h);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn key(
        &mut self,
        app: &mut Valentine<TerminalStage>,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Flow {
        let field_width = app.session().config().field.width;
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Flow::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => app.confirm(),
            KeyCode::Char('y') | KeyCode::Char('Y') if app.scene() == Scene::Landing => {
                app.confirm()
            }
            KeyCode::Char('r') | KeyCode::Char('R') if app.scene() == Scene::Game => app.confirm(),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.pointer_x = (self.pointer_x - KEY_STEP).max(0.0);
                app.pointer_moved(self.pointer_x);
            }
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                self.pointer_x = (self.pointer_x + KEY_STEP).min(field_width);
                app.pointer_moved(self.pointer_x);
            }
            _ => {}
        }
        Flow::Continue
    }

    fn mouse(&mut self, app: &mut Valentine<TerminalStage>, mouse: MouseEvent) {
        let MouseEvent { kind, column, row, .. } = mouse;
        match (app.scene(), kind) {
            (Scene::Landing, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
                app.stage_mut().dodge(column, row);
            }
            (Scene::Landing, MouseEventKind::Down(MouseButton::Left)) => {
                let yes = app.stage().yes_button();
                let inside = (column as f32) >= yes.x
                    && (column as f32) < yes.x + yes.width
                    && row as f32 == yes.y;
                if inside {
                    app.confirm();
                }
            }
            (Scene::Game, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
                let field_width = app.session().config().field.width;
                self.pointer_x = app.stage().column_to_field_x(column, field_width);
                app.pointer_moved(self.pointer_x);
            }
            (_, MouseEventKind::Down(MouseButton::Left)) => app.confirm(),
            _ => {}
        }
    }
}

// ── Main loop ─────────────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, config: GameConfig) -> Result<()> {
    let size = terminal::size()?;
    let mut controls = Controls {
        pointer_x: config.field.width / 2.0,
    };
    let mut app = Valentine::new(config, TerminalStage::new(size))?;
    let clock = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            if let Flow::Quit = controls.handle(&mut app, ev) {
                app.shutdown();
                info!("quit from {:?}", app.scene());
                return Ok(());
            }
        }

        // ── Catch the virtual clock up with real time ─────────────────────────
        let now = clock.elapsed().as_millis() as u64;
        app.advance(now.saturating_sub(app.now()));

        app.stage_mut().confetti.step();
        display::render(out, &app)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;
    let config = cli.into_config()?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(EnableMouseCapture)?;
    out.execute(cursor::Hide)?;

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the main loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped: program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, config);

    // Always restore the terminal
    let _ = out.execute(cursor::Show);
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

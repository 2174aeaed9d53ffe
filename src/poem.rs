/// Line-by-line poem reveal.
///
/// Line `i` appears at `i * line_delay`. The reveal is complete one more
/// `line_delay` after the last line, and ready to move on `trailing`
/// milliseconds after that.

use log::debug;

use crate::scheduler::{Millis, Scheduler, TaskHandle};
use crate::stage::PoemView;

const DEFAULT_POEM: &[&str] = &[
    "You laugh at every terrible joke I make,",
    "doubled over, crying, loud enough",
    "that the neighbours start to worry.",
    " ",
    "Seeing you laugh like that",
    "beats winning the lottery,",
    "not that I have ever won the lottery,",
    "but I am fairly sure this is how it feels.",
    " ",
    "You tease me every single day,",
    "you say I dress like somebody's uncle,",
    "then quietly eat all of my snacks",
    "and call it looking after my health.",
    " ",
    "We have held on across the distance",
    "for so long that my phone is full",
    "of midnight video call screenshots.",
    " ",
    "So I will keep making you laugh,",
    "with bad jokes and clumsy dances,",
    "even if the joke is always me.",
    " ",
    "Happy Valentine's Day! ❤",
];

pub fn default_poem() -> Vec<String> {
    DEFAULT_POEM.iter().map(|line| line.to_string()).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoemTimer {
    Line(usize),
    Complete,
    Trailing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoemPhase {
    Idle,
    Revealing,
    /// All lines shown and the last line's delay has elapsed.
    Complete,
    /// The trailing delay has elapsed too.
    Ready,
}

pub struct PoemReveal {
    lines: Vec<String>,
    line_delay: Millis,
    trailing: Millis,
    shown: usize,
    phase: PoemPhase,
    task: Option<TaskHandle>,
}

impl PoemReveal {
    pub fn new(lines: Vec<String>, line_delay: Millis, trailing: Millis) -> Self {
        Self {
            lines,
            line_delay,
            trailing,
            shown: 0,
            phase: PoemPhase::Idle,
            task: None,
        }
    }

    pub fn phase(&self) -> PoemPhase {
        self.phase
    }

    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn start<T: From<PoemTimer>>(&mut self, sched: &mut Scheduler<T>) {
        self.cancel(sched);
        self.shown = 0;
        self.phase = PoemPhase::Revealing;
        self.task = Some(sched.schedule(0, PoemTimer::Line(0).into()));
    }

    pub fn cancel<T>(&mut self, sched: &mut Scheduler<T>) {
        if let Some(handle) = self.task.take() {
            sched.cancel(handle);
        }
    }

    /// Handle a fired reveal task. Returns `true` when the reveal has just
    /// become ready.
    pub fn on_timer<T: From<PoemTimer>, V: PoemView + ?Sized>(
        &mut self,
        timer: PoemTimer,
        handle: TaskHandle,
        sched: &mut Scheduler<T>,
        view: &mut V,
    ) -> bool {
        if self.task != Some(handle) {
            return false;
        }
        self.task = None;
        match timer {
            PoemTimer::Line(index) => {
                if let Some(line) = self.lines.get(index) {
                    view.reveal_line(index, line);
                    self.shown = index + 1;
                }
                let next = if self.shown < self.lines.len() {
                    PoemTimer::Line(self.shown)
                } else {
                    PoemTimer::Complete
                };
                self.task = Some(sched.schedule(self.line_delay, next.into()));
                false
            }
            PoemTimer::Complete => {
                debug!("poem reveal complete after {} lines", self.shown);
                self.phase = PoemPhase::Complete;
                view.reveal_complete();
                self.task = Some(sched.schedule(self.trailing, PoemTimer::Trailing.into()));
                false
            }
            PoemTimer::Trailing => {
                self.phase = PoemPhase::Ready;
                true
            }
        }
    }
}

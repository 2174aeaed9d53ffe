/// Virtual clock with fire-once, cancellable tasks.
///
/// Nothing runs on its own: the owner asks for the next due task with
/// [`Scheduler::pop_due`] and dispatches it, so every callback executes on
/// the caller's thread. Periodic work reschedules itself from inside its
/// handler, which is why cancelling a handle is enough to stop it for good.

/// Milliseconds on the virtual clock.
pub type Millis = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TaskHandle,
    due: Millis,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Millis,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Queue `task` to fire `delay` ms from now.
    pub fn schedule(&mut self, delay: Millis, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due: self.now.saturating_add(delay),
            task,
        });
        handle
    }

    /// Drop a pending task. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.pending.iter().position(|p| p.handle == handle) {
            Some(i) => {
                self.pending.swap_remove(i);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the earliest task due at or before `until`,
    /// moving the clock to its due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TaskHandle, T)> {
        let i = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| (p.due, p.handle))
            .map(|(i, _)| i)?;
        let p = self.pending.swap_remove(i);
        self.now = self.now.max(p.due);
        Some((p.handle, p.task))
    }

    /// Move the clock forward without firing anything. Call after draining
    /// `pop_due` so the next delays are measured from `to`.
    pub fn advance_to(&mut self, to: Millis) {
        self.now = self.now.max(to);
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

//! Fixed-rate task queue.
//!
//! Tasks are small units of work outside the entity/component model that
//! still want deterministic timing: timers, staged spawning, tweens. The
//! scheduler drives the queue once per fixed-rate drain; a task runs every
//! drain until it reports itself finished, at which point it is dropped
//! from the queue.

use parking_lot::Mutex;

/// A unit of work driven once per fixed-rate pass until finished.
pub trait Task: Send {
    /// Whether this task is done. A finished task is removed without
    /// another [`execute`](Task::execute) call.
    fn is_finished(&self) -> bool;

    /// Run one fixed-rate slice of the work.
    fn execute(&mut self, fixed_delta_seconds: f32);
}

/// Queue of fixed-rate [`Task`]s, shared via the engine.
///
/// Pushing is allowed from any thread and from inside a running task; tasks
/// pushed mid-drain are queued behind the survivors and first run on the
/// next drain.
#[derive(Default)]
pub struct TaskQueue {
    tasks: Mutex<Vec<Box<dyn Task>>>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a task.
    pub fn push(&self, task: impl Task + 'static) {
        self.tasks.lock().push(Box::new(task));
    }

    /// Number of queued tasks, finished ones included until the next drain.
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether no tasks are queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Run one fixed-rate drain: drop finished tasks, execute the rest.
    ///
    /// The queue is detached from the lock while tasks run, so a task may
    /// push without deadlocking.
    pub(crate) fn drive(&self, fixed_delta_seconds: f32) {
        let mut current = std::mem::take(&mut *self.tasks.lock());
        current.retain_mut(|task| {
            if task.is_finished() {
                return false;
            }
            task.execute(fixed_delta_seconds);
            true
        });

        let mut tasks = self.tasks.lock();
        let pushed_meanwhile = std::mem::take(&mut *tasks);
        *tasks = current;
        tasks.extend(pushed_meanwhile);
    }
}

//! Callback queues standing for execution contexts.
//!
//! A [`Looper`] is the sending half: cloning it keeps the context alive.
//! The [`LooperRunner`] is the receiving half, driven by whoever owns the
//! context. A call enqueued with a callback remembers its origin looper
//! weakly and posts the terminal callback there once it completes.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tracing::warn;

/// Unit of work posted to a looper.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle posting tasks to one execution context.
#[derive(Clone)]
pub struct Looper {
    name: Arc<str>,
    sender: UnboundedSender<Task>,
}

impl fmt::Debug for Looper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Looper").field("name", &self.name).finish()
    }
}

impl Looper {
    /// Create a looper and the runner that executes its tasks.
    #[must_use]
    pub fn new(name: impl Into<String>) -> (Self, LooperRunner) {
        let name: Arc<str> = Arc::from(name.into());
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                name: name.clone(),
                sender,
            },
            LooperRunner { name, receiver },
        )
    }

    /// Looper name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Post a task. Returns `false` if the runner is gone.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.try_post(Box::new(task)).is_ok()
    }

    fn try_post(&self, task: Task) -> Result<(), Task> {
        self.sender.send(task).map_err(|e| e.0)
    }

    pub(crate) fn downgrade(&self) -> WeakLooper {
        WeakLooper {
            name: self.name.clone(),
            sender: self.sender.downgrade(),
        }
    }
}

/// Receiving half of a [`Looper`].
pub struct LooperRunner {
    name: Arc<str>,
    receiver: UnboundedReceiver<Task>,
}

impl fmt::Debug for LooperRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LooperRunner")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl LooperRunner {
    /// Run tasks until every [`Looper`] handle is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.receiver.recv().await {
            task();
        }
    }

    /// Wait for the next task and run it. Returns `false` once every handle
    /// is dropped and the queue is drained.
    pub async fn run_one(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run every task already queued, without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            count += 1;
        }
        count
    }
}

/// Weak reference to an origin looper.
#[derive(Clone)]
pub(crate) struct WeakLooper {
    name: Arc<str>,
    sender: WeakUnboundedSender<Task>,
}

impl WeakLooper {
    fn upgrade(&self) -> Option<Looper> {
        self.sender.upgrade().map(|sender| Looper {
            name: self.name.clone(),
            sender,
        })
    }
}

/// Post `task` to `origin`, or to `main` when the origin context is gone.
pub(crate) fn post_or_fallback(origin: &WeakLooper, main: &Looper, task: Task) {
    let task = match origin.upgrade() {
        Some(looper) => match looper.try_post(task) {
            Ok(()) => return,
            Err(task) => task,
        },
        None => task,
    };

    warn!(
        origin = %origin.name,
        main = main.name(),
        "origin looper is gone, delivering callback on the main looper"
    );
    if main.try_post(task).is_err() {
        warn!(main = main.name(), "main looper is gone, dropping callback");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Task) {
        let hits = Arc::new(AtomicUsize::new(0));
        let make = {
            let hits = hits.clone();
            move || -> Task {
                let hits = hits.clone();
                Box::new(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                })
            }
        };
        (hits, make)
    }

    #[test]
    fn posted_tasks_run_on_the_runner() {
        let (looper, mut runner) = Looper::new("ui");
        let (hits, task) = counter();

        check_post(&looper, task());
        check_post(&looper, task());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(runner.run_pending(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    fn check_post(looper: &Looper, task: Task) {
        assert!(looper.try_post(task).is_ok());
    }

    #[test]
    fn post_fails_without_runner() {
        let (looper, runner) = Looper::new("gone");
        drop(runner);
        assert!(!looper.post(|| {}));
    }

    #[test]
    fn fallback_when_origin_handles_are_dropped() {
        let (origin, mut origin_runner) = Looper::new("worker");
        let (main, mut main_runner) = Looper::new("main");
        let (hits, task) = counter();

        let weak = origin.downgrade();
        drop(origin);
        post_or_fallback(&weak, &main, task());

        assert_eq!(origin_runner.run_pending(), 0);
        assert_eq!(main_runner.run_pending(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fallback_when_origin_runner_is_dropped() {
        let (origin, origin_runner) = Looper::new("worker");
        let (main, mut main_runner) = Looper::new("main");
        let (hits, task) = counter();

        drop(origin_runner);
        post_or_fallback(&origin.downgrade(), &main, task());

        assert_eq!(main_runner.run_pending(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn origin_alive_gets_the_task() {
        let (origin, mut origin_runner) = Looper::new("worker");
        let (main, mut main_runner) = Looper::new("main");
        let (hits, task) = counter();

        post_or_fallback(&origin.downgrade(), &main, task());

        assert_eq!(origin_runner.run_pending(), 1);
        assert_eq!(main_runner.run_pending(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

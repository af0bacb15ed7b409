//! Collaborator interfaces of the edit engine.
//!
//! The engine has no ambient dependencies: everything it needs from the host
//! (render invalidation, persistence, user-facing warnings, syntax highlight
//! refresh, timers) arrives through these traits at construction time. Every
//! trait method has a no-op default so hosts implement only what they consume,
//! and tests can plug in recording stubs.

use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Keeps cached per-row render state aligned with the buffer.
pub trait RenderSink: Send + Sync {
    /// Rows whose content changed and must be repainted.
    fn invalidate_rows(&self, _rows: Range<usize>) {}
    /// `count` blank rows were inserted at `at`.
    fn insert_rows(&self, _at: usize, _count: usize) {}
    /// `count` rows were removed at `at`.
    fn remove_rows(&self, _at: usize, _count: usize) {}
}

/// The backing resource. `content_changed` receives the flattened document
/// after each debounce drain, not per keystroke.
pub trait PersistenceSink: Send + Sync {
    fn is_writable(&self) -> bool {
        true
    }
    fn content_changed(&self, _content: &str) {}
}

/// User-facing warnings.
pub trait NotificationSink: Send + Sync {
    fn not_writable(&self) {}
}

/// Syntax-highlight refresh point. Invoked once per drained edit burst with
/// the touched row range; the implementation is entirely the host's.
pub trait Highlighter: Send + Sync {
    fn invalidate(&self, _rows: Range<usize>) {}
}

struct NoopHook;

impl RenderSink for NoopHook {}
impl PersistenceSink for NoopHook {}
impl NotificationSink for NoopHook {}
impl Highlighter for NoopHook {}

/// Bundle of engine collaborators, all defaulting to no-ops.
#[derive(Clone)]
pub struct EditHooks {
    pub render: Arc<dyn RenderSink>,
    pub persistence: Arc<dyn PersistenceSink>,
    pub notifications: Arc<dyn NotificationSink>,
    pub highlighter: Arc<dyn Highlighter>,
}

impl Default for EditHooks {
    fn default() -> Self {
        let noop = Arc::new(NoopHook);
        Self {
            render: noop.clone(),
            persistence: noop.clone(),
            notifications: noop.clone(),
            highlighter: noop,
        }
    }
}

/// Fire-and-forget timer used to arm the debounce window. The engine never
/// cancels a scheduled task; superseded firings elect themselves out via the
/// in-flight counter instead.
pub trait DebounceScheduler: Send + Sync {
    fn schedule(&self, after: Duration, task: Box<dyn FnOnce() + Send>);
}

/// Default scheduler: one short-lived thread per armed window. Windows are
/// hundreds of milliseconds and arm once per edit, so thread churn is
/// negligible next to the edit itself.
#[derive(Debug, Default)]
pub struct ThreadScheduler;

impl DebounceScheduler for ThreadScheduler {
    fn schedule(&self, after: Duration, task: Box<dyn FnOnce() + Send>) {
        std::thread::spawn(move || {
            std::thread::sleep(after);
            task();
        });
    }
}

/// Test scheduler: collects tasks and runs them only when told to, so
/// debounce behavior is deterministic regardless of wall-clock timing.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Run every collected task in scheduling order.
    pub fn fire_all(&self) {
        let tasks: Vec<_> = self.lock().drain(..).collect();
        for task in tasks {
            task();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn FnOnce() + Send>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DebounceScheduler for ManualScheduler {
    fn schedule(&self, _after: Duration, task: Box<dyn FnOnce() + Send>) {
        self.lock().push(task);
    }
}

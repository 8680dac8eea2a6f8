//! Priority event queues
//!
//! One queue core serves two roles. The **external** flavor is contended
//! by arbitrary producer threads and takes a mutual-exclusion lock around
//! every operation; it signals its owning listener with the queue size so
//! a dispatch loop knows when to wake and when to suspend. The
//! **internal** flavor belongs to a single thread, takes no lock, and its
//! listener step is a no-op by design.
//!
//! Ordering: the urgent classes (`Critical` and above) preempt everything
//! below them at insertion; the regular classes dispatch in arrival order.
//! Within one priority class FIFO order is always preserved. Pushes from
//! different producer threads are ordered by lock acquisition, nothing
//! more.

use crate::event::{Event, EventKind};
use core_types::EventPriority;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Observer signaled with the queue size after each size-changing operation
pub trait QueueListener: Send + Sync {
    /// Called with the queue size after a push, an emptying pop, or a drain
    fn on_queue_changed(&self, size: usize);
}

/// Listener whose signal step does nothing
///
/// Exists so the same queue core can serve the internal, single-thread
/// role where no wakeup is needed.
#[derive(Debug, Default)]
pub struct NullListener;

impl QueueListener for NullListener {
    fn on_queue_changed(&self, _size: usize) {}
}

/// Condvar-backed listener a dispatch loop blocks on
///
/// Tracks the last signaled size; `wait_non_empty` suspends the caller
/// until the owning queue reports a non-zero size.
#[derive(Debug, Default)]
pub struct QueueSignal {
    size: Mutex<usize>,
    condvar: Condvar,
}

impl QueueSignal {
    /// Creates a signal reporting an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last signaled size
    pub fn last_size(&self) -> usize {
        *self.size.lock().unwrap()
    }

    /// Blocks until the queue reports a non-zero size
    pub fn wait_non_empty(&self) {
        let mut size = self.size.lock().unwrap();
        while *size == 0 {
            size = self.condvar.wait(size).unwrap();
        }
    }

    /// Blocks until non-empty or until `timeout` elapses
    ///
    /// Returns whether the queue reported non-empty.
    pub fn wait_non_empty_timeout(&self, timeout: Duration) -> bool {
        let mut size = self.size.lock().unwrap();
        while *size == 0 {
            let (guard, result) = self.condvar.wait_timeout(size, timeout).unwrap();
            size = guard;
            if result.timed_out() {
                return *size > 0;
            }
        }
        true
    }
}

impl QueueListener for QueueSignal {
    fn on_queue_changed(&self, new_size: usize) {
        *self.size.lock().unwrap() = new_size;
        self.condvar.notify_all();
    }
}

/// Ordered holding structure shared by both queue flavors
#[derive(Debug, Default)]
struct QueueCore {
    events: VecDeque<Event>,
}

impl QueueCore {
    /// Inserts an event according to its priority class
    ///
    /// Urgent events (`Critical` and `System`) are placed before the first
    /// event of strictly lower priority; everything else is appended.
    /// Equal-priority events keep arrival order.
    fn insert(&mut self, event: Event) {
        let priority = event.priority();
        let mut position = self.events.len();
        if priority >= EventPriority::Critical {
            for (index, existing) in self.events.iter().enumerate() {
                if existing.priority() < priority {
                    position = index;
                    break;
                }
            }
        }
        self.events.insert(position, event);
    }

    fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    fn len(&self) -> usize {
        self.events.len()
    }

    /// Drains the queue; with `keep_specials`, system-class events survive
    /// in their original relative order. Returns the number removed.
    fn drain(&mut self, keep_specials: bool) -> usize {
        let before = self.events.len();
        if keep_specials {
            self.events
                .retain(|event| event.priority() == EventPriority::System);
        } else {
            self.events.clear();
        }
        before - self.events.len()
    }

    /// Removes events of one kind, preserving the order of the kept ones.
    /// Returns the number removed.
    fn remove_kind(&mut self, kind: EventKind) -> usize {
        let before = self.events.len();
        self.events.retain(|event| event.kind() != kind);
        before - self.events.len()
    }
}

/// Thread-safe queue contended by arbitrary producer threads
///
/// The lock guards one logical operation at a time and is never held
/// across the listener callback.
pub struct ExternalEventQueue {
    core: Mutex<QueueCore>,
    listener: Arc<dyn QueueListener>,
}

impl ExternalEventQueue {
    /// Creates a queue signaling `listener`
    pub fn new(listener: Arc<dyn QueueListener>) -> Self {
        Self {
            core: Mutex::new(QueueCore::default()),
            listener,
        }
    }

    /// Inserts an event by priority and signals the new queue size
    pub fn push(&self, event: Event) {
        let size = {
            let mut core = self.core.lock().unwrap();
            core.insert(event);
            core.len()
        };
        self.listener.on_queue_changed(size);
    }

    /// Removes the next event in dispatch order
    ///
    /// Signals size 0 when the queue is empty afterwards; this is the
    /// dispatch loop's suspension signal.
    pub fn pop(&self) -> Option<Event> {
        let (event, size) = {
            let mut core = self.core.lock().unwrap();
            let event = core.pop();
            (event, core.len())
        };
        if size == 0 {
            self.listener.on_queue_changed(0);
        }
        event
    }

    /// Returns the number of queued events
    pub fn len(&self) -> usize {
        self.core.lock().unwrap().len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the queue, optionally keeping the system-class events.
    /// Signals the post-drain size and returns the number removed.
    pub fn remove_events(&self, keep_specials: bool) -> usize {
        let (removed, size) = {
            let mut core = self.core.lock().unwrap();
            let removed = core.drain(keep_specials);
            (removed, core.len())
        };
        self.listener.on_queue_changed(size);
        removed
    }

    /// Removes all events of `kind`, preserving the order of the rest.
    /// Signals the new size and returns the number removed.
    pub fn remove_events_of_kind(&self, kind: EventKind) -> usize {
        let (removed, size) = {
            let mut core = self.core.lock().unwrap();
            let removed = core.remove_kind(kind);
            (removed, core.len())
        };
        self.listener.on_queue_changed(size);
        removed
    }
}

/// Single-thread queue for same-thread notification fan-out
///
/// No lock, no signaling; the owning dispatch loop drains it between
/// external waits.
#[derive(Debug, Default)]
pub struct InternalEventQueue {
    core: QueueCore,
}

impl InternalEventQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an event by priority
    pub fn push(&mut self, event: Event) {
        self.core.insert(event);
    }

    /// Removes the next event in dispatch order
    pub fn pop(&mut self) -> Option<Event> {
        self.core.pop()
    }

    /// Returns the number of queued events
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.core.len() == 0
    }

    /// Drains the queue, optionally keeping the system-class events
    pub fn remove_events(&mut self, keep_specials: bool) -> usize {
        self.core.drain(keep_specials)
    }

    /// Removes all events of `kind`, preserving the order of the rest
    pub fn remove_events_of_kind(&mut self, kind: EventKind) -> usize {
        self.core.remove_kind(kind)
    }
}

//! Dispatch loops
//!
//! One dispatch loop runs per logical thread of execution. It owns
//! exactly one external event queue (and the signal it suspends on) and
//! zero-or-one internal queue for same-thread notification fan-out.
//! Concurrency is actor-style message passing between queues; the loop
//! blocks only while its external queue is empty, never on I/O.

use crate::correlator::ResponseCorrelator;
use crate::protocol::{DispatchProtocol, EndpointHandler, EventSink};
use crate::table::MessageClass;
use events::{Event, ExternalEventQueue, InternalEventQueue, QueueSignal};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on one idle wait; a size signal that raced past an empty
/// pop is recovered at the next recheck.
const IDLE_RECHECK: Duration = Duration::from_millis(100);

/// Outcome of processing one queue slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStep {
    /// One event was dispatched
    Processed,
    /// Both queues were empty
    Idle,
    /// The exit event was popped; the loop must stop
    ExitRequested,
}

/// Event pump for one thread's endpoint and proxy state
pub struct DispatchLoop {
    external: Arc<ExternalEventQueue>,
    signal: Arc<QueueSignal>,
    internal: Option<InternalEventQueue>,
}

impl DispatchLoop {
    /// Creates a loop over an external queue and the signal it waits on
    ///
    /// The signal must be the queue's registered listener.
    pub fn new(external: Arc<ExternalEventQueue>, signal: Arc<QueueSignal>) -> Self {
        Self {
            external,
            signal,
            internal: None,
        }
    }

    /// Attaches an internal queue for same-thread fan-out
    pub fn with_internal(mut self, internal: InternalEventQueue) -> Self {
        self.internal = Some(internal);
        self
    }

    /// Returns the external queue
    pub fn external(&self) -> &Arc<ExternalEventQueue> {
        &self.external
    }

    /// Returns the internal queue, if attached
    pub fn internal_mut(&mut self) -> Option<&mut InternalEventQueue> {
        self.internal.as_mut()
    }

    /// Pops and dispatches one event
    ///
    /// The internal queue is drained before the external queue is
    /// consulted. Request events are routed by their table class to the
    /// request or attribute entry point; responses and connection
    /// notifications go to the correlator.
    pub fn step<S: EventSink, H: EndpointHandler>(
        &mut self,
        endpoint: &mut DispatchProtocol<S, H>,
        correlator: &mut ResponseCorrelator,
    ) -> LoopStep {
        let event = match self.internal.as_mut().and_then(InternalEventQueue::pop) {
            Some(event) => Some(event),
            None => self.external.pop(),
        };

        match event {
            None => LoopStep::Idle,
            Some(Event::Exit) => LoopStep::ExitRequested,
            Some(Event::Request(request)) => {
                match endpoint.message_class(request.message_id) {
                    Some(MessageClass::Attribute) => endpoint.process_attribute_event(request),
                    _ => endpoint.process_request_event(request),
                }
                LoopStep::Processed
            }
            Some(Event::Response(response)) => {
                correlator.accept(response);
                LoopStep::Processed
            }
            Some(Event::ConnectNotify(notify)) => {
                if !notify.connected {
                    correlator.connection_lost();
                }
                LoopStep::Processed
            }
        }
    }

    /// Runs until the exit event is dispatched
    ///
    /// Suspends on the queue signal whenever both queues are empty. The
    /// wait is bounded by [`IDLE_RECHECK`]: signals are emitted outside
    /// the queue lock, so a wakeup can race past an empty pop.
    pub fn run<S: EventSink, H: EndpointHandler>(
        &mut self,
        endpoint: &mut DispatchProtocol<S, H>,
        correlator: &mut ResponseCorrelator,
    ) {
        loop {
            match self.step(endpoint, correlator) {
                LoopStep::Processed => {}
                LoopStep::Idle => {
                    self.signal.wait_non_empty_timeout(IDLE_RECHECK);
                }
                LoopStep::ExitRequested => break,
            }
        }
    }
}

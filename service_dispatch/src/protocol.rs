//! Dispatch protocol
//!
//! The state machine a service endpoint runs to turn queued request and
//! attribute events into responses: it gates and cancels in-flight
//! requests by sequence number, tracks per-attribute validity, and turns
//! one logical failure into the correct result code for every interested
//! caller.
//!
//! The business handler and the outbound event path are trait seams; the
//! protocol itself never blocks and never touches another thread's state.

use crate::attribute::{AttributeState, AttributeStates};
use crate::diagnostics::ProtocolEvent;
use crate::error::HandlerError;
use crate::registry::ListenerRegistry;
use crate::table::{MessageClass, MessageTable};
use core_types::{EndpointAddress, MessageId, ProxyAddress, ResultCode};
use events::{RequestEvent, ResponseEvent};
use marshal::EventDataStream;

/// Wire op requesting an attribute subscription
pub const START_NOTIFY_OP: u8 = 1;

/// Wire op dropping an attribute subscription
pub const STOP_NOTIFY_OP: u8 = 0;

/// Outbound path for response events
///
/// Implemented by the caller's queue locally, or by the transport layer
/// when the response leaves the process.
pub trait EventSink {
    /// Ships a response event towards its target proxy
    fn send_response(&mut self, event: ResponseEvent);
}

/// Business logic of one service endpoint
pub trait EndpointHandler {
    /// Executes a request, optionally producing a response payload
    ///
    /// Arguments are decoded from `data` at its read cursor, one call per
    /// argument in declaration order.
    fn handle_request(
        &mut self,
        message_id: MessageId,
        data: &mut EventDataStream,
    ) -> Result<Option<EventDataStream>, HandlerError>;

    /// Recomputes an attribute's current value and marshals it
    fn marshal_attribute(
        &mut self,
        attribute_id: MessageId,
    ) -> Result<EventDataStream, HandlerError>;
}

/// Verdict of the request-admission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may execute
    Execute,
    /// The request was superseded; its caller has been answered with
    /// a canceled result
    RejectCanceled,
}

/// Per-endpoint dispatch state machine
pub struct DispatchProtocol<S, H> {
    address: EndpointAddress,
    table: MessageTable,
    registry: ListenerRegistry,
    attributes: AttributeStates,
    current_request: Option<(MessageId, ProxyAddress)>,
    diagnostics: Vec<ProtocolEvent>,
    sink: S,
    handler: H,
}

impl<S: EventSink, H: EndpointHandler> DispatchProtocol<S, H> {
    /// Creates the protocol for one endpoint instance
    ///
    /// Every attribute in the table starts `Unavailable`.
    pub fn new(address: EndpointAddress, table: MessageTable, sink: S, handler: H) -> Self {
        let attributes = AttributeStates::new(table.attribute_ids());
        Self {
            address,
            table,
            registry: ListenerRegistry::new(),
            attributes,
            current_request: None,
            diagnostics: Vec::new(),
            sink,
            handler,
        }
    }

    /// Returns the endpoint's address
    pub fn address(&self) -> EndpointAddress {
        self.address
    }

    /// Looks up the classification of a message id
    pub fn message_class(&self, id: MessageId) -> Option<MessageClass> {
        self.table.classify(id)
    }

    /// Returns the validity state of an attribute
    pub fn attribute_state(&self, id: MessageId) -> Option<AttributeState> {
        self.attributes.state(id)
    }

    /// Returns the listener registry
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Returns the outbound sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the outbound sink mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Returns the business handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the business handler mutably
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Returns the recorded diagnostics
    pub fn diagnostics(&self) -> &[ProtocolEvent] {
        &self.diagnostics
    }

    /// Clears the diagnostics log
    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    /// Registers `source` for notifications on `message_id`
    ///
    /// A duplicate registration is tolerated and recorded, never doubled.
    pub fn request_start_notify(
        &mut self,
        message_id: MessageId,
        source: ProxyAddress,
        sequence_nr: u32,
    ) {
        if !self.registry.start_notify(message_id, source, sequence_nr) {
            self.diagnostics
                .push(ProtocolEvent::DuplicateSubscription { message_id, source });
        }
    }

    /// Drops `source`'s registration for `message_id`
    pub fn request_stop_notify(&mut self, message_id: MessageId, source: ProxyAddress) -> bool {
        self.registry.stop_notify(message_id, source)
    }

    /// Drops every registration held by `source`
    ///
    /// Returns the ids actually removed, for side-table cleanup.
    pub fn remove_all_listeners(&mut self, source: ProxyAddress) -> Vec<MessageId> {
        self.registry.remove_all(source)
    }

    /// Request-admission gate for exclusive, single-in-flight calls
    ///
    /// Admits the request unless a newer sequence number for the same
    /// (response id, source) pair is already in flight. Whichever side is
    /// superseded receives a definite canceled result; it is never
    /// silently dropped. A same-sequence collision admits the
    /// later-arriving request and records the anomaly.
    pub fn can_execute_request(
        &mut self,
        source: ProxyAddress,
        response_id: MessageId,
        sequence_nr: u32,
    ) -> Admission {
        let existing = match self.registry.sequence_of(response_id, source) {
            None => {
                self.registry.start_notify(response_id, source, sequence_nr);
                return Admission::Execute;
            }
            Some(existing) => existing,
        };

        if existing < sequence_nr {
            self.diagnostics.push(ProtocolEvent::SupersededRequest {
                response_id,
                source,
                old_sequence_nr: existing,
                new_sequence_nr: sequence_nr,
            });
            self.send_result(source, response_id, ResultCode::RequestCanceled, existing);
            self.registry.set_sequence(response_id, source, sequence_nr);
            Admission::Execute
        } else if existing > sequence_nr {
            self.diagnostics.push(ProtocolEvent::StaleRequestRejected {
                response_id,
                source,
                sequence_nr,
            });
            self.send_result(source, response_id, ResultCode::RequestCanceled, sequence_nr);
            Admission::RejectCanceled
        } else {
            self.diagnostics.push(ProtocolEvent::SameSequenceAnomaly {
                response_id,
                source,
                sequence_nr,
            });
            Admission::Execute
        }
    }

    /// Releases the handler-side exclusivity mark
    ///
    /// Called on every exit path of the event entry points, so the gate
    /// can never be left permanently busy.
    pub fn cancel_current_request(&mut self) {
        if let Some((response_id, source)) = self.current_request.take() {
            self.registry.stop_notify(response_id, source);
        }
    }

    /// Entry point for queued request events
    pub fn process_request_event(&mut self, mut event: RequestEvent) {
        match self.table.classify(event.message_id) {
            Some(MessageClass::Request {
                response_id: Some(response_id),
            }) => {
                match self.can_execute_request(event.source, response_id, event.sequence_nr) {
                    Admission::Execute => {
                        self.current_request = Some((response_id, event.source));
                        self.execute_request(event, response_id);
                    }
                    Admission::RejectCanceled => {}
                }
            }
            Some(MessageClass::Request { response_id: None }) => {
                // Fire-and-forget: no gate, no response.
                let _ = self
                    .handler
                    .handle_request(event.message_id, &mut event.data);
            }
            Some(_) => {
                self.diagnostics.push(ProtocolEvent::MisroutedEvent {
                    message_id: event.message_id,
                });
                debug_assert!(
                    false,
                    "non-request id {} reached the request entry point",
                    event.message_id
                );
            }
            None => {
                self.diagnostics.push(ProtocolEvent::UnrecognizedMessage {
                    message_id: event.message_id,
                });
                debug_assert!(false, "unrecognized message id {}", event.message_id);
            }
        }
        self.cancel_current_request();
    }

    /// Entry point for queued attribute events
    ///
    /// Decodes the subscribe/unsubscribe op from the event's stream; a
    /// short read is answered with a data-invalid result, not a crash.
    pub fn process_attribute_event(&mut self, mut event: RequestEvent) {
        match self.table.classify(event.message_id) {
            Some(MessageClass::Attribute) => match event.data.reader().read_u8() {
                Some(START_NOTIFY_OP) => {
                    self.request_start_notify(event.message_id, event.source, event.sequence_nr);
                    if self.attributes.state(event.message_id) == Some(AttributeState::Ok) {
                        self.notify_one(event.message_id, event.source, event.sequence_nr);
                    }
                }
                Some(STOP_NOTIFY_OP) => {
                    self.registry.stop_notify(event.message_id, event.source);
                }
                Some(_) | None => {
                    self.send_result(
                        event.source,
                        event.message_id,
                        ResultCode::DataInvalid,
                        event.sequence_nr,
                    );
                }
            },
            Some(_) => {
                self.diagnostics.push(ProtocolEvent::MisroutedEvent {
                    message_id: event.message_id,
                });
                debug_assert!(
                    false,
                    "non-attribute id {} reached the attribute entry point",
                    event.message_id
                );
            }
            None => {
                self.diagnostics.push(ProtocolEvent::UnrecognizedMessage {
                    message_id: event.message_id,
                });
                debug_assert!(false, "unrecognized message id {}", event.message_id);
            }
        }
        self.cancel_current_request();
    }

    /// Publishes an attribute's current value to every subscriber
    ///
    /// Flips the attribute to `Ok` on success; a marshal failure latches
    /// it `Invalid` and broadcasts a data-invalid result instead.
    ///
    /// # Panics
    ///
    /// Panics when `attribute_id` is not a known attribute: the id space
    /// is closed and generated, so this is a codegen/dispatch defect.
    pub fn send_notification(&mut self, attribute_id: MessageId) {
        match self.table.classify(attribute_id) {
            Some(MessageClass::Attribute) => {}
            other => panic!(
                "send_notification: {} is not an attribute id (classified {:?})",
                attribute_id, other
            ),
        }

        match self.handler.marshal_attribute(attribute_id) {
            Ok(mut value) => {
                self.attributes.mark_ok(attribute_id);
                for entry in self.registry.listeners(attribute_id) {
                    let data = value.duplicate();
                    self.sink.send_response(ResponseEvent::new(
                        entry.source,
                        attribute_id,
                        ResultCode::Ok,
                        entry.sequence_nr,
                        data,
                    ));
                }
            }
            Err(_) => self.error_request(attribute_id, false),
        }
    }

    /// Resolves a logical failure on `message_id` into result codes
    ///
    /// - attribute id: latches the attribute `Invalid` and broadcasts a
    ///   data-invalid notification to its subscribers;
    /// - response or broadcast id: emits a data-invalid result to the
    ///   id's listeners (a malformed outbound push has no caller to
    ///   cancel);
    /// - request id: answers every listener of the paired response id
    ///   with request-canceled (`is_cancel`) or request-error, then
    ///   releases those listeners.
    pub fn error_request(&mut self, message_id: MessageId, is_cancel: bool) {
        match self.table.classify(message_id) {
            Some(MessageClass::Attribute) => {
                self.attributes.mark_invalid(message_id);
                for entry in self.registry.listeners(message_id) {
                    self.sink.send_response(ResponseEvent::new(
                        entry.source,
                        message_id,
                        ResultCode::DataInvalid,
                        entry.sequence_nr,
                        EventDataStream::default(),
                    ));
                }
            }
            Some(MessageClass::Response) | Some(MessageClass::Broadcast) => {
                for entry in self.registry.listeners(message_id) {
                    self.sink.send_response(ResponseEvent::new(
                        entry.source,
                        message_id,
                        ResultCode::DataInvalid,
                        entry.sequence_nr,
                        EventDataStream::default(),
                    ));
                }
            }
            Some(MessageClass::Request { response_id }) => {
                if let Some(response_id) = response_id {
                    let code = if is_cancel {
                        ResultCode::RequestCanceled
                    } else {
                        ResultCode::RequestError
                    };
                    self.fail_request(response_id, code);
                }
            }
            None => {
                self.diagnostics
                    .push(ProtocolEvent::UnrecognizedMessage { message_id });
                debug_assert!(false, "unrecognized message id {}", message_id);
            }
        }
    }

    /// Runs an admitted request through the business handler
    fn execute_request(&mut self, mut event: RequestEvent, response_id: MessageId) {
        match self.handler.handle_request(event.message_id, &mut event.data) {
            Ok(payload) => {
                self.sink.send_response(ResponseEvent::new(
                    event.source,
                    response_id,
                    ResultCode::Ok,
                    event.sequence_nr,
                    payload.unwrap_or_default(),
                ));
            }
            Err(error) => {
                self.fail_request(response_id, error.result_code());
            }
        }
    }

    /// Answers and releases every listener of a response id
    fn fail_request(&mut self, response_id: MessageId, code: ResultCode) {
        for entry in self.registry.listeners(response_id) {
            self.sink.send_response(ResponseEvent::new(
                entry.source,
                response_id,
                code,
                entry.sequence_nr,
                EventDataStream::default(),
            ));
            self.registry.stop_notify(response_id, entry.source);
        }
    }

    /// Pushes an attribute's current value to a single subscriber
    fn notify_one(&mut self, attribute_id: MessageId, source: ProxyAddress, sequence_nr: u32) {
        match self.handler.marshal_attribute(attribute_id) {
            Ok(value) => {
                self.sink.send_response(ResponseEvent::new(
                    source,
                    attribute_id,
                    ResultCode::Ok,
                    sequence_nr,
                    value,
                ));
            }
            Err(_) => self.error_request(attribute_id, false),
        }
    }

    fn send_result(
        &mut self,
        target: ProxyAddress,
        response_id: MessageId,
        result: ResultCode,
        sequence_nr: u32,
    ) {
        self.sink.send_response(ResponseEvent::new(
            target,
            response_id,
            result,
            sequence_nr,
            EventDataStream::default(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marshal::MarshalMode;

    const GET_POSITION: MessageId = MessageId::new(1);
    const GET_POSITION_RESPONSE: MessageId = MessageId::new(2);
    const LOG_MARKER: MessageId = MessageId::new(3);
    const POSITION_ATTRIBUTE: MessageId = MessageId::new(4);
    const STATE_BROADCAST: MessageId = MessageId::new(5);

    fn table() -> MessageTable {
        MessageTable::new()
            .with_request(GET_POSITION, GET_POSITION_RESPONSE)
            .with_fire_and_forget(LOG_MARKER)
            .with_attribute(POSITION_ATTRIBUTE)
            .with_broadcast(STATE_BROADCAST)
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<ResponseEvent>,
    }

    impl EventSink for RecordingSink {
        fn send_response(&mut self, event: ResponseEvent) {
            self.sent.push(event);
        }
    }

    /// Handler echoing one u32 argument incremented, with switchable failure.
    #[derive(Default)]
    struct TestHandler {
        fail_requests: bool,
        attribute_value: Option<u32>,
        handled: Vec<MessageId>,
    }

    impl EndpointHandler for TestHandler {
        fn handle_request(
            &mut self,
            message_id: MessageId,
            data: &mut EventDataStream,
        ) -> Result<Option<EventDataStream>, HandlerError> {
            self.handled.push(message_id);
            if self.fail_requests {
                return Err(HandlerError::Failed("handler told to fail".to_string()));
            }
            let argument = data.reader().read_u32().unwrap_or(0);
            let mut response = EventDataStream::new(MarshalMode::Internal);
            response
                .writer()
                .map_err(|error| HandlerError::Failed(error.to_string()))?
                .write_u32(argument + 1)
                .map_err(|error| HandlerError::Failed(error.to_string()))?;
            Ok(Some(response))
        }

        fn marshal_attribute(
            &mut self,
            _attribute_id: MessageId,
        ) -> Result<EventDataStream, HandlerError> {
            let value = self
                .attribute_value
                .ok_or_else(|| HandlerError::ValueUnavailable("no value yet".to_string()))?;
            let mut stream = EventDataStream::new(MarshalMode::Internal);
            stream
                .writer()
                .map_err(|error| HandlerError::Failed(error.to_string()))?
                .write_u32(value)
                .map_err(|error| HandlerError::Failed(error.to_string()))?;
            Ok(stream)
        }
    }

    fn protocol() -> DispatchProtocol<RecordingSink, TestHandler> {
        DispatchProtocol::new(
            EndpointAddress::new(),
            table(),
            RecordingSink::default(),
            TestHandler::default(),
        )
    }

    fn request_with_arg(id: MessageId, source: ProxyAddress, sequence_nr: u32) -> RequestEvent {
        let mut data = EventDataStream::new(MarshalMode::Internal);
        data.writer().unwrap().write_u32(41).unwrap();
        RequestEvent::new(EndpointAddress::new(), id, source, sequence_nr, data)
    }

    fn attribute_op(op: u8, source: ProxyAddress, sequence_nr: u32) -> RequestEvent {
        let mut data = EventDataStream::new(MarshalMode::Internal);
        data.writer().unwrap().write_u8(op).unwrap();
        RequestEvent::new(
            EndpointAddress::new(),
            POSITION_ATTRIBUTE,
            source,
            sequence_nr,
            data,
        )
    }

    #[test]
    fn test_request_executes_and_responds() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();

        protocol.process_request_event(request_with_arg(GET_POSITION, source, 1));

        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target, source);
        assert_eq!(sent[0].response_id, GET_POSITION_RESPONSE);
        assert_eq!(sent[0].result, ResultCode::Ok);
        assert_eq!(sent[0].sequence_nr, 1);

        // The exclusivity mark is released on completion.
        assert!(protocol.registry().is_empty());
    }

    #[test]
    fn test_response_payload_carries_handler_output() {
        let mut protocol = protocol();
        protocol.process_request_event(request_with_arg(GET_POSITION, ProxyAddress::new(), 1));

        let mut data = std::mem::take(&mut protocol.sink_mut().sent)
            .pop()
            .unwrap()
            .data;
        assert_eq!(data.reader().read_u32(), Some(42));
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();

        assert_eq!(
            protocol.can_execute_request(source, GET_POSITION_RESPONSE, 1),
            Admission::Execute
        );
        assert_eq!(
            protocol.can_execute_request(source, GET_POSITION_RESPONSE, 2),
            Admission::Execute
        );

        // The superseded caller got a definite canceled answer for seq 1.
        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result, ResultCode::RequestCanceled);
        assert_eq!(sent[0].sequence_nr, 1);
        assert!(matches!(
            protocol.diagnostics()[0],
            ProtocolEvent::SupersededRequest { old_sequence_nr: 1, new_sequence_nr: 2, .. }
        ));
    }

    #[test]
    fn test_stale_request_is_rejected_with_cancel() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();

        protocol.can_execute_request(source, GET_POSITION_RESPONSE, 5);
        assert_eq!(
            protocol.can_execute_request(source, GET_POSITION_RESPONSE, 3),
            Admission::RejectCanceled
        );

        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result, ResultCode::RequestCanceled);
        assert_eq!(sent[0].sequence_nr, 3);
    }

    #[test]
    fn test_same_sequence_admits_later_arrival() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();

        protocol.can_execute_request(source, GET_POSITION_RESPONSE, 4);
        assert_eq!(
            protocol.can_execute_request(source, GET_POSITION_RESPONSE, 4),
            Admission::Execute
        );
        assert!(matches!(
            protocol.diagnostics()[0],
            ProtocolEvent::SameSequenceAnomaly { sequence_nr: 4, .. }
        ));
    }

    #[test]
    fn test_gate_is_per_source() {
        let mut protocol = protocol();
        let first = ProxyAddress::new();
        let second = ProxyAddress::new();

        assert_eq!(
            protocol.can_execute_request(first, GET_POSITION_RESPONSE, 1),
            Admission::Execute
        );
        assert_eq!(
            protocol.can_execute_request(second, GET_POSITION_RESPONSE, 1),
            Admission::Execute
        );
        assert!(protocol.sink().sent.is_empty());
    }

    #[test]
    fn test_fire_and_forget_skips_gate_and_response() {
        let mut protocol = protocol();
        protocol.process_request_event(request_with_arg(LOG_MARKER, ProxyAddress::new(), 1));

        assert_eq!(protocol.handler.handled, vec![LOG_MARKER]);
        assert!(protocol.sink().sent.is_empty());
        assert!(protocol.registry().is_empty());
    }

    #[test]
    fn test_handler_failure_becomes_request_error() {
        let mut protocol = protocol();
        protocol.handler.fail_requests = true;
        let source = ProxyAddress::new();

        protocol.process_request_event(request_with_arg(GET_POSITION, source, 1));

        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result, ResultCode::RequestError);
        assert_eq!(sent[0].target, source);
        assert!(protocol.registry().is_empty());
    }

    #[test]
    fn test_duplicate_subscription_is_logged_not_doubled() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();

        protocol.request_start_notify(POSITION_ATTRIBUTE, source, 1);
        protocol.request_start_notify(POSITION_ATTRIBUTE, source, 1);

        assert_eq!(protocol.registry().listeners(POSITION_ATTRIBUTE).len(), 1);
        assert!(matches!(
            protocol.diagnostics()[0],
            ProtocolEvent::DuplicateSubscription { .. }
        ));
    }

    #[test]
    fn test_attribute_starts_unavailable() {
        let protocol = protocol();
        assert_eq!(
            protocol.attribute_state(POSITION_ATTRIBUTE),
            Some(AttributeState::Unavailable)
        );
    }

    #[test]
    fn test_send_notification_publishes_to_subscribers() {
        let mut protocol = protocol();
        protocol.handler.attribute_value = Some(7);
        let first = ProxyAddress::new();
        let second = ProxyAddress::new();
        protocol.request_start_notify(POSITION_ATTRIBUTE, first, 1);
        protocol.request_start_notify(POSITION_ATTRIBUTE, second, 2);

        protocol.send_notification(POSITION_ATTRIBUTE);

        assert_eq!(
            protocol.attribute_state(POSITION_ATTRIBUTE),
            Some(AttributeState::Ok)
        );
        let sent = std::mem::take(&mut protocol.sink_mut().sent);
        assert_eq!(sent.len(), 2);
        for mut event in sent {
            assert_eq!(event.result, ResultCode::Ok);
            assert_eq!(event.response_id, POSITION_ATTRIBUTE);
            assert_eq!(event.data.reader().read_u32(), Some(7));
        }
    }

    #[test]
    fn test_send_notification_failure_latches_invalid() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();
        protocol.request_start_notify(POSITION_ATTRIBUTE, source, 1);

        // No attribute value available.
        protocol.send_notification(POSITION_ATTRIBUTE);

        assert_eq!(
            protocol.attribute_state(POSITION_ATTRIBUTE),
            Some(AttributeState::Invalid)
        );
        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result, ResultCode::DataInvalid);
    }

    #[test]
    #[should_panic(expected = "not an attribute id")]
    fn test_send_notification_unknown_id_panics() {
        let mut protocol = protocol();
        protocol.send_notification(MessageId::new(99));
    }

    #[test]
    fn test_error_request_on_attribute_broadcasts_invalid() {
        let mut protocol = protocol();
        let first = ProxyAddress::new();
        let second = ProxyAddress::new();
        protocol.request_start_notify(POSITION_ATTRIBUTE, first, 1);
        protocol.request_start_notify(POSITION_ATTRIBUTE, second, 2);

        protocol.error_request(POSITION_ATTRIBUTE, false);

        assert_eq!(
            protocol.attribute_state(POSITION_ATTRIBUTE),
            Some(AttributeState::Invalid)
        );
        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|event| event.result == ResultCode::DataInvalid));
        // Subscribers stay registered for the next successful publish.
        assert_eq!(protocol.registry().listeners(POSITION_ATTRIBUTE).len(), 2);
    }

    #[test]
    fn test_error_request_on_request_id_answers_listeners() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();
        protocol.can_execute_request(source, GET_POSITION_RESPONSE, 1);

        protocol.error_request(GET_POSITION, true);

        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result, ResultCode::RequestCanceled);
        assert_eq!(sent[0].response_id, GET_POSITION_RESPONSE);
        // The definite answer releases the listener.
        assert!(protocol.registry().is_empty());
    }

    #[test]
    fn test_error_request_on_broadcast_emits_data_invalid() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();
        protocol.request_start_notify(STATE_BROADCAST, source, 1);

        protocol.error_request(STATE_BROADCAST, false);

        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result, ResultCode::DataInvalid);
    }

    #[test]
    fn test_attribute_event_subscribes_and_unsubscribes() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();

        protocol.process_attribute_event(attribute_op(START_NOTIFY_OP, source, 1));
        assert!(protocol.registry().contains(POSITION_ATTRIBUTE, source));

        protocol.process_attribute_event(attribute_op(STOP_NOTIFY_OP, source, 2));
        assert!(!protocol.registry().contains(POSITION_ATTRIBUTE, source));
    }

    #[test]
    fn test_subscribe_delivers_current_value_when_valid() {
        let mut protocol = protocol();
        protocol.handler.attribute_value = Some(3);
        protocol.send_notification(POSITION_ATTRIBUTE);
        protocol.sink_mut().sent.clear();

        let source = ProxyAddress::new();
        protocol.process_attribute_event(attribute_op(START_NOTIFY_OP, source, 1));

        let sent = std::mem::take(&mut protocol.sink_mut().sent);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target, source);
        assert_eq!(sent[0].result, ResultCode::Ok);
    }

    #[test]
    fn test_attribute_event_short_read_is_data_invalid() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();
        // Empty stream: the op byte is missing.
        let event = RequestEvent::new(
            EndpointAddress::new(),
            POSITION_ATTRIBUTE,
            source,
            1,
            EventDataStream::new(MarshalMode::Internal),
        );

        protocol.process_attribute_event(event);

        let sent = &protocol.sink().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].result, ResultCode::DataInvalid);
        assert_eq!(sent[0].target, source);
    }

    #[test]
    fn test_remove_all_listeners_reports_ids() {
        let mut protocol = protocol();
        let source = ProxyAddress::new();
        protocol.request_start_notify(POSITION_ATTRIBUTE, source, 1);
        protocol.request_start_notify(STATE_BROADCAST, source, 2);

        let removed = protocol.remove_all_listeners(source);
        assert_eq!(removed, vec![POSITION_ATTRIBUTE, STATE_BROADCAST]);
        assert!(protocol.registry().is_empty());
    }
}

//! # Messaging Contract Tests
//!
//! This crate provides "golden" tests for the messaging core to ensure
//! its observable contracts don't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: Wire layouts and protocol outcomes are
//!   written down as code
//! - **Testability first**: Contract tests fail when behavior changes
//! - **Cross-crate**: Each scenario exercises the buffers, queues, and
//!   dispatch protocol together, the way a real endpoint does
//!
//! ## Structure
//!
//! - [`marshaling`]: byte-level wire contracts of the converters
//! - [`queueing`]: priority, FIFO, and drain contracts of the queues
//! - [`request_gating`]: admission, supersede, and correlation contracts
//! - [`attributes`]: the attribute validity lattice

pub mod attributes;
pub mod marshaling;
pub mod queueing;
pub mod request_gating;

/// Shared fixture: a small media-player interface and its endpoint
pub mod test_helpers {
    use core_types::{EndpointAddress, MessageId, ProxyAddress};
    use events::{Event, ExternalEventQueue, RequestEvent, ResponseEvent};
    use marshal::{EventDataStream, MarshalMode};
    use service_dispatch::{
        DispatchProtocol, EndpointHandler, EventSink, HandlerError, MessageTable,
        START_NOTIFY_OP, STOP_NOTIFY_OP,
    };
    use std::sync::Arc;

    /// Request: set the playback volume (one u32 argument)
    pub const SET_VOLUME: MessageId = MessageId::new(10);
    /// Response paired with [`SET_VOLUME`]; carries the previous volume
    pub const SET_VOLUME_RESPONSE: MessageId = MessageId::new(11);
    /// Attribute: the current track name
    pub const TRACK_ATTRIBUTE: MessageId = MessageId::new(12);
    /// Broadcast: unsolicited player status pushes
    pub const STATUS_BROADCAST: MessageId = MessageId::new(13);
    /// Fire-and-forget request: drop a debug marker
    pub const MARK: MessageId = MessageId::new(14);

    /// Builds the player interface's message table
    pub fn player_table() -> MessageTable {
        MessageTable::new()
            .with_request(SET_VOLUME, SET_VOLUME_RESPONSE)
            .with_attribute(TRACK_ATTRIBUTE)
            .with_broadcast(STATUS_BROADCAST)
            .with_fire_and_forget(MARK)
    }

    /// Sink collecting responses for direct inspection
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Vec<ResponseEvent>,
    }

    impl EventSink for RecordingSink {
        fn send_response(&mut self, event: ResponseEvent) {
            self.sent.push(event);
        }
    }

    /// Sink pushing responses onto a caller's external queue
    pub struct QueueSink {
        queue: Arc<ExternalEventQueue>,
    }

    impl QueueSink {
        pub fn new(queue: Arc<ExternalEventQueue>) -> Self {
            Self { queue }
        }
    }

    impl EventSink for QueueSink {
        fn send_response(&mut self, event: ResponseEvent) {
            self.queue.push(Event::Response(event));
        }
    }

    /// Endpoint logic: stores a volume, exposes the current track
    pub struct PlayerHandler {
        pub volume: u32,
        pub track: Option<String>,
        pub fail_requests: bool,
    }

    impl Default for PlayerHandler {
        fn default() -> Self {
            Self {
                volume: 50,
                track: None,
                fail_requests: false,
            }
        }
    }

    impl EndpointHandler for PlayerHandler {
        fn handle_request(
            &mut self,
            message_id: MessageId,
            data: &mut EventDataStream,
        ) -> Result<Option<EventDataStream>, HandlerError> {
            if self.fail_requests {
                return Err(HandlerError::Failed("injected failure".to_string()));
            }
            match message_id {
                SET_VOLUME => {
                    let previous = self.volume;
                    self.volume = data.reader().read_u32().unwrap_or(self.volume);
                    let mut response = EventDataStream::new(MarshalMode::Internal);
                    response
                        .writer()
                        .map_err(|error| HandlerError::Failed(error.to_string()))?
                        .write_u32(previous)
                        .map_err(|error| HandlerError::Failed(error.to_string()))?;
                    Ok(Some(response))
                }
                _ => Ok(None),
            }
        }

        fn marshal_attribute(
            &mut self,
            _attribute_id: MessageId,
        ) -> Result<EventDataStream, HandlerError> {
            let track = self
                .track
                .clone()
                .ok_or_else(|| HandlerError::ValueUnavailable("no track loaded".to_string()))?;
            let mut stream = EventDataStream::new(MarshalMode::Internal);
            stream
                .writer()
                .map_err(|error| HandlerError::Failed(error.to_string()))?
                .write_str(&track)
                .map_err(|error| HandlerError::Failed(error.to_string()))?;
            Ok(stream)
        }
    }

    /// Builds a player endpoint over a recording sink
    pub fn player_endpoint() -> DispatchProtocol<RecordingSink, PlayerHandler> {
        DispatchProtocol::new(
            EndpointAddress::new(),
            player_table(),
            RecordingSink::default(),
            PlayerHandler::default(),
        )
    }

    /// Builds a set-volume request event
    pub fn set_volume_request(source: ProxyAddress, sequence_nr: u32, volume: u32) -> RequestEvent {
        let mut data = EventDataStream::named("setVolume", MarshalMode::Internal);
        data.writer()
            .expect("Fresh stream must be writable")
            .write_u32(volume)
            .expect("Failed to marshal volume argument");
        RequestEvent::new(EndpointAddress::new(), SET_VOLUME, source, sequence_nr, data)
    }

    /// Builds an attribute subscribe/unsubscribe event
    pub fn track_subscription(source: ProxyAddress, sequence_nr: u32, subscribe: bool) -> RequestEvent {
        let mut data = EventDataStream::new(MarshalMode::Internal);
        data.writer()
            .expect("Fresh stream must be writable")
            .write_u8(if subscribe { START_NOTIFY_OP } else { STOP_NOTIFY_OP })
            .expect("Failed to marshal subscription op");
        RequestEvent::new(
            EndpointAddress::new(),
            TRACK_ATTRIBUTE,
            source,
            sequence_nr,
            data,
        )
    }
}

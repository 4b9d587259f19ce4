//! Server-Sent Events (SSE) utilities
//!
//! Turns an [`EventBus`] subscription into an axum SSE response. Delivery is
//! best-effort: a client that falls behind skips the messages it missed.

use crate::events::{EventBus, PushMessage};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

/// Keep-alive comment interval for idle connections
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Convert one push message into an SSE event
///
/// The event name is the message type; the data is the JSON message itself.
pub fn to_sse_event(message: &PushMessage) -> Option<Event> {
    match Event::default()
        .event(message.event_type())
        .json_data(message)
    {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to serialize push message: {}", e);
            None
        }
    }
}

/// Create an SSE stream of all messages emitted on `bus` from now on
pub fn push_event_stream(
    bus: &EventBus,
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(
        "New SSE client connected to {} ({} subscribers)",
        service_name,
        bus.subscriber_count() + 1
    );

    let stream = BroadcastStream::new(bus.subscribe()).filter_map(|result| async move {
        match result {
            Ok(message) => {
                debug!("SSE: sending {}", message.event_type());
                to_sse_event(&message).map(Ok)
            }
            Err(e) => {
                // Lagged: the client missed some messages, keep streaming
                warn!("SSE client fell behind: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

//! Server-Sent Events push channel
//!
//! Streams `playevent` messages to connected clients.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    boombox_common::sse::push_event_stream(&ctx.bus, "boombox-ap")
}

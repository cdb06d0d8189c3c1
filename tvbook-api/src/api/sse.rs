//! Server-Sent Events (SSE) for workflow updates
//!
//! Open list and detail views subscribe here and refresh when a request they
//! show is created, edited or moved. Browsers' EventSource cannot send
//! custom headers, so the stream needs no role.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::AppState;

/// Keep-alive comment interval
const HEARTBEAT: Duration = Duration::from_secs(15);

/// GET /api/booking/events - SSE event stream
///
/// Streams events:
/// - ConnectionStatus (once, on connect)
/// - RequestCreated
/// - RequestUpdated
/// - StatusChanged
/// - ResourcesAssigned
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to workflow events");

    let mut rx = state.events.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event_type = event.event_type();
                    match serde_json::to_string(&event) {
                        Ok(event_json) => {
                            debug!("SSE: Broadcasting {} for {}", event_type, event.request_id());
                            yield Ok(Event::default()
                                .event(event_type)
                                .data(event_json));
                        }
                        Err(e) => {
                            warn!("SSE: Failed to serialize event {}: {}", event_type, e);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Client fell behind; tell it to reload instead of guessing
                    warn!("SSE: Client lagged, {} events dropped", skipped);
                    yield Ok(Event::default()
                        .event("Resync")
                        .data(skipped.to_string()));
                }
                Err(RecvError::Closed) => {
                    info!("SSE: Event bus closed, ending stream");
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(HEARTBEAT).text("heartbeat"))
}

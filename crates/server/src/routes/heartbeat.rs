// crates/server/src/routes/heartbeat.rs
//! Keep-alive event stream.
//!
//! - GET /sse — `event: heartbeat` / `data: alive` at a fixed cadence
//!
//! The stream carries no job data and shares no state with the registry. It
//! ends when the client disconnects (axum drops the stream) or when the
//! server's shutdown token is cancelled.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::routing::get;
use axum::Router;
use tokio::time::MissedTickBehavior;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub const HEARTBEAT_EVENT: &str = "heartbeat";
pub const HEARTBEAT_DATA: &str = "alive";

/// Heartbeat events every `interval`, first one immediately, until `shutdown` fires.
pub fn heartbeat_events(
    interval: Duration,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    yield Ok(Event::default().event(HEARTBEAT_EVENT).data(HEARTBEAT_DATA));
                }
            }
        }
        tracing::debug!("Heartbeat stream closed by shutdown");
    }
}

/// GET /sse — heartbeat stream.
pub async fn heartbeat_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Heartbeat client connected");
    Sse::new(heartbeat_events(
        state.heartbeat_interval,
        state.shutdown.child_token(),
    ))
}

/// Build the heartbeat router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sse", get(heartbeat_stream))
}

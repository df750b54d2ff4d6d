/// Live task snapshots over Server-Sent Events
///
/// Subscribes to the caller's tasks and pushes the full filtered list as a
/// `snapshot` event: once on connect, then after every committed write to one
/// of their tasks. The subscription ends when the client disconnects (the
/// stream is dropped) or when the server begins shutting down.
///
/// # Endpoint
///
/// ```text
/// GET /v1/tasks/stream?completed=&priority=
/// ```
///
/// # Events
///
/// ```text
/// event: snapshot
/// data: {"tasks":[...],"count":2}
///
/// event: error
/// data: {"error":"service_unavailable","message":"..."}
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    routes::tasks::{ListQuery, TaskListResponse},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{Stream, StreamExt};
use serde_json::json;
use std::{convert::Infallible, time::Duration};
use taskboard_shared::auth::middleware::SessionContext;
use taskboard_shared::error::RepositoryResult;
use taskboard_shared::models::task::Task;
use tracing::{error, info};

/// Keep-alive comment interval
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// SSE handler
pub async fn stream_tasks(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Query(query) = query?;
    let subscription = state.tasks.subscribe_until(
        &session.user_id,
        query.into(),
        state.shutdown.child_token(),
    );

    info!(user_id = %session.user_id, "Task stream opened");

    let stream = subscription
        .into_stream()
        .map(|snapshot| Ok(to_event(snapshot)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

fn to_event(snapshot: RepositoryResult<Vec<Task>>) -> Event {
    match snapshot {
        Ok(tasks) => {
            let body = TaskListResponse {
                count: tasks.len(),
                tasks,
            };
            Event::default()
                .event("snapshot")
                .json_data(&body)
                .unwrap_or_else(|e| {
                    error!(error = %e, "Failed to serialize snapshot");
                    Event::default().event("error").data("serialization failed")
                })
        }
        Err(e) => {
            error!(error = %e, "Snapshot query failed");
            let body = json!({
                "error": "service_unavailable",
                "message": e.to_string(),
            });
            Event::default().event("error").data(body.to_string())
        }
    }
}

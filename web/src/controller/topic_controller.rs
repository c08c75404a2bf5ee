use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use log::*;

/// POST a message to every current subscriber of a topic
#[utoipa::path(
    post,
    path = "/{topic}",
    params(
        ("topic" = String, Path, description = "Topic to publish the message to")
    ),
    request_body(content = String, description = "Message payload", content_type = "text/plain"),
    responses(
        (status = 204, description = "Message accepted and delivered to the topic's subscribers"),
        (status = 404, description = "Nobody has ever subscribed to this topic"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn publish(
    State(app_state): State<AppState>,
    Path(topic): Path<String>,
    message: String,
) -> Result<impl IntoResponse, Error> {
    debug!("POST publish to topic {topic}");

    let event_id = app_state.broker_ref().publish(&topic, message).await?;

    debug!("Published event {event_id} to topic {topic}");

    Ok(StatusCode::NO_CONTENT)
}

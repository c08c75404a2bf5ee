use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use sse::error::{Error as BrokerError, ErrorKind as BrokerErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(BrokerError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            BrokerErrorKind::TopicNotFound(topic) => {
                debug!("Rejecting publish to topic without subscribers: {topic}");
                (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<BrokerError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

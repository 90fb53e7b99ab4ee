use rocket::http::Status;
use rocket::response::Responder;
use shared::{PollError, ValidationError};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Poll(err) => match err {
                PollError::NotFound(_) => Status::NotFound,
                PollError::InvalidId => Status::BadRequest,
                PollError::InvalidOption => Status::BadRequest,
                PollError::AlreadyVoted => Status::Forbidden,
                PollError::DuplicateUsername => Status::Conflict,
                PollError::WrongPassword => Status::Unauthorized,
                PollError::DuplicateId(_) => Status::Conflict,
                PollError::IdsExhausted => Status::InsufficientStorage,
                PollError::InvalidInput(_) => Status::BadRequest,
            },
            ApiError::Storage(_) => Status::InternalServerError,
        }
    }

    pub fn poll_error(&self) -> Option<&PollError> {
        match self {
            ApiError::Poll(err) => Some(err),
            ApiError::Storage(_) => None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Poll(err.into())
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if let ApiError::Storage(ref msg) = self {
            error!("Storage failure while handling {}: {}", req.uri(), msg);
        }

        rocket::Response::build_from(self.to_string().respond_to(req)?)
            .status(status)
            .ok()
    }
}

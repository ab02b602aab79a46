use shared::error::{ApiException, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to backend failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend rejected request: {0}")]
    Api(#[from] ApiException),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("no signed-in user")]
    NotSignedIn,
    #[error("account created but profile could not be saved: {0}")]
    ProfileCreation(#[source] Box<ClientError>),
}

impl ClientError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api(api) => Some(api.code),
            ClientError::NotSignedIn => Some(ErrorCode::Unauthorized),
            ClientError::ProfileCreation(inner) => inner.code(),
            ClientError::Http(_) | ClientError::Url(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code() == Some(ErrorCode::Unauthorized)
    }
}

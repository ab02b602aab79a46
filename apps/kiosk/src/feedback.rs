//! Turns backend failures into messages a player at the kiosk can act on.

use booking_client::ClientError;
use shared::error::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

pub fn categorize(err: &ClientError) -> FailureCategory {
    match err {
        ClientError::Http(http) if http.is_connect() || http.is_timeout() => {
            FailureCategory::Transport
        }
        ClientError::Http(_) | ClientError::Url(_) => FailureCategory::Unknown,
        ClientError::NotSignedIn => FailureCategory::Auth,
        ClientError::ProfileCreation(inner) => categorize(inner),
        ClientError::Api(api) => {
            let lower = api.message.to_ascii_lowercase();
            if lower.contains("invalid login credentials")
                || lower.contains("email not confirmed")
                || matches!(api.code, ErrorCode::Unauthorized | ErrorCode::Forbidden)
            {
                FailureCategory::Auth
            } else if matches!(api.code, ErrorCode::Validation | ErrorCode::Conflict) {
                FailureCategory::Validation
            } else {
                FailureCategory::Unknown
            }
        }
    }
}

pub fn classify_auth_failure(err: &ClientError) -> String {
    if let ClientError::ProfileCreation(inner) = err {
        return format!("Error creating profile: {}", backend_message(inner));
    }
    match categorize(err) {
        FailureCategory::Transport => {
            "Server unreachable; check SUPABASE_URL/network and retry.".to_string()
        }
        FailureCategory::Auth if matches!(err, ClientError::NotSignedIn) => {
            "Please sign in first.".to_string()
        }
        FailureCategory::Auth | FailureCategory::Validation | FailureCategory::Unknown => {
            backend_message(err)
        }
    }
}

fn backend_message(err: &ClientError) -> String {
    match err {
        ClientError::Api(api) => api.message.clone(),
        other => other.to_string(),
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CourtId, SkillLevel, UserId};

const NOT_SET: &str = "Not set";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub name: String,
    #[serde(rename = "type")]
    pub court_type: String,
    pub price_per_hour: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_active: bool,
}

impl Court {
    pub fn price_label(&self) -> String {
        if self.price_per_hour.fract() == 0.0 {
            format!("{:.0} DT / hour", self.price_per_hour)
        } else {
            format!("{} DT / hour", self.price_per_hour)
        }
    }
}

/// A row of the `profiles` table, keyed by the auth user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skill_level: Option<String>,
}

impl Profile {
    pub fn full_name_label(&self) -> &str {
        non_empty(self.full_name.as_deref()).unwrap_or(NOT_SET)
    }

    pub fn phone_label(&self) -> &str {
        non_empty(self.phone.as_deref()).unwrap_or(NOT_SET)
    }

    pub fn skill_level_label(&self) -> String {
        non_empty(self.skill_level.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| SkillLevel::default().to_string())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: UserId,
    pub full_name: String,
    pub phone: String,
    pub skill_level: SkillLevel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayNameRow {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

/// Sign-up returns a full session when the account is confirmed right away
/// and only the user when email confirmation is pending.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

impl From<SignUpResponse> for SignUpOutcome {
    fn from(value: SignUpResponse) -> Self {
        match value {
            SignUpResponse::Session(session) => Self {
                user: session.user.clone(),
                session: Some(session),
            },
            SignUpResponse::User(user) => Self {
                user,
                session: None,
            },
        }
    }
}

/// Everything the sign-up form collects.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: String,
}

//! Client for the hosted backend behind the booking pages: email/password
//! auth plus reads and inserts on the `courts` and `profiles` tables.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{SkillLevel, UserId},
    error::ApiException,
    protocol::{
        AuthSession, AuthUser, Court, DisplayNameRow, NewProfile, PasswordCredentials, Profile,
        Registration, SignUpOutcome, SignUpResponse,
    },
};
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

pub mod error;
pub mod query;

pub use error::ClientError;
pub use query::TableQuery;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the backend lives and the public key every request carries.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: Url,
    pub anon_key: String,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            anon_key: anon_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ClientError>;
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError>;
    async fn sign_out(&self) -> Result<(), ClientError>;
    async fn current_user(&self) -> Result<Option<AuthUser>, ClientError>;
    async fn list_active_courts(&self) -> Result<Vec<Court>, ClientError>;
    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, ClientError>;
    async fn profile_display_name(&self, user_id: UserId) -> Result<Option<String>, ClientError>;
    async fn insert_profile(&self, profile: &NewProfile) -> Result<(), ClientError>;
    async fn register(&self, registration: &Registration) -> Result<SignUpOutcome, ClientError>;
}

pub struct BookingClient {
    http: Client,
    config: ServiceConfig,
    session: RwLock<Option<AuthSession>>,
}

impl BookingClient {
    pub fn new(config: ServiceConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            config,
            session: RwLock::new(None),
        })
    }

    pub async fn session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    /// Starts a read or insert on `table`.
    pub fn from(&self, table: impl Into<String>) -> TableQuery<'_> {
        TableQuery::new(self, table)
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.config.base_url.join(path)?)
    }

    /// Adds the api key and the bearer token: the user's access token when
    /// signed in, the anon key otherwise.
    pub(crate) async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone());
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token)
    }

    async fn store_session(&self, session: Option<AuthSession>) {
        *self.session.write().await = session;
    }
}

pub(crate) async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiException::from_body(status.as_u16(), &body).into())
}

#[async_trait]
impl BookingBackend for BookingClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, ClientError> {
        let res = self
            .http
            .post(self.endpoint("auth/v1/signup")?)
            .header("apikey", &self.config.anon_key)
            .json(&PasswordCredentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: SignUpResponse = check_status(res).await?.json().await?;
        let outcome = SignUpOutcome::from(body);

        info!(
            user_id = %outcome.user.id,
            confirmed = outcome.session.is_some(),
            "account created"
        );
        if outcome.session.is_some() {
            self.store_session(outcome.session.clone()).await;
        }
        Ok(outcome)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let res = self
            .http
            .post(url)
            .header("apikey", &self.config.anon_key)
            .json(&PasswordCredentials {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let session: AuthSession = check_status(res).await?.json().await?;

        info!(user_id = %session.user.id, "signed in");
        self.store_session(Some(session.clone())).await;
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        // The local session goes away even if the backend call fails.
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };

        let result = async {
            let res = self
                .http
                .post(self.endpoint("auth/v1/logout")?)
                .header("apikey", &self.config.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await?;
            check_status(res).await.map(|_| ())
        }
        .await;

        match &result {
            Ok(()) => info!(user_id = %session.user.id, "signed out"),
            Err(err) => warn!(user_id = %session.user.id, error = %err, "remote sign-out failed"),
        }
        result
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, ClientError> {
        if self.session.read().await.is_none() {
            return Ok(None);
        }
        let request = self
            .authorized(self.http.get(self.endpoint("auth/v1/user")?))
            .await;
        match check_status(request.send().await?).await {
            Ok(res) => Ok(Some(res.json().await?)),
            Err(err) if err.is_unauthorized() => {
                warn!(error = %err, "access token rejected; treating as signed out");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn list_active_courts(&self) -> Result<Vec<Court>, ClientError> {
        self.from("courts").eq("is_active", true).fetch().await
    }

    async fn fetch_profile(&self, user_id: UserId) -> Result<Option<Profile>, ClientError> {
        self.from("profiles").eq("id", user_id).maybe_single().await
    }

    async fn profile_display_name(&self, user_id: UserId) -> Result<Option<String>, ClientError> {
        let row: Option<DisplayNameRow> = self
            .from("profiles")
            .select("full_name")
            .eq("id", user_id)
            .maybe_single()
            .await?;
        Ok(row.and_then(|row| row.full_name))
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<(), ClientError> {
        self.from("profiles")
            .insert(std::slice::from_ref(profile))
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<SignUpOutcome, ClientError> {
        let outcome = self
            .sign_up(&registration.email, &registration.password)
            .await?;
        let profile = NewProfile {
            id: outcome.user.id,
            full_name: registration.full_name.clone(),
            phone: registration.phone.clone(),
            skill_level: SkillLevel::Beginner,
        };
        self.insert_profile(&profile)
            .await
            .map_err(|err| ClientError::ProfileCreation(Box::new(err)))?;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

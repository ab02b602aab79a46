use super::*;

use std::sync::Mutex;

use async_trait::async_trait;
use booking_client::ClientError;
use dispenser::{PourTiming, SeededRandom};
use shared::{
    domain::{CourtId, UserId},
    error::ApiException,
    protocol::{AuthSession, AuthUser, Court, NewProfile, Profile, SignUpOutcome},
};
use uuid::Uuid;

#[derive(Default)]
struct FakeBackend {
    courts: Vec<Court>,
    profile: Option<Profile>,
    confirm_sign_up: bool,
    fail_logout: bool,
    token_rejected: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls").push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls").clone()
    }
}

fn user() -> AuthUser {
    AuthUser {
        id: UserId(Uuid::from_u128(7)),
        email: Some("player@summa.tn".into()),
    }
}

fn session() -> AuthSession {
    AuthSession {
        access_token: "token".into(),
        token_type: "bearer".into(),
        expires_in: 3600,
        expires_at: None,
        refresh_token: "refresh".into(),
        user: user(),
    }
}

#[async_trait]
impl BookingBackend for FakeBackend {
    async fn sign_up(&self, _email: &str, _password: &str) -> Result<SignUpOutcome, ClientError> {
        self.record("sign_up");
        Ok(SignUpOutcome {
            user: user(),
            session: self.confirm_sign_up.then(session),
        })
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError> {
        self.record("sign_in");
        if password == "correct-horse" {
            Ok(session())
        } else {
            Err(ClientError::Api(ApiException::new(
                400,
                "Invalid login credentials",
            )))
        }
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        self.record("sign_out");
        if self.fail_logout {
            Err(ClientError::Api(ApiException::new(500, "boom")))
        } else {
            Ok(())
        }
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, ClientError> {
        self.record("current_user");
        Ok((!self.token_rejected).then(user))
    }

    async fn list_active_courts(&self) -> Result<Vec<Court>, ClientError> {
        self.record("list_active_courts");
        Ok(self.courts.clone())
    }

    async fn fetch_profile(&self, _user_id: UserId) -> Result<Option<Profile>, ClientError> {
        self.record("fetch_profile");
        Ok(self.profile.clone())
    }

    async fn profile_display_name(&self, _user_id: UserId) -> Result<Option<String>, ClientError> {
        self.record("profile_display_name");
        Ok(self.profile.as_ref().and_then(|p| p.full_name.clone()))
    }

    async fn insert_profile(&self, _profile: &NewProfile) -> Result<(), ClientError> {
        self.record("insert_profile");
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> Result<SignUpOutcome, ClientError> {
        let outcome = self
            .sign_up(&registration.email, &registration.password)
            .await?;
        self.record("insert_profile");
        Ok(outcome)
    }
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("utf8")
}

fn registration() -> Registration {
    Registration {
        email: "player@summa.tn".into(),
        password: "correct-horse".into(),
        full_name: "Amira Ben Salah".into(),
        phone: "+216 20 000 000".into(),
    }
}

#[tokio::test(start_paused = true)]
async fn pour_renders_until_the_cup_is_full() {
    let controller =
        DispenserController::with_random_source(PourTiming::default(), SeededRandom::new(3));
    let mut out = Vec::new();

    let session = run_pour(
        &controller,
        PourRequest {
            beverage: Beverage::Fanta,
            ice: true,
            lemon: true,
            json: false,
        },
        &mut out,
    )
    .await
    .expect("pour");

    assert!(session.is_full());
    assert_eq!(session.ice_cubes().len(), 5);
    assert!(session.lemon_requested());

    let text = output(out);
    assert!(text.contains("Choose a soda"));
    assert!(text.contains("Pouring Fanta"));
    assert!(text.contains("Fanta ready, take your cup"));
    assert!(text.ends_with('\n'));
}

#[tokio::test(start_paused = true)]
async fn json_pour_emits_one_line_per_change() {
    let controller =
        DispenserController::with_random_source(PourTiming::default(), SeededRandom::new(3));
    let mut out = Vec::new();

    run_pour(
        &controller,
        PourRequest {
            beverage: Beverage::Water,
            ice: false,
            lemon: false,
            json: true,
        },
        &mut out,
    )
    .await
    .expect("pour");

    let text = output(out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 102);
    let last: serde_json::Value = serde_json::from_str(lines[101]).expect("json");
    assert_eq!(last["phase"]["state"], "full");
    assert_eq!(last["fill_level"], 100.0);
}

#[tokio::test(start_paused = true)]
async fn busy_dispenser_refuses_a_second_pour() {
    let controller =
        DispenserController::with_random_source(PourTiming::default(), SeededRandom::new(3));
    controller.select_beverage(Beverage::Water).await;

    let err = run_pour(
        &controller,
        PourRequest {
            beverage: Beverage::Cola,
            ice: false,
            lemon: false,
            json: false,
        },
        &mut Vec::new(),
    )
    .await
    .expect_err("busy");
    assert!(err.to_string().contains("busy"));
}

#[tokio::test]
async fn lists_courts_with_prices() {
    let backend = FakeBackend {
        courts: vec![Court {
            id: CourtId(Uuid::from_u128(1)),
            name: "Court Central".into(),
            court_type: "Panoramic".into(),
            price_per_hour: 60.0,
            image_url: None,
            is_active: true,
        }],
        ..FakeBackend::default()
    };
    let mut out = Vec::new();
    list_courts(&backend, &mut out).await.expect("courts");

    let text = output(out);
    assert!(text.contains("Court Central"));
    assert!(text.contains("60 DT / hour"));
}

#[tokio::test]
async fn empty_court_list_says_so() {
    let mut out = Vec::new();
    list_courts(&FakeBackend::default(), &mut out)
        .await
        .expect("courts");
    assert_eq!(output(out), "No courts available right now.\n");
}

#[tokio::test]
async fn sign_up_reports_pending_confirmation() {
    let backend = FakeBackend::default();
    let mut out = Vec::new();
    sign_up(&backend, &registration(), &mut out)
        .await
        .expect("sign up");
    assert_eq!(output(out), "Registration successful! Check your emails.\n");
    assert_eq!(backend.calls(), vec!["sign_up", "insert_profile"]);
}

#[tokio::test]
async fn sign_in_greets_by_profile_name() {
    let backend = FakeBackend {
        profile: Some(Profile {
            id: user().id,
            full_name: Some("Amira".into()),
            phone: None,
            skill_level: None,
        }),
        ..FakeBackend::default()
    };
    let mut out = Vec::new();
    sign_in(&backend, "player@summa.tn", "correct-horse", &mut out)
        .await
        .expect("sign in");
    assert_eq!(output(out), "Welcome, Amira\n");
}

#[tokio::test]
async fn wrong_password_surfaces_backend_message() {
    let err = sign_in(&FakeBackend::default(), "player@summa.tn", "nope", &mut Vec::new())
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "Invalid login credentials");
}

#[tokio::test]
async fn profile_card_uses_fallbacks_and_signs_out() {
    let backend = FakeBackend {
        profile: Some(Profile {
            id: user().id,
            full_name: None,
            phone: Some("+216 20 000 000".into()),
            skill_level: None,
        }),
        fail_logout: true,
        ..FakeBackend::default()
    };
    let mut out = Vec::new();
    show_profile(&backend, "player@summa.tn", "correct-horse", true, &mut out)
        .await
        .expect("profile");

    assert_eq!(
        output(out),
        "Name:  Not set\nPhone: +216 20 000 000\nLevel: Beginner\nSigned out.\n"
    );
    assert_eq!(
        backend.calls(),
        vec!["sign_in", "current_user", "fetch_profile", "sign_out"]
    );
}

#[tokio::test]
async fn profile_asks_to_sign_in_when_the_session_is_gone() {
    let backend = FakeBackend {
        token_rejected: true,
        ..FakeBackend::default()
    };
    let mut out = Vec::new();
    let err = show_profile(&backend, "player@summa.tn", "correct-horse", true, &mut out)
        .await
        .expect_err("must fail");

    assert_eq!(err.to_string(), "Please sign in first.");
    assert!(out.is_empty());
    assert_eq!(backend.calls(), vec!["sign_in", "current_user"]);
}

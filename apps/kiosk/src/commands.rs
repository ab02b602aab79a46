//! Handlers behind the kiosk subcommands.

use std::io::Write;

use anyhow::{bail, Context, Result};
use booking_client::{BookingBackend, ClientError};
use dispenser::{DispenserController, Session};
use shared::{domain::Beverage, protocol::Registration};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{info, warn};

use crate::{feedback::classify_auth_failure, render};

#[derive(Debug, Clone, Copy)]
pub struct PourRequest {
    pub beverage: Beverage,
    pub ice: bool,
    pub lemon: bool,
    pub json: bool,
}

/// Runs one pour the way a guest would at the machine and renders every
/// state change until the cup is full.
pub async fn run_pour(
    controller: &DispenserController,
    request: PourRequest,
    out: &mut impl Write,
) -> Result<Session> {
    let mut updates = BroadcastStream::new(controller.subscribe());

    if request.ice {
        controller.toggle_ice().await;
    }
    if request.lemon {
        controller.toggle_lemon().await;
    }
    if request.beverage.has_bubbles() {
        controller.open_soda_menu().await;
    }
    if !controller.select_beverage(request.beverage).await {
        bail!("dispenser is busy; take the current cup first");
    }

    while let Some(update) = updates.next().await {
        let session = match update {
            Ok(session) => session,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer fell behind; redrawing latest state");
                controller.snapshot().await
            }
        };
        if request.json {
            render::render_json(out, &session)?;
        } else {
            render::render_text(out, &session)?;
        }
        if session.is_full() {
            break;
        }
    }

    let session = controller.snapshot().await;
    info!(beverage = ?session.beverage(), "pour finished");
    Ok(session)
}

pub async fn list_courts(backend: &dyn BookingBackend, out: &mut impl Write) -> Result<()> {
    let courts = backend
        .list_active_courts()
        .await
        .context("failed to fetch active courts")?;

    if courts.is_empty() {
        writeln!(out, "No courts available right now.")?;
        return Ok(());
    }
    for court in &courts {
        writeln!(
            out,
            "{:<24} {:<12} {:>14}  Summa Padel Club, Tunis  Max. 4 Players",
            court.name,
            court.court_type,
            court.price_label()
        )?;
    }
    Ok(())
}

pub async fn sign_up(
    backend: &dyn BookingBackend,
    registration: &Registration,
    out: &mut impl Write,
) -> Result<()> {
    match backend.register(registration).await {
        Ok(outcome) if outcome.session.is_some() => {
            writeln!(out, "Registration successful! You are signed in.")?;
        }
        Ok(_) => writeln!(out, "Registration successful! Check your emails.")?,
        Err(err) => bail!(classify_auth_failure(&err)),
    }
    Ok(())
}

pub async fn sign_in(
    backend: &dyn BookingBackend,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> Result<()> {
    let session = match backend.sign_in_with_password(email, password).await {
        Ok(session) => session,
        Err(err) => bail!(classify_auth_failure(&err)),
    };

    let name = backend
        .profile_display_name(session.user.id)
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "could not load display name");
            None
        });
    writeln!(out, "Welcome, {}", name.as_deref().unwrap_or("Player"))?;
    if let Some(expires_at) = session.expires_at_utc() {
        writeln!(out, "Session valid until {expires_at}")?;
    }
    Ok(())
}

/// Signs in, prints the profile card, and optionally signs out again.
pub async fn show_profile(
    backend: &dyn BookingBackend,
    email: &str,
    password: &str,
    sign_out_after: bool,
    out: &mut impl Write,
) -> Result<()> {
    if let Err(err) = backend.sign_in_with_password(email, password).await {
        bail!(classify_auth_failure(&err));
    }
    let Some(user) = backend
        .current_user()
        .await
        .context("failed to load the signed-in user")?
    else {
        bail!(classify_auth_failure(&ClientError::NotSignedIn));
    };

    let profile = backend
        .fetch_profile(user.id)
        .await
        .context("failed to load profile")?;
    match profile {
        Some(profile) => {
            writeln!(out, "Name:  {}", profile.full_name_label())?;
            writeln!(out, "Phone: {}", profile.phone_label())?;
            writeln!(out, "Level: {}", profile.skill_level_label())?;
        }
        None => writeln!(
            out,
            "No profile found for {}",
            user.email.as_deref().unwrap_or("this account")
        )?,
    }

    if sign_out_after {
        // The kiosk leaves the account either way; a failed remote call is only logged.
        if let Err(err) = backend.sign_out().await {
            warn!(error = %err, "logout error");
        }
        writeln!(out, "Signed out.")?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;

//! Session commands: login, register, logout, status, whoami, profile update.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from OAKLINE_PASSWORD or stdin)
//! oak login -e a@b.com
//!
//! # Log in to the admin console
//! oak --scope admin login -e admin@oakline.example
//!
//! # Show the cached profile, or fetch it from the service
//! oak whoami
//! oak whoami --remote
//!
//! # Change the phone number on file
//! oak profile update --phone 555-0100
//! ```

use oakline_core::Email;
use oakline_session::{Credentials, ProfileChanges, Registration};
use secrecy::SecretString;
use serde_json::json;

use super::{CommandError, Context, print_json, print_line};

/// Log in and persist the session.
pub async fn login(
    ctx: &Context,
    email: &str,
    password: SecretString,
) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = Credentials::new(Email::parse(email).map_err(CommandError::from)?, password);

    ctx.session.login(&credentials).await?;

    let name = ctx
        .session
        .stored_user()
        .await
        .and_then(|user| user.name().map(str::to_owned))
        .unwrap_or_else(|| email.to_owned());
    tracing::info!(scope = %ctx.scope, "Logged in as {name}");
    Ok(())
}

/// Fields accepted by `oak register`.
pub struct RegisterArgs {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirmation: Option<SecretString>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Create an account. Logs in too if the service hands back a token.
pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(&args.email).map_err(CommandError::from)?;
    let registration = Registration {
        name: args.name,
        email,
        password_confirmation: args
            .password_confirmation
            .unwrap_or_else(|| args.password.clone()),
        password: args.password,
        phone: args.phone,
        address: args.address,
    };

    ctx.session.register(&registration).await?;

    if ctx.session.is_logged_in().await {
        tracing::info!("Account created and logged in");
    } else {
        tracing::info!("Account created; run `oak login` to sign in");
    }
    Ok(())
}

/// Log out. Always succeeds locally.
pub async fn logout(ctx: &Context) {
    ctx.session.logout().await;
}

/// Print the local session state without contacting the service.
pub async fn status(ctx: &Context) {
    let state = ctx.session.state().await;
    let user = ctx.session.stored_user().await;

    print_json(&json!({
        "scope": ctx.scope.to_string(),
        "state": state.to_string(),
        "user": user.map(|u| json!({
            "id": u.id().map(|id| id.as_i64()),
            "name": u.name(),
            "email": u.email(),
        })),
        "data_dir": ctx.data_dir.display().to_string(),
    }));
}

/// Print the cached profile, or with `remote` the service's current one.
pub async fn whoami(ctx: &Context, remote: bool) -> Result<(), Box<dyn std::error::Error>> {
    let profile = if remote {
        ctx.session.current_user().await?
    } else {
        ctx.session.stored_user().await.ok_or(CommandError::NotLoggedIn)?
    };
    print_json(&profile.into_value());
    Ok(())
}

/// Apply a partial profile update and print the service's response.
pub async fn update_profile(
    ctx: &Context,
    changes: ProfileChanges,
) -> Result<(), Box<dyn std::error::Error>> {
    if changes.is_empty() {
        print_line("Nothing to update");
        return Ok(());
    }
    let response = ctx.session.update_profile(&changes).await?;
    print_json(&response);
    Ok(())
}

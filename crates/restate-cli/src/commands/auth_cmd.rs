use std::str::FromStr;

use restate_core::auth::AuthError;
use restate_core::backend::{Backend, OAuthProvider};
use restate_core::screens::{SignInScreen, SignUpScreen, VerifyEmailScreen};
use restate_core::User;
use serde::Serialize;

use crate::cli::AuthCommands;
use crate::commands::common::{
    format_user, open_app, outcome_message, print_json, print_lines, App,
};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let app = open_app(global_profile)?;
    let lines = match command {
        AuthCommands::Login { email, password } => login(&app, &email, &password).await?,
        AuthCommands::Register {
            name,
            email,
            password,
        } => register(&app, &name, &email, &password).await?,
        AuthCommands::Logout => vec![logout(&app).await?],
        AuthCommands::Status { json } => {
            let report = status(&app).await;
            if json {
                return print_json(&report);
            }
            vec![report.describe()]
        }
        AuthCommands::Verify {
            link,
            user_id,
            secret,
        } => vec![verify(&app, link.as_deref(), user_id, secret).await?],
        AuthCommands::OauthUrl { provider, redirect } => {
            vec![oauth_url(&app, &provider, &redirect)?]
        }
        AuthCommands::OauthComplete { callback_url } => {
            vec![oauth_complete(&app, &callback_url).await?]
        }
    };
    print_lines(&lines);
    Ok(())
}

pub async fn login<B: Backend>(
    app: &App<B>,
    email: &str,
    password: &str,
) -> Result<Vec<String>, CliError> {
    let mut screen = SignInScreen::mount(app.auth.clone(), &app.scope)?;
    screen.email = email.to_string();
    screen.password = password.to_string();

    let outcome = screen.submit().await;
    outcome_message(&outcome)?;
    Ok(vec![format!(
        "Signed in profile '{}' as {}",
        app.profile_name,
        user_label(app.provider.user().as_ref())
    )])
}

pub async fn register<B: Backend>(
    app: &App<B>,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Vec<String>, CliError> {
    let mut screen = SignUpScreen::mount(app.auth.clone(), &app.scope)?;
    screen.name = name.to_string();
    screen.email = email.to_string();
    screen.password = password.to_string();

    let outcome = screen.submit().await;
    let mut lines = Vec::new();
    if let Some(message) = outcome_message(&outcome)? {
        lines.push(message);
    }
    lines.push(format!(
        "A verification email was sent to {}. Run `restate auth verify --link <url>` with the link it contains.",
        email.trim()
    ));
    Ok(lines)
}

/// A guest session (401) is reported as such; any other failure is an error.
pub async fn logout<B: Backend>(app: &App<B>) -> Result<String, CliError> {
    match app.auth.try_logout().await {
        Ok(()) => {
            app.provider.invalidate();
            Ok(format!("Signed out profile '{}'", app.profile_name))
        }
        Err(AuthError::Backend(error)) if error.is_unauthorized() => {
            app.provider.invalidate();
            Ok(format!("Profile '{}' has no active session", app.profile_name))
        }
        Err(error) => Err(error.into()),
    }
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub profile: String,
    pub is_logged_in: bool,
    pub user: Option<User>,
}

impl StatusReport {
    pub fn describe(&self) -> String {
        match &self.user {
            Some(user) => format!(
                "Profile '{}' is signed in as {}",
                self.profile,
                format_user(user)
            ),
            None => format!("Profile '{}' is not signed in.", self.profile),
        }
    }
}

pub async fn status<B: Backend>(app: &App<B>) -> StatusReport {
    app.provider.mount().await;
    let snapshot = app.provider.snapshot();
    StatusReport {
        profile: app.profile_name.clone(),
        is_logged_in: snapshot.is_logged_in,
        user: snapshot.user,
    }
}

pub async fn verify<B: Backend>(
    app: &App<B>,
    link: Option<&str>,
    user_id: Option<String>,
    secret: Option<String>,
) -> Result<String, CliError> {
    let mut screen = match link {
        Some(link) => VerifyEmailScreen::from_link(app.auth.clone(), link),
        None => VerifyEmailScreen::new(app.auth.clone(), user_id, secret),
    };

    outcome_message(&screen.on_params().await)?.ok_or_else(|| {
        CliError::Auth("Verification link is missing userId or secret".to_string())
    })
}

pub fn oauth_url<B: Backend>(
    app: &App<B>,
    provider: &str,
    redirect: &str,
) -> Result<String, CliError> {
    let provider = OAuthProvider::from_str(provider)?;
    Ok(app.auth.oauth_authorize_url(provider, redirect)?)
}

pub async fn oauth_complete<B: Backend>(
    app: &App<B>,
    callback_url: &str,
) -> Result<String, CliError> {
    app.auth.complete_oauth(callback_url).await?;
    app.provider.refetch(None).await;
    Ok(format!(
        "Signed in profile '{}' as {}",
        app.profile_name,
        user_label(app.provider.user().as_ref())
    ))
}

fn user_label(user: Option<&User>) -> String {
    user.map_or_else(|| "(unknown user)".to_string(), format_user)
}

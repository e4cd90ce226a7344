use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use restate_core::backend::MemoryBackend;
use restate_core::config::AppwriteConfig;
use restate_core::listings::{PropertyFilter, ALL_FILTER};
use restate_core::screens::{Alert, ScreenOutcome};
use serde_json::json;

use crate::cli::CompletionShell;
use crate::commands::auth_cmd::{
    login, logout, oauth_complete, oauth_url, register, status, verify,
};
use crate::commands::common::{format_property_lines, outcome_message, App};
use crate::commands::completions::render_completions;
use crate::commands::config::{describe_config, init_profile, missing_fields, validate_config};
use crate::commands::properties::{get, latest, list};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

fn config() -> AppwriteConfig {
    AppwriteConfig {
        database_id: Some("db".to_string()),
        properties_collection_id: Some("properties".to_string()),
        ..AppwriteConfig::default()
    }
}

fn app() -> (Arc<MemoryBackend>, App<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let app = App::new("test", &config(), Arc::clone(&backend));
    (backend, app)
}

fn seed_listings(backend: &MemoryBackend) {
    for (day, name, address, kind) in [
        (1, "Lake House", "7 Lake Rd", "House"),
        (2, "City Loft", "20 Main St", "Apartment"),
        (3, "Harbor Flat", "5 Lakeside Ave", "Apartment"),
    ] {
        backend.insert_document(
            "db",
            "properties",
            Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
            json!({ "name": name, "address": address, "type": kind, "price": 1200 }),
        );
    }
}

#[test]
fn outcome_message_turns_error_alerts_into_errors() {
    let error = outcome_message(&ScreenOutcome::alert(Alert::error("nope"))).unwrap_err();
    assert!(matches!(error, CliError::Auth(message) if message == "nope"));
    assert_eq!(
        outcome_message(&ScreenOutcome::alert(Alert::success("yay"))).unwrap(),
        Some("yay".to_string())
    );
    assert_eq!(outcome_message(&ScreenOutcome::none()).unwrap(), None);
}

#[tokio::test]
async fn login_reports_signed_in_user() {
    let (backend, app) = app();
    backend.seed_account("jane@example.com", "password123", "Jane Doe");

    let lines = login(&app, "jane@example.com", "password123").await.unwrap();
    assert_eq!(
        lines,
        vec!["Signed in profile 'test' as Jane Doe <jane@example.com>".to_string()]
    );
    assert!(status(&app).await.is_logged_in);
}

#[tokio::test]
async fn login_with_bad_password_fails_with_generic_message() {
    let (backend, app) = app();
    backend.seed_account("jane@example.com", "password123", "Jane Doe");

    let error = login(&app, "jane@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Authentication error: Invalid email or password. Please try again!"
    );
}

#[tokio::test]
async fn register_then_verify_from_link() {
    let (backend, app) = app();
    let lines = register(&app, "New User", "new@example.com", "password123")
        .await
        .unwrap();
    assert_eq!(
        lines[0],
        "Account created successfully. You can now log in."
    );

    let sent = backend.sent_verifications();
    let link = format!(
        "restate://verify-email?userId={}&secret={}",
        sent[0].token.user_id, sent[0].token.secret
    );
    let message = verify(&app, Some(&link), None, None).await.unwrap();
    assert_eq!(message, "Email verified successfully!");
    assert!(backend.accounts()[0].email_verification);
}

#[tokio::test]
async fn verify_without_params_is_an_error() {
    let (_backend, app) = app();
    let error = verify(&app, Some("restate://verify-email"), None, None)
        .await
        .unwrap_err();
    assert!(error.to_string().contains("missing userId or secret"));
}

#[tokio::test]
async fn logout_reports_missing_session() {
    let (backend, app) = app();
    assert_eq!(
        logout(&app).await.unwrap(),
        "Profile 'test' has no active session"
    );

    backend.seed_account("jane@example.com", "password123", "Jane");
    login(&app, "jane@example.com", "password123").await.unwrap();
    assert_eq!(logout(&app).await.unwrap(), "Signed out profile 'test'");
    assert!(!app.provider.is_logged_in());
}

#[tokio::test]
async fn logout_reports_backend_failure_cause() {
    let (backend, app) = app();
    backend.seed_account("jane@example.com", "password123", "Jane");
    login(&app, "jane@example.com", "password123").await.unwrap();
    backend.set_offline(true);

    let error = logout(&app).await.unwrap_err();
    assert_eq!(
        error.to_string(),
        "Authentication error: Backend unavailable: memory backend is offline"
    );
    assert!(app.provider.is_logged_in());
}

#[tokio::test]
async fn status_describes_guest() {
    let (_backend, app) = app();
    let report = status(&app).await;
    assert!(!report.is_logged_in);
    assert_eq!(report.describe(), "Profile 'test' is not signed in.");
}

#[tokio::test]
async fn oauth_round_trip() {
    let (backend, app) = app();
    let url = oauth_url(&app, "GitHub", "restate://oauth").unwrap();
    assert!(url.starts_with("memory://"));
    assert!(oauth_url(&app, "myspace", "restate://oauth").is_err());

    let account = backend.seed_account("oauth@example.com", "password123", "OAuth User");
    let token = backend.issue_login_token(&account.id);
    let callback = format!(
        "restate://oauth?userId={}&secret={}",
        account.id, token.secret
    );
    let message = oauth_complete(&app, &callback).await.unwrap();
    assert!(message.ends_with("OAuth User <oauth@example.com>"));
}

#[tokio::test]
async fn property_commands_read_listings() {
    let (backend, app) = app();
    seed_listings(&backend);

    let latest = latest(&app).await.unwrap();
    assert_eq!(latest[0].name, "Lake House");

    let apartments = list(&app, &PropertyFilter::new("Apartment", "lake", None))
        .await
        .unwrap();
    assert_eq!(apartments.len(), 1);
    assert_eq!(apartments[0].name, "Harbor Flat");

    let everything = list(&app, &PropertyFilter::new(ALL_FILTER, "", Some(2)))
        .await
        .unwrap();
    assert_eq!(everything.len(), 2);
    assert_eq!(format_property_lines(&everything).len(), 2);

    let rest = list(
        &app,
        &PropertyFilter::new(ALL_FILTER, "", Some(2)).with_offset(2),
    )
    .await
    .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "Lake House");

    let found = get(&app, &apartments[0].id).await.unwrap();
    assert_eq!(found.attributes.get("price"), Some(&json!(1200)));
    assert!(matches!(
        get(&app, "missing").await.unwrap_err(),
        CliError::PropertyNotFound(id) if id == "missing"
    ));
}

#[tokio::test]
async fn property_commands_surface_backend_errors() {
    let (backend, app) = app();
    backend.set_offline(true);
    assert!(latest(&app).await.is_err());
}

#[test]
fn init_profile_prefers_flags_over_env_over_stored() {
    let mut profiles = CliProfilesConfig::default();
    profiles.profile_mut_or_default("work").appwrite = AppwriteConfig {
        endpoint: Some("https://stored.example.com".to_string()),
        project_id: Some("stored".to_string()),
        database_id: Some("stored-db".to_string()),
        ..AppwriteConfig::default()
    };
    let env = AppwriteConfig {
        project_id: Some("env-project".to_string()),
        database_id: Some("env-db".to_string()),
        ..AppwriteConfig::default()
    };
    let flags = AppwriteConfig {
        database_id: Some("flag-db".to_string()),
        ..AppwriteConfig::default()
    };

    let name = init_profile(&mut profiles, Some("work"), flags, env, false).unwrap();
    assert_eq!(name, "work");
    assert_eq!(profiles.active_profile.as_deref(), Some("work"));
    let stored = &profiles.profile("work").unwrap().appwrite;
    assert_eq!(stored.endpoint.as_deref(), Some("https://stored.example.com"));
    assert_eq!(stored.project_id.as_deref(), Some("env-project"));
    assert_eq!(stored.database_id.as_deref(), Some("flag-db"));
    assert_eq!(missing_fields(stored), vec!["properties_collection_id"]);
}

#[test]
fn init_profile_rejects_invalid_endpoint() {
    let mut profiles = CliProfilesConfig::default();
    let flags = AppwriteConfig {
        endpoint: Some("cloud.appwrite.io".to_string()),
        ..AppwriteConfig::default()
    };
    let error = init_profile(&mut profiles, Some("bad"), flags, AppwriteConfig::default(), true)
        .unwrap_err();
    assert!(matches!(error, CliError::Config(_)));
    assert!(profiles.profile("bad").is_none());
}

#[test]
fn validate_config_requires_absolute_verification_url() {
    let config = AppwriteConfig {
        verification_url: Some("verify-email".to_string()),
        ..AppwriteConfig::default()
    };
    assert!(validate_config(&config).is_err());
    let config = AppwriteConfig {
        verification_url: Some("restate://verify-email".to_string()),
        ..AppwriteConfig::default()
    };
    assert!(validate_config(&config).is_ok());
}

#[test]
fn describe_config_marks_unset_values() {
    let lines = describe_config("default", &AppwriteConfig::default());
    assert!(lines.iter().any(|line| line.contains("endpoint") && line.contains("(not set)")));
    assert!(lines
        .iter()
        .any(|line| line.ends_with("restate://verify-email")));
}

#[test]
fn completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("restate"));
}

use std::sync::Arc;

use restate_core::auth::AuthService;
use restate_core::backend::{AppwriteClient, Backend};
use restate_core::config::AppwriteConfig;
use restate_core::listings::PropertyService;
use restate_core::screens::{Alert, ScreenOutcome};
use restate_core::state::{GlobalProvider, ProviderScope};
use restate_core::util::compact_text;
use restate_core::{Property, User};
use serde::Serialize;

use crate::auth::KeyringSessionStore;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Everything a command needs, wired the way the app shell wires its screens.
pub struct App<B> {
    pub profile_name: String,
    pub auth: AuthService<B>,
    pub provider: Arc<GlobalProvider<B>>,
    pub scope: ProviderScope<B>,
    pub listings: PropertyService<B>,
}

impl<B: Backend> App<B> {
    pub fn new(profile_name: impl Into<String>, config: &AppwriteConfig, backend: Arc<B>) -> Self {
        let auth = AuthService::new(Arc::clone(&backend), config);
        let provider = Arc::new(GlobalProvider::new(auth.clone()));
        Self {
            profile_name: profile_name.into(),
            scope: ProviderScope::new(Arc::clone(&provider)),
            listings: PropertyService::new(backend, config.properties_collection()),
            auth,
            provider,
        }
    }
}

pub type CliApp = App<AppwriteClient<KeyringSessionStore>>;

/// Build the Appwrite-backed app for the resolved profile.
pub fn open_app(global_profile: Option<&str>) -> Result<CliApp, CliError> {
    let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = profiles.resolve_profile_name(global_profile);
    let config = profiles.effective_config(&profile_name, AppwriteConfig::from_env());
    tracing::debug!("Using profile '{}'", profile_name);

    let client = AppwriteClient::new(&config, KeyringSessionStore::new(&profile_name))?;
    Ok(App::new(profile_name, &config, Arc::new(client)))
}

/// Turn a screen outcome into printed output, or an error for error alerts.
pub fn outcome_message(outcome: &ScreenOutcome) -> Result<Option<String>, CliError> {
    match &outcome.alert {
        Some(Alert { title, message }) if title == "Error" => Err(CliError::Auth(message.clone())),
        Some(alert) => Ok(Some(alert.message.clone())),
        None => Ok(None),
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyListItem<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub created_at: String,
}

pub fn property_to_list_item(property: &Property) -> PropertyListItem<'_> {
    PropertyListItem {
        id: &property.id,
        name: &property.name,
        address: &property.address,
        kind: &property.kind,
        created_at: property.created_at.to_rfc3339(),
    }
}

pub fn format_property_lines(properties: &[Property]) -> Vec<String> {
    properties
        .iter()
        .map(|property| {
            format!(
                "{}  {:<12} {} ({})",
                property.id,
                property.kind,
                compact_text(&property.name),
                compact_text(&property.address),
            )
        })
        .collect()
}

pub fn format_property_detail(property: &Property) -> Vec<String> {
    let mut lines = vec![
        format!("{} [{}]", property.name, property.kind),
        format!("id:       {}", property.id),
        format!("address:  {}", property.address),
        format!("listed:   {}", property.created_at.format("%Y-%m-%d")),
    ];
    for (key, value) in &property.attributes {
        let rendered = value
            .as_str()
            .map_or_else(|| value.to_string(), str::to_string);
        lines.push(format!("{key}: {rendered}"));
    }
    lines
}

pub fn format_user(user: &User) -> String {
    format!("{} <{}>", user.name, user.email)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

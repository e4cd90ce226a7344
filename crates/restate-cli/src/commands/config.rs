use restate_core::config::{normalize_endpoint, AppwriteConfig};
use serde_json::json;

use crate::cli::ConfigCommands;
use crate::commands::common::{print_json, print_lines};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            endpoint,
            project_id,
            database_id,
            properties_collection_id,
            galleries_collection_id,
            reviews_collection_id,
            agents_collection_id,
            verification_url,
            no_activate,
        } => {
            let explicit = AppwriteConfig {
                endpoint,
                project_id,
                platform: None,
                database_id,
                properties_collection_id,
                galleries_collection_id,
                reviews_collection_id,
                agents_collection_id,
                verification_url,
            };
            let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = init_profile(
                &mut config,
                profile.as_deref().or(global_profile),
                explicit,
                AppwriteConfig::from_env(),
                no_activate,
            )?;
            let path = config.save().map_err(CliError::Config)?;
            println!(
                "Profile '{}' initialized at {}",
                profile_name,
                path.display()
            );

            let stored = config.effective_config(&profile_name, AppwriteConfig::default());
            let missing = missing_fields(&stored);
            if missing.is_empty() {
                println!(
                    "Profile '{profile_name}' is ready. Run `restate auth login --email <email> --password <password>`."
                );
            } else {
                println!("Profile '{}' is missing: {}", profile_name, missing.join(", "));
            }
            Ok(())
        }
        ConfigCommands::Show { json } => {
            let config = CliProfilesConfig::load().map_err(CliError::Config)?;
            let profile_name = config.resolve_profile_name(global_profile);
            let effective = config.effective_config(&profile_name, AppwriteConfig::from_env());
            if json {
                return print_json(&json!({
                    "profile": profile_name,
                    "config": effective,
                }));
            }
            print_lines(&describe_config(&profile_name, &effective));
            Ok(())
        }
    }
}

/// Merge explicit flags over the environment over the stored profile, then validate.
pub fn init_profile(
    config: &mut CliProfilesConfig,
    profile_name: Option<&str>,
    explicit: AppwriteConfig,
    env: AppwriteConfig,
    no_activate: bool,
) -> Result<String, CliError> {
    let profile_name = config.resolve_profile_name(profile_name);
    let existing = config
        .profile(&profile_name)
        .map(|profile| profile.appwrite.clone())
        .unwrap_or_default();
    let merged = existing.merged_with(env).merged_with(explicit);
    validate_config(&merged)?;

    config.profile_mut_or_default(&profile_name).appwrite = merged;
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }
    Ok(profile_name)
}

pub fn validate_config(config: &AppwriteConfig) -> Result<(), CliError> {
    if let Some(endpoint) = config.endpoint.as_deref() {
        normalize_endpoint(endpoint).map_err(|error| CliError::Config(error.to_string()))?;
    }
    if let Some(url) = config.verification_url.as_deref() {
        if !url.contains("://") {
            return Err(CliError::Config(
                "verification_url must be an absolute URL (https:// or an app scheme)".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn missing_fields(config: &AppwriteConfig) -> Vec<&'static str> {
    [
        ("endpoint", &config.endpoint),
        ("project_id", &config.project_id),
        ("database_id", &config.database_id),
        ("properties_collection_id", &config.properties_collection_id),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| name)
    .collect()
}

pub fn describe_config(profile_name: &str, config: &AppwriteConfig) -> Vec<String> {
    let show = |value: &Option<String>| value.as_deref().unwrap_or("(not set)").to_string();
    vec![
        format!("profile:                  {profile_name}"),
        format!("endpoint:                 {}", show(&config.endpoint)),
        format!("project_id:               {}", show(&config.project_id)),
        format!("platform:                 {}", config.platform()),
        format!("database_id:              {}", show(&config.database_id)),
        format!(
            "properties_collection_id: {}",
            show(&config.properties_collection_id)
        ),
        format!(
            "galleries_collection_id:  {}",
            show(&config.galleries_collection_id)
        ),
        format!(
            "reviews_collection_id:    {}",
            show(&config.reviews_collection_id)
        ),
        format!(
            "agents_collection_id:     {}",
            show(&config.agents_collection_id)
        ),
        format!("verification_url:         {}", config.verification_url()),
    ]
}

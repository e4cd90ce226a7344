use restate_core::backend::Backend;
use restate_core::listings::PropertyFilter;
use restate_core::Property;

use crate::cli::PropertyCommands;
use crate::commands::common::{
    format_property_detail, format_property_lines, open_app, print_json, print_lines,
    property_to_list_item, App,
};
use crate::error::CliError;

pub async fn run_properties(
    command: PropertyCommands,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let app = open_app(global_profile)?;
    match command {
        PropertyCommands::Latest { json } => {
            let properties = latest(&app).await?;
            render_list(&properties, json)
        }
        PropertyCommands::List {
            filter,
            query,
            limit,
            offset,
            json,
        } => {
            let filter = PropertyFilter::new(filter, query, limit).with_offset(offset);
            let properties = list(&app, &filter).await?;
            render_list(&properties, json)
        }
        PropertyCommands::Get { id, json } => {
            let property = get(&app, &id).await?;
            if json {
                print_json(&property)
            } else {
                print_lines(&format_property_detail(&property));
                Ok(())
            }
        }
    }
}

pub async fn latest<B: Backend>(app: &App<B>) -> Result<Vec<Property>, CliError> {
    Ok(app.listings.try_latest_properties().await?)
}

pub async fn list<B: Backend>(
    app: &App<B>,
    filter: &PropertyFilter,
) -> Result<Vec<Property>, CliError> {
    Ok(app.listings.try_properties(filter).await?)
}

pub async fn get<B: Backend>(app: &App<B>, id: &str) -> Result<Property, CliError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::PropertyNotFound("(empty id)".to_string()));
    }
    app.listings
        .try_property_by_id(id)
        .await?
        .ok_or_else(|| CliError::PropertyNotFound(id.to_string()))
}

fn render_list(properties: &[Property], json: bool) -> Result<(), CliError> {
    if json {
        let items = properties
            .iter()
            .map(property_to_list_item)
            .collect::<Vec<_>>();
        return print_json(&items);
    }
    if properties.is_empty() {
        println!("No properties found.");
    } else {
        print_lines(&format_property_lines(properties));
    }
    Ok(())
}

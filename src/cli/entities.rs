//! `knowhub entities` command handlers

use crate::cli::output::{format_entities_json, format_entities_table};
use crate::cli::{user_error, EntitiesCommands, EntitiesListArgs};
use crate::client::ApiClient;
use crate::config::KnowhubConfig;
use crate::entities::EntitiesApi;

pub async fn handle_entities(
    cmd: &EntitiesCommands,
    config: &KnowhubConfig,
) -> anyhow::Result<String> {
    let client = ApiClient::from_config(config)?;
    let api = EntitiesApi::new(&client);

    match cmd {
        EntitiesCommands::List(args) => list(&api, args).await,
        EntitiesCommands::Get(args) => {
            let entity = api.get(&args.id).await.map_err(user_error)?;
            Ok(serde_json::to_string_pretty(&entity)?)
        }
        EntitiesCommands::Delete(args) => {
            api.delete(&args.id).await.map_err(user_error)?;
            Ok(format!("✓ Deleted entity {}", args.id))
        }
    }
}

async fn list(api: &EntitiesApi<'_>, args: &EntitiesListArgs) -> anyhow::Result<String> {
    let list = api
        .list(args.entity_type.as_deref())
        .await
        .map_err(user_error)?;

    if args.json {
        Ok(format_entities_json(&list.entities))
    } else if list.entities.is_empty() {
        Ok("No entities found".to_string())
    } else {
        Ok(format_entities_table(&list.entities))
    }
}

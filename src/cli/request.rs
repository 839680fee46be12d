//! `knowhub request` - raw API calls

use crate::cli::output::{format_debug_json, format_debug_table};
use crate::cli::{user_error, RequestArgs};
use crate::client::{ApiClient, RequestConfig};
use crate::config::KnowhubConfig;
use crate::debug::DebugPreferences;
use crate::entities::parse_json_field;
use serde_json::Value;

/// Handle `knowhub request`, returning the pretty-printed envelope.
///
/// With `--show-debug` the call log is written to stderr whether or not the
/// call succeeded, using the persisted panel filter.
pub async fn handle_request(
    args: &RequestArgs,
    config: &KnowhubConfig,
) -> anyhow::Result<String> {
    let body = args
        .body
        .as_deref()
        .map(|b| parse_json_field("body", b))
        .transpose()?;

    let client = ApiClient::from_config(config)?;
    let request_config = RequestConfig {
        query: args.query.clone(),
        ..Default::default()
    };

    let result = client
        .request::<Value, Value>(args.method, &args.path, body.as_ref(), Some(request_config))
        .await;

    if args.show_debug {
        eprintln!("{}", render_debug_log(&client, config, args.debug_json));
    }

    let envelope = result.map_err(user_error)?;
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Render the client's call log through the persisted panel filter, as a
/// table or, with `json`, as a JSON document.
pub fn render_debug_log(client: &ApiClient, config: &KnowhubConfig, json: bool) -> String {
    let Some(recorder) = client.recorder() else {
        return "Debug recording is disabled (debug.enabled = false)".to_string();
    };

    let prefs = DebugPreferences::load(&config.debug.state_dir).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable debug panel preferences");
        DebugPreferences::default()
    });
    let store = recorder.store();
    store.set_filter(prefs.filter);
    let entries = store.filtered_entries();
    if json {
        format_debug_json(&entries)
    } else {
        format_debug_table(&entries, store.filter())
    }
}

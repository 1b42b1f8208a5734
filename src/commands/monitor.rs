//! Monitor management commands.

use crate::api::types::Monitor;
use crate::api::{execute, DatadogClient};
use crate::cli::{MonitorCommand, MonitorState};
use crate::config::Config;
use crate::confirm::confirm_action;
use crate::error::CliError;
use crate::input;
use crate::output::{self, OutputFormat};
use crate::textutil::{format_tags, parse_tags, truncate_chars};
use crate::watch::watch_loop;
use chrono::Utc;
use comfy_table::{Cell, Color, Table};
use serde_json::{json, Value};

pub async fn run(cmd: MonitorCommand, config: &Config) -> Result<(), CliError> {
    let client = DatadogClient::new(config);
    let policy = config.retry_policy();

    match cmd {
        MonitorCommand::List {
            tags,
            state,
            format,
            output: output_path,
            watch,
            interval,
        } => {
            output::set_output_format(format);
            if watch {
                let client = &client;
                let policy = &policy;
                let tags = tags.as_deref();
                let state = &state;
                return watch_loop(
                    || async move {
                        let monitors =
                            execute(|| client.list_monitors(tags), policy).await?;
                        let monitors = filter_by_state(monitors, state);
                        let now = Utc::now().format("%Y-%m-%d %H:%M:%S");
                        Ok(format!(
                            "{}\nTotal monitors: {} | Last refresh: {now}",
                            monitor_table(&monitors),
                            monitors.len()
                        ))
                    },
                    interval,
                )
                .await;
            }

            let monitors = execute(|| client.list_monitors(tags.as_deref()), &policy).await?;
            let monitors = filter_by_state(monitors, &state);
            if let Some(path) = output_path {
                output::export_to_json(&monitors, &path)?;
                output::success(&format!("Exported {} monitors to {path}", monitors.len()));
                return Ok(());
            }
            match format {
                OutputFormat::Json => output::print_json(&monitors)?,
                OutputFormat::Table => {
                    println!("{}", monitor_table(&monitors));
                    output::note(&format!("Total monitors: {}", monitors.len()));
                }
            }
            Ok(())
        }

        MonitorCommand::Get { monitor_id, format } => {
            output::set_output_format(format);
            let monitor = execute(|| client.get_monitor(monitor_id), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&monitor)?,
                OutputFormat::Table => print_monitor_detail(&monitor),
            }
            Ok(())
        }

        MonitorCommand::Create {
            monitor_type,
            query,
            name,
            message,
            tags,
            priority,
            file,
            format,
        } => {
            output::set_output_format(format);
            let body = if let Some(source) = file {
                // File takes precedence over inline flags.
                input::load_json(&source)?
            } else {
                inline_monitor_body(monitor_type, query, name, message, tags, priority)?
            };
            let monitor = execute(|| client.create_monitor(&body), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&monitor)?,
                OutputFormat::Table => {
                    output::success(&format!(
                        "Monitor {} created",
                        monitor.id.unwrap_or_default()
                    ));
                    output::field("Name", monitor.name.as_deref().unwrap_or(""));
                }
            }
            Ok(())
        }

        MonitorCommand::Update {
            monitor_id,
            name,
            query,
            message,
            tags,
            priority,
            file,
            format,
        } => {
            output::set_output_format(format);
            let body = if let Some(source) = file {
                input::load_json(&source)?
            } else {
                let body = update_monitor_body(name, query, message, tags, priority);
                if body.as_object().is_some_and(|map| map.is_empty()) {
                    return Err(CliError::Usage(
                        "No update fields specified. Use flags or -f file.json".to_string(),
                    ));
                }
                body
            };
            let monitor = execute(|| client.update_monitor(monitor_id, &body), &policy).await?;
            match format {
                OutputFormat::Json => output::print_json(&monitor)?,
                OutputFormat::Table => {
                    output::success(&format!("Monitor {monitor_id} updated"));
                    output::field("Name", monitor.name.as_deref().unwrap_or(""));
                }
            }
            Ok(())
        }

        MonitorCommand::Delete { monitor_id, yes } => {
            if !confirm_action(&format!("Delete monitor {monitor_id}?"), yes) {
                output::warn("Aborted");
                return Ok(());
            }
            execute(|| client.delete_monitor(monitor_id), &policy).await?;
            output::success(&format!("Monitor {monitor_id} deleted"));
            Ok(())
        }

        MonitorCommand::Mute {
            monitor_id,
            scope,
            duration,
        } => {
            let end = duration.map(|secs| Utc::now().timestamp() + secs);
            let body = mute_body(scope.as_deref(), end);
            execute(|| client.update_monitor(monitor_id, &body), &policy).await?;
            output::success(&format!("Monitor {monitor_id} muted"));
            if let Some(secs) = duration {
                output::note(&format!("Muted for {secs} seconds"));
            }
            Ok(())
        }

        MonitorCommand::Unmute { monitor_id, scope } => {
            let body = match scope.as_deref() {
                // Scoped unmute keeps the other silenced scopes in place.
                Some(scope) => {
                    let monitor = execute(|| client.get_monitor(monitor_id), &policy).await?;
                    unmute_scope_body(&monitor, scope)
                }
                None => json!({ "options": { "silenced": {} } }),
            };
            execute(|| client.update_monitor(monitor_id, &body), &policy).await?;
            output::success(&format!("Monitor {monitor_id} unmuted"));
            Ok(())
        }

        MonitorCommand::Validate {
            monitor_type,
            query,
        } => {
            let body = json!({ "type": monitor_type, "query": query });
            let validation = execute(|| client.validate_monitor(&body), &policy).await?;
            if !validation.errors.is_empty() {
                for error in &validation.errors {
                    output::warn(&format!("  • {error}"));
                }
                return Err(CliError::General(
                    "monitor definition is invalid".to_string(),
                ));
            }
            output::success("Monitor definition is valid");
            Ok(())
        }

        MonitorCommand::MuteAll { message } => {
            let mut body = json!({ "scope": ["*"] });
            if let Some(message) = message {
                body["message"] = message.into();
            }
            let downtime = execute(|| client.create_downtime(&body), &policy).await?;
            output::success("All monitors muted");
            output::note(&format!(
                "Downtime ID: {}",
                downtime.id.unwrap_or_default()
            ));
            Ok(())
        }

        MonitorCommand::UnmuteAll => {
            let downtimes = execute(|| client.list_downtimes(), &policy).await?;
            let global: Vec<i64> = downtimes
                .iter()
                .filter(|downtime| downtime.is_global())
                .filter_map(|downtime| downtime.id)
                .collect();
            if global.is_empty() {
                output::warn("No global downtimes found");
                return Ok(());
            }
            for id in &global {
                execute(|| client.cancel_downtime(*id), &policy).await?;
            }
            output::success(&format!(
                "All monitors unmuted ({} downtime(s) cancelled)",
                global.len()
            ));
            Ok(())
        }
    }
}

/// Keep only monitors whose state matches one of the requested filters.
fn filter_by_state(monitors: Vec<Monitor>, states: &[MonitorState]) -> Vec<Monitor> {
    if states.is_empty() {
        return monitors;
    }
    monitors
        .into_iter()
        .filter(|monitor| states.iter().any(|state| state.api_name() == monitor.state()))
        .collect()
}

fn state_color(state: &str) -> Color {
    match state {
        "Alert" => Color::Red,
        "Warn" => Color::Yellow,
        "OK" => Color::Green,
        "No Data" => Color::DarkGrey,
        _ => Color::White,
    }
}

fn monitor_table(monitors: &[Monitor]) -> Table {
    let mut table = output::new_table(&["ID", "State", "Name", "Tags"]);
    for monitor in monitors {
        let state = monitor.state();
        table.add_row(vec![
            Cell::new(monitor.id.map(|id| id.to_string()).unwrap_or_default()),
            Cell::new(state).fg(state_color(state)),
            Cell::new(truncate_chars(monitor.name.as_deref().unwrap_or(""), 60)),
            Cell::new(format_tags(&monitor.tags, 3)),
        ]);
    }
    table
}

fn print_monitor_detail(monitor: &Monitor) {
    output::title(&format!("Monitor #{}", monitor.id.unwrap_or_default()));
    output::field("Name", monitor.name.as_deref().unwrap_or(""));
    output::field("Type", monitor.monitor_type.as_deref().unwrap_or(""));
    output::field("State", monitor.state());
    output::field("Query", monitor.query.as_deref().unwrap_or(""));
    if let Some(message) = &monitor.message {
        output::field("Message", message);
    }
    if !monitor.tags.is_empty() {
        output::field("Tags", &monitor.tags.join(", "));
    }
    if let Some(created) = &monitor.created {
        output::field("Created", created);
    }
    if let Some(modified) = &monitor.modified {
        output::field("Modified", modified);
    }
}

/// Monitor body from inline flags; `--type`, `--query`, and `--name` are
/// required when no file is given.
fn inline_monitor_body(
    monitor_type: Option<String>,
    query: Option<String>,
    name: Option<String>,
    message: Option<String>,
    tags: Option<String>,
    priority: Option<i64>,
) -> Result<Value, CliError> {
    let monitor_type = monitor_type
        .ok_or_else(|| CliError::Usage("Missing option '--type' (required without -f)".into()))?;
    let query = query
        .ok_or_else(|| CliError::Usage("Missing option '--query' (required without -f)".into()))?;
    let name = name
        .ok_or_else(|| CliError::Usage("Missing option '--name' (required without -f)".into()))?;

    let mut body = json!({ "type": monitor_type, "query": query, "name": name });
    if let Some(message) = message {
        body["message"] = message.into();
    }
    if let Some(tags) = tags {
        body["tags"] = parse_tags(&tags).into();
    }
    if let Some(priority) = priority {
        body["priority"] = priority.into();
    }
    Ok(body)
}

fn update_monitor_body(
    name: Option<String>,
    query: Option<String>,
    message: Option<String>,
    tags: Option<String>,
    priority: Option<i64>,
) -> Value {
    let mut body = json!({});
    if let Some(name) = name {
        body["name"] = name.into();
    }
    if let Some(query) = query {
        body["query"] = query.into();
    }
    if let Some(message) = message {
        body["message"] = message.into();
    }
    if let Some(tags) = tags {
        body["tags"] = parse_tags(&tags).into();
    }
    if let Some(priority) = priority {
        body["priority"] = priority.into();
    }
    body
}

/// Silence the given scope (or everything) until `end`, on top of whatever
/// is already silenced.
fn mute_body(scope: Option<&str>, end: Option<i64>) -> Value {
    let mut silenced = serde_json::Map::new();
    silenced.insert(
        scope.unwrap_or("*").to_string(),
        end.map(Value::from).unwrap_or(Value::Null),
    );
    json!({ "options": { "silenced": silenced } })
}

/// Drop one scope from the monitor's silenced map, keeping the rest.
fn unmute_scope_body(monitor: &Monitor, scope: &str) -> Value {
    let mut silenced = monitor
        .options
        .as_ref()
        .and_then(|options| options.get("silenced"))
        .cloned()
        .unwrap_or_else(|| json!({}));
    if let Some(map) = silenced.as_object_mut() {
        map.remove(scope);
    }
    json!({ "options": { "silenced": silenced } })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: i64, state: &str, tags: &[&str]) -> Monitor {
        Monitor {
            id: Some(id),
            name: Some(format!("monitor-{id}")),
            overall_state: Some(state.to_string()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Monitor::default()
        }
    }

    #[test]
    fn state_filter_matches_api_names() {
        let monitors = vec![
            monitor(1, "Alert", &[]),
            monitor(2, "OK", &[]),
            monitor(3, "No Data", &[]),
        ];
        let filtered = filter_by_state(monitors.clone(), &[MonitorState::Alert]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, Some(1));

        let filtered = filter_by_state(monitors.clone(), &[MonitorState::Ok, MonitorState::NoData]);
        assert_eq!(filtered.len(), 2);

        let unfiltered = filter_by_state(monitors, &[]);
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn inline_body_requires_type_query_name() {
        let err = inline_monitor_body(None, Some("q".into()), Some("n".into()), None, None, None)
            .unwrap_err();
        assert!(err.to_string().contains("--type"));

        let body = inline_monitor_body(
            Some("metric alert".into()),
            Some("avg:cpu{*} > 90".into()),
            Some("cpu high".into()),
            None,
            Some("env:prod, team:core".into()),
            Some(2),
        )
        .unwrap();
        assert_eq!(body["type"], "metric alert");
        assert_eq!(body["tags"], json!(["env:prod", "team:core"]));
        assert_eq!(body["priority"], 2);
        assert!(body.get("message").is_none());
    }

    #[test]
    fn update_body_is_empty_without_flags() {
        let body = update_monitor_body(None, None, None, None, None);
        assert!(body.as_object().unwrap().is_empty());
    }

    #[test]
    fn mute_body_defaults_to_star_scope() {
        assert_eq!(
            mute_body(None, None),
            json!({ "options": { "silenced": { "*": null } } })
        );
        assert_eq!(
            mute_body(Some("host:web-1"), Some(1_900_000_000)),
            json!({ "options": { "silenced": { "host:web-1": 1_900_000_000i64 } } })
        );
    }

    #[test]
    fn unmute_scope_keeps_other_scopes() {
        let mut target = monitor(1, "OK", &[]);
        target.options = Some(json!({
            "silenced": { "host:web-1": null, "host:web-2": 123 }
        }));
        let body = unmute_scope_body(&target, "host:web-1");
        assert_eq!(
            body,
            json!({ "options": { "silenced": { "host:web-2": 123 } } })
        );
    }

    #[test]
    fn table_renders_states_and_truncated_tags() {
        let monitors = vec![monitor(7, "Alert", &["a:1", "b:2", "c:3", "d:4"])];
        let rendered = monitor_table(&monitors).to_string();
        assert!(rendered.contains("monitor-7"));
        assert!(rendered.contains("+1 more"));
    }
}

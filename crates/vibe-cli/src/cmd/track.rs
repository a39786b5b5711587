use crate::output::print_json;
use serde_json::{Map, Value};
use vibe_core::store::AnalyticsStore;
use vibe_core::types::NewProject;

/// The wizard lets a project combine at most this many types.
const MAX_TYPES: usize = 3;

/// Parse `key=value` for `--stack` / `--env`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn to_map(pairs: Vec<(String, String)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

pub fn run(
    store: &AnalyticsStore,
    name: String,
    path: String,
    types: Vec<String>,
    stack: Vec<(String, String)>,
    env: Vec<(String, String)>,
    json: bool,
) -> anyhow::Result<()> {
    if types.len() > MAX_TYPES {
        anyhow::bail!("at most {MAX_TYPES} project types allowed, got {}", types.len());
    }

    let project = NewProject {
        project_name: name,
        project_path: path,
        project_types: types,
        tech_stack: to_map(stack),
        environment: to_map(env),
    };

    let Some(id) = store.track_project(project) else {
        anyhow::bail!(
            "failed to record project; details in {}",
            store.config().error_log_path().display()
        );
    };

    if json {
        print_json(&serde_json::json!({ "id": id }))?;
    } else {
        println!("Tracked project {id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_parsing() {
        assert_eq!(
            parse_key_val("backend=Node.js + Express").unwrap(),
            ("backend".to_string(), "Node.js + Express".to_string())
        );
        assert_eq!(
            parse_key_val("database=").unwrap(),
            ("database".to_string(), String::new())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }
}

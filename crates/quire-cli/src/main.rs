use anyhow::{Context, Result};
use quire_config::Config;
use quire_engine::{Cmd, DirectionPolicy, Document, EditContext, Patch, Selection};
use serde_json::json;
use std::{env, fs, path::PathBuf, process};

struct Invocation {
    document_path: PathBuf,
    command_path: PathBuf,
    write: bool,
}

fn parse_args(args: &[String], config: &Config) -> Option<Invocation> {
    let (positional, flags): (Vec<&String>, Vec<&String>) =
        args.iter().skip(1).partition(|arg| !arg.starts_with("--"));
    if positional.len() != 2 || flags.iter().any(|flag| flag.as_str() != "--write") {
        return None;
    }
    Some(Invocation {
        document_path: config.resolve_document(positional[0]),
        command_path: PathBuf::from(positional[1]),
        write: !flags.is_empty(),
    })
}

fn edit_context(config: &Config) -> EditContext<'static> {
    let direction_policy = if config.reject_unknown_direction {
        DirectionPolicy::Reject
    } else {
        DirectionPolicy::Ignore
    };
    EditContext::new().with_direction_policy(direction_policy)
}

fn with_surface(selection: Selection, surface_id: Option<&str>) -> Selection {
    match (selection, surface_id) {
        (Selection::Property(selection), Some(surface_id)) => {
            Selection::Property(selection.with_surface(surface_id))
        }
        (Selection::Container(selection), Some(surface_id)) => {
            Selection::Container(selection.with_surface(surface_id))
        }
        (selection, _) => selection,
    }
}

fn report(patch: Patch, config: &Config) -> serde_json::Value {
    let selection = patch
        .selection
        .map(|selection| with_surface(selection, config.default_surface.as_deref()).to_json());
    json!({
        "outcome": patch.outcome,
        "version": patch.version,
        "changes": patch.changes,
        "selection": selection,
    })
}

fn run(invocation: &Invocation, config: &Config) -> Result<()> {
    let source = fs::read_to_string(&invocation.document_path).with_context(|| {
        format!(
            "Failed to read document {}",
            invocation.document_path.display()
        )
    })?;
    let mut document = Document::from_json(&source).with_context(|| {
        format!(
            "Failed to load document {}",
            invocation.document_path.display()
        )
    })?;
    let command = fs::read_to_string(&invocation.command_path).with_context(|| {
        format!(
            "Failed to read command {}",
            invocation.command_path.display()
        )
    })?;
    let cmd: Cmd = serde_json::from_str(&command).context("Failed to parse command")?;

    let patch = document.apply(cmd, &edit_context(config))?;
    log::info!(
        "command finished with {:?} at version {}",
        patch.outcome,
        patch.version
    );
    println!("{}", serde_json::to_string_pretty(&report(patch, config))?);

    if invocation.write {
        fs::write(&invocation.document_path, document.to_json()?).with_context(|| {
            format!(
                "Failed to write document {}",
                invocation.document_path.display()
            )
        })?;
        log::info!("Saved {}", invocation.document_path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    log::info!("Config path: {}", config_path.display());

    let Some(invocation) = parse_args(&args, &config) else {
        let program_name = args.first().map(String::as_str).unwrap_or("quire-cli");
        eprintln!("Usage: {program_name} <document.json> <command.json> [--write]");
        process::exit(1);
    };

    run(&invocation, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("quire-cli")
            .chain(values.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_args_requires_document_and_command() {
        let config = Config::default();

        assert!(parse_args(&args(&["doc.json"]), &config).is_none());
        assert!(parse_args(&args(&["doc.json", "cmd.json", "--force"]), &config).is_none());

        let invocation = parse_args(&args(&["doc.json", "cmd.json", "--write"]), &config).unwrap();
        assert_eq!(invocation.document_path, PathBuf::from("doc.json"));
        assert_eq!(invocation.command_path, PathBuf::from("cmd.json"));
        assert!(invocation.write);
    }

    #[test]
    fn test_edit_context_follows_config() {
        let strict = Config {
            reject_unknown_direction: true,
            ..Config::default()
        };

        assert_eq!(
            edit_context(&strict).direction_policy,
            DirectionPolicy::Reject
        );
        assert_eq!(
            edit_context(&Config::default()).direction_policy,
            DirectionPolicy::Ignore
        );
    }

    #[test]
    fn test_report_stamps_the_default_surface() {
        let mut document = Document::from_json(
            r#"{"nodes": [
                {"id": "p1", "type": "paragraph", "content": {"text": "foo"}},
                {"id": "p2", "type": "paragraph", "content": {"text": "bar"}},
                {"id": "body", "type": "container", "content": {"container": ["p1", "p2"]}}
            ]}"#,
        )
        .unwrap();
        let cmd: Cmd = serde_json::from_str(
            r#"{"command": "merge", "containerId": "body", "path": ["p1", "content"], "direction": "right"}"#,
        )
        .unwrap();
        let config = Config {
            default_surface: Some("main".to_string()),
            ..Config::default()
        };

        let patch = document.apply(cmd, &edit_context(&config)).unwrap();
        let report = report(patch, &config);

        assert_eq!(report["outcome"], json!({"outcome": "applied"}));
        assert_eq!(report["version"], json!(1));
        assert_eq!(report["selection"]["surfaceId"], json!("main"));
        assert_eq!(report["selection"]["startOffset"], json!(3));
    }
}

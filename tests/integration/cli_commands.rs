use super::support::write_sop;
use agent_sop::config::SopConfig;
use agent_sop::tooling::{Cli, CliContext, Commands, SourceArgs};
use agent_sop::SopError;
use clap::Parser;
use std::path::PathBuf;
use tempfile::TempDir;

fn local_only(dir: &std::path::Path) -> SourceArgs {
    SourceArgs {
        sop_source: Vec::new(),
        sop_paths: Some(dir.display().to_string()),
        no_builtin: true,
    }
}

#[test]
fn parses_repeated_sources_and_global_flags() {
    let cli = Cli::try_parse_from([
        "agent-sop",
        "list",
        "--sop-source",
        "type=s3,bucket=first",
        "--sop-source",
        "type=s3,bucket=second,prefix=team/",
        "--sop-paths",
        "/a:/b",
        "--format",
        "json",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    match cli.command {
        Commands::List { format, sources } => {
            assert_eq!(format, "json");
            assert_eq!(
                sources.sop_source,
                vec!["type=s3,bucket=first", "type=s3,bucket=second,prefix=team/"]
            );
            assert_eq!(sources.sop_paths.as_deref(), Some("/a:/b"));
            assert!(!sources.no_builtin);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn skills_defaults_output_directory() {
    let cli = Cli::try_parse_from(["agent-sop", "skills", "--no-builtin"]).unwrap();
    match cli.command {
        Commands::Skills {
            output_dir,
            sources,
        } => {
            assert_eq!(output_dir, PathBuf::from("skills"));
            assert!(sources.no_builtin);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn rejects_unknown_list_format() {
    assert!(Cli::try_parse_from(["agent-sop", "list", "--format", "yaml"]).is_err());
}

#[test]
fn mcp_accepts_source_flags() {
    let cli = Cli::try_parse_from(["agent-sop", "mcp", "--sop-paths", "/sops", "--no-builtin"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Mcp { ref sources } if sources.sop_paths.as_deref() == Some("/sops")
    ));
}

#[test]
fn list_json_reports_sops_and_diagnostics() {
    let temp = TempDir::new().unwrap();
    let sops = temp.path().join("sops");
    write_sop(&sops, "deploy", "# Deploy\n\n## Overview\nShip it.\n");
    let missing = temp.path().join("missing");

    let context = CliContext::with_config(SopConfig::default()).unwrap();
    let args = SourceArgs {
        sop_paths: Some(format!("{}:{}", sops.display(), missing.display())),
        no_builtin: true,
        ..SourceArgs::default()
    };
    let output = context
        .execute(&Commands::List {
            format: "json".to_string(),
            sources: args,
        })
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["total"], 1);
    assert_eq!(value["sops"][0]["name"], "deploy");
    assert_eq!(value["sops"][0]["description"], "Ship it.");
    assert_eq!(value["diagnostics"][0]["kind"], "source_unavailable");
}

#[test]
fn list_text_renders_a_table() {
    let temp = TempDir::new().unwrap();
    write_sop(temp.path(), "deploy", "# Deploy\n");

    let context = CliContext::with_config(SopConfig::default()).unwrap();
    let output = context
        .execute(&Commands::List {
            format: "text".to_string(),
            sources: local_only(temp.path()),
        })
        .unwrap();

    assert!(output.contains("deploy"));
    assert!(output.contains("Total: 1 SOP(s)"));
}

#[test]
fn skills_command_writes_skill_files() {
    let temp = TempDir::new().unwrap();
    let sops = temp.path().join("sops");
    write_sop(&sops, "deploy", "# Deploy\n");
    write_sop(&sops, "triage", "# Triage\n");
    let output_dir = temp.path().join("skills");

    let context = CliContext::with_config(SopConfig::default()).unwrap();
    let output = context
        .execute(&Commands::Skills {
            output_dir: output_dir.clone(),
            sources: local_only(&sops),
        })
        .unwrap();

    assert!(output.contains("2 skill(s) generated"));
    assert!(output_dir.join("deploy").join("SKILL.md").is_file());
    assert!(output_dir.join("triage").join("SKILL.md").is_file());
}

#[test]
fn configured_paths_apply_when_flags_are_absent() {
    let temp = TempDir::new().unwrap();
    let sops = temp.path().join("sops");
    write_sop(&sops, "configured", "# Configured\n");
    let config_path = temp.path().join("config.yaml");
    std::fs::write(
        &config_path,
        format!(
            "sources:\n  sop_paths: \"{}\"\n  include_builtin: false\n",
            sops.display()
        ),
    )
    .unwrap();

    let context = CliContext::new(Some(config_path)).unwrap();
    let output = context
        .execute(&Commands::List {
            format: "json".to_string(),
            sources: SourceArgs::default(),
        })
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["total"], 1);
    assert_eq!(value["sops"][0]["name"], "configured");
}

#[test]
fn missing_config_file_is_a_config_error() {
    let temp = TempDir::new().unwrap();
    let result = CliContext::new(Some(temp.path().join("absent.yaml")));
    assert!(matches!(result, Err(SopError::ConfigError(_))));
}

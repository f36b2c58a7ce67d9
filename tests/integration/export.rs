use super::support::{catalog, write_sop};
use agent_sop::export::{export_skills, SkillFrontmatter, SKILL_FILE_NAME};
use agent_sop::source::SourceSpec;
use agent_sop::Resolver;
use std::fs;
use tempfile::TempDir;

fn frontmatter(skill: &str) -> (SkillFrontmatter, String) {
    let rest = skill.strip_prefix("---\n").unwrap();
    let (yaml, body) = rest.split_once("---\n\n").unwrap();
    (serde_yaml::from_str(yaml).unwrap(), body.to_string())
}

#[tokio::test]
async fn exports_one_skill_directory_per_resolved_document() {
    let temp = TempDir::new().unwrap();
    let sops = temp.path().join("sops");
    write_sop(
        &sops,
        "deploy",
        "# Deploy\n\n## Overview\nRoll out a release safely.\n\n## Steps\n1. Ship\n",
    );
    let resolution = Resolver::new()
        .with_builtin_catalog(catalog(&[("deploy", "# Shadowed"), ("triage", "# Triage\n")]))
        .resolve(&[SourceSpec::local(&sops), SourceSpec::BuiltIn])
        .await;

    let output = temp.path().join("out").join("skills");
    let report = export_skills(&resolution.registry, &output).unwrap();

    assert_eq!(report.output_dir, output);
    assert_eq!(
        report.written,
        vec![
            output.join("deploy").join(SKILL_FILE_NAME),
            output.join("triage").join(SKILL_FILE_NAME),
        ]
    );

    let (deploy, body) = frontmatter(&fs::read_to_string(&report.written[0]).unwrap());
    assert_eq!(deploy.name, "deploy");
    assert_eq!(deploy.description, "Roll out a release safely.");
    assert_eq!(deploy.skill_type, "anthropic-skill");
    assert!(body.starts_with("# Deploy\n"));

    let (triage, body) = frontmatter(&fs::read_to_string(&report.written[1]).unwrap());
    assert_eq!(triage.description, "Agent SOP: triage");
    assert_eq!(body, "# Triage\n");
}

#[tokio::test]
async fn empty_registry_still_creates_output_directory() {
    let temp = TempDir::new().unwrap();
    let resolution = Resolver::new().resolve(&[]).await;
    let output = temp.path().join("skills");

    let report = export_skills(&resolution.registry, &output).unwrap();
    assert!(report.written.is_empty());
    assert!(output.is_dir());
}

#[tokio::test]
async fn existing_skill_files_are_overwritten() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("skills");
    fs::create_dir_all(output.join("triage")).unwrap();
    fs::write(output.join("triage").join(SKILL_FILE_NAME), "stale").unwrap();

    let resolution = Resolver::new()
        .with_builtin_catalog(catalog(&[("triage", "# Triage\n")]))
        .resolve(&[SourceSpec::BuiltIn])
        .await;
    export_skills(&resolution.registry, &output).unwrap();

    let written = fs::read_to_string(output.join("triage").join(SKILL_FILE_NAME)).unwrap();
    assert!(written.ends_with("# Triage\n"));
    assert!(!written.contains("stale"));
}

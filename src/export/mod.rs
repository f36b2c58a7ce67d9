//! Skills export: one `<name>/SKILL.md` per registry entry.

use crate::error::SopError;
use crate::resolve::{Registry, ResolvedDocument};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SKILL_FILE_NAME: &str = "SKILL.md";
const SKILL_TYPE: &str = "anthropic-skill";
const SKILL_VERSION: &str = "1.0";

/// YAML frontmatter at the top of each skill file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillFrontmatter {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub skill_type: String,
    pub version: String,
}

impl SkillFrontmatter {
    fn for_document(doc: &ResolvedDocument) -> Self {
        Self {
            name: doc.name.clone(),
            description: doc
                .description
                .clone()
                .unwrap_or_else(|| format!("Agent SOP: {}", doc.name)),
            skill_type: SKILL_TYPE.to_string(),
            version: SKILL_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
}

/// Render the full skill file for one document.
pub fn render_skill(doc: &ResolvedDocument) -> Result<String, SopError> {
    let frontmatter = serde_yaml::to_string(&SkillFrontmatter::for_document(doc))
        .map_err(|e| SopError::ExportError(format!("frontmatter for {}: {}", doc.name, e)))?;
    Ok(format!("---\n{}---\n\n{}", frontmatter, doc.content))
}

/// Write every registry entry to `<output_dir>/<name>/SKILL.md`, creating directories as needed.
pub fn export_skills(registry: &Registry, output_dir: &Path) -> Result<ExportReport, SopError> {
    fs::create_dir_all(output_dir).map_err(|e| {
        SopError::ExportError(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let mut report = ExportReport {
        output_dir: output_dir.to_path_buf(),
        written: Vec::with_capacity(registry.len()),
    };

    for doc in registry.all() {
        let skill_dir = output_dir.join(&doc.name);
        fs::create_dir_all(&skill_dir).map_err(|e| {
            SopError::ExportError(format!(
                "Failed to create skill directory {}: {}",
                skill_dir.display(),
                e
            ))
        })?;
        let skill_file = skill_dir.join(SKILL_FILE_NAME);
        fs::write(&skill_file, render_skill(doc)?).map_err(|e| {
            SopError::ExportError(format!("Failed to write {}: {}", skill_file.display(), e))
        })?;
        debug!(skill = %doc.name, path = %skill_file.display(), "Wrote skill");
        report.written.push(skill_file);
    }

    info!(
        skills = report.written.len(),
        output_dir = %output_dir.display(),
        "Skills exported"
    );
    Ok(report)
}

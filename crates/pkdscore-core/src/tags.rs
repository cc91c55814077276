use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sectors;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,
    /// PKD section the tag's posts are attributed to.
    pub pkd: String,
}

#[derive(Debug, Deserialize)]
pub struct TagsFile {
    pub tags: Vec<TagConfig>,
}

/// Load and validate the monitored tags from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tags(path: &Path) -> Result<TagsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TagsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut tags_file: TagsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::TagsFileParse)?;

    for tag in &mut tags_file.tags {
        tag.pkd = sectors::normalize_code(&tag.pkd);
    }

    validate_tags(&tags_file)?;

    Ok(tags_file)
}

fn validate_tags(tags_file: &TagsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for tag in &tags_file.tags {
        if tag.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tag name must be non-empty".to_string(),
            ));
        }

        if sectors::section(&tag.pkd).is_none() {
            return Err(ConfigError::Validation(format!(
                "tag '{}' points at unknown PKD section '{}'",
                tag.name, tag.pkd
            )));
        }

        if !seen.insert(tag.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate tag: '{}'",
                tag.name
            )));
        }
    }

    Ok(())
}

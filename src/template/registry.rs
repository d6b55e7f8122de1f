//! Template registry and name resolution.

use super::builtin::{self, DEFAULT_KEY};
use super::TemplateConfig;
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// An immutable-by-default table of journal templates.
///
/// The registry always contains a `default` entry, which is the first entry
/// and the fallback for unknown names.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    entries: Vec<TemplateConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TemplateFile {
    Many(Vec<TemplateConfig>),
    One(Box<TemplateConfig>),
}

impl TemplateRegistry {
    /// Create a registry holding the built-in journal templates.
    pub fn builtin() -> Self {
        Self {
            entries: builtin::templates(),
        }
    }

    /// Add or replace a template. The config is validated first.
    pub fn insert(&mut self, mut config: TemplateConfig) -> Result<()> {
        config.key = config.key.trim().to_lowercase();
        config.validate()?;

        match self.entries.iter_mut().find(|e| e.key == config.key) {
            Some(existing) => {
                log::debug!("Replacing template '{}'", config.key);
                *existing = config;
            }
            None => self.entries.push(config),
        }
        Ok(())
    }

    /// Add templates from a JSON document holding one template or an array of them.
    ///
    /// Returns the number of templates loaded.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize> {
        let configs = match serde_json::from_str::<TemplateFile>(json)? {
            TemplateFile::Many(configs) => configs,
            TemplateFile::One(config) => vec![*config],
        };
        let count = configs.len();
        for config in configs {
            self.insert(config)?;
        }
        Ok(count)
    }

    /// Add templates from a JSON file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let count = self.extend_from_json(&json)?;
        log::info!(
            "Loaded {} template(s) from {}",
            count,
            path.as_ref().display()
        );
        Ok(count)
    }

    /// Look up a template by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&TemplateConfig> {
        let key = name.trim().to_lowercase();
        self.entries.iter().find(|e| e.key == key)
    }

    /// Resolve a template name, falling back to the default template when the
    /// name is omitted or unknown.
    pub fn resolve(&self, name: Option<&str>) -> &TemplateConfig {
        match name {
            None => self.default_config(),
            Some(name) => self.get(name).unwrap_or_else(|| {
                log::warn!(
                    "Unknown template '{}', using '{}' (available: {})",
                    name,
                    DEFAULT_KEY,
                    self.names().join(", ")
                );
                self.default_config()
            }),
        }
    }

    /// Check if a template name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The fallback template.
    pub fn default_config(&self) -> &TemplateConfig {
        &self.entries[0]
    }

    /// Template keys in display order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Iterate over templates in display order.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateConfig> {
        self.entries.iter()
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; the default template is never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

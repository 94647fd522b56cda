//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Context for rendering the coach system template
#[derive(Debug, Clone, Serialize)]
pub struct SystemContext {
    /// Human-readable current date, e.g. "Thursday, August 6, 2026"
    pub today: String,
    /// One descriptive line per domain
    pub goals: String,
    /// Comma-joined enumeration of the ids the provider may reference
    pub valid_ids: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g. `~/.config/mentord/prompts/`)
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader with an optional override directory
    pub fn new(override_dir: Option<&Path>) -> Self {
        let override_dir = override_dir
            .filter(|dir| dir.exists())
            .map(Path::to_path_buf);

        Self {
            hbs: Handlebars::new(),
            override_dir,
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        Self {
            hbs: Handlebars::new(),
            override_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks the override directory for `{name}.pmt` first, then falls
    /// back to the embedded constant.
    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render the coach system framing
    pub fn render_system(&self, context: &SystemContext) -> Result<String> {
        let template = self.load_template("coach-system")?;

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render coach-system template: {}", e))
    }
}

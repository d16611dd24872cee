//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::PromptError;
use super::embedded;

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.bakenplanner/prompts/`)
    user_dir: Option<PathBuf>,
    /// Working-directory default (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a prompt loader rooted at `workdir`
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        let workdir = workdir.as_ref();
        debug!(?workdir, "PromptLoader::new: called");
        let user_dir = workdir.join(".bakenplanner/prompts");
        let repo_dir = workdir.join("prompts");

        Self {
            hbs: Self::engine(),
            user_dir: user_dir.is_dir().then_some(user_dir),
            repo_dir: repo_dir.is_dir().then_some(repo_dir),
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            repo_dir: None,
        }
    }

    /// Prior LLM output is embedded verbatim, so HTML escaping stays off
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.set_strict_mode(true);
        hbs
    }

    /// Load a template by name, first match wins
    fn load_template(&self, name: &str) -> Result<String, PromptError> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.user_dir, &self.repo_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| PromptError::Template(format!("Failed to read prompt {}: {}", path.display(), e)));
            }
        }

        debug!(%name, "PromptLoader::load_template: trying embedded fallback");
        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| PromptError::Template(format!("Prompt template not found: {}", name)))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String, PromptError> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| PromptError::Template(format!("Failed to render template {}: {}", template_name, e)))
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::embedded_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Ctx<'a> {
        budget: i64,
        proposal: &'a str,
        odds_context: &'a str,
        stake_unit: i64,
    }

    #[test]
    fn test_render_does_not_escape() {
        let loader = PromptLoader::embedded_only();
        let ctx = Ctx {
            budget: 1000,
            proposal: "- 馬単: 1 → 2 & 3 <\"fixed\">",
            odds_context: "",
            stake_unit: 100,
        };
        let out = loader.render("allocation", &ctx).unwrap();
        assert!(out.contains("- 馬単: 1 → 2 & 3 <\"fixed\">"));
    }

    #[test]
    fn test_user_override_wins() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".bakenplanner/prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("system.pmt"), "custom persona").unwrap();
        std::fs::create_dir_all(temp.path().join("prompts")).unwrap();
        std::fs::write(temp.path().join("prompts/system.pmt"), "repo persona").unwrap();

        let loader = PromptLoader::new(temp.path());
        assert_eq!(loader.render("system", &()).unwrap(), "custom persona");
    }

    #[test]
    fn test_repo_dir_before_embedded() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("prompts")).unwrap();
        std::fs::write(temp.path().join("prompts/system.pmt"), "repo persona").unwrap();

        let loader = PromptLoader::new(temp.path());
        assert_eq!(loader.render("system", &()).unwrap(), "repo persona");
        // untouched templates still come from the binary
        assert!(loader.load_template("bets").unwrap().contains("【ルール】"));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("prompts")).unwrap();
        std::fs::write(temp.path().join("prompts/system.pmt"), "{{nope}}").unwrap();

        let loader = PromptLoader::new(temp.path());
        assert!(matches!(loader.render("system", &()), Err(PromptError::Template(_))));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}

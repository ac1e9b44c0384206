//! Prompt template loading and rendering via `minijinja`.
//!
//! Three prompts are rendered, each as a system and a user message:
//! `decide` from a [`DecisionContext`], `converse` from a
//! [`ConversationContext`], and `summarize` from a [`SummaryContext`].
//! Built-in templates are compiled into the binary. A template directory
//! may override any of them file by file (`decide_system.j2`,
//! `decide_user.j2`, and so on) so operators can tune agent behavior
//! without recompiling.
//!
//! [`DecisionContext`]: hearth_types::DecisionContext
//! [`ConversationContext`]: hearth_types::ConversationContext
//! [`SummaryContext`]: hearth_types::SummaryContext

use std::path::Path;

use minijinja::Environment;
use serde::Serialize;
use tracing::debug;

use crate::error::RunnerError;

/// Built-in templates by name.
const BUILTIN_TEMPLATES: [(&str, &str); 6] = [
    ("decide_system", include_str!("../templates/decide_system.j2")),
    ("decide_user", include_str!("../templates/decide_user.j2")),
    ("converse_system", include_str!("../templates/converse_system.j2")),
    ("converse_user", include_str!("../templates/converse_user.j2")),
    ("summarize_system", include_str!("../templates/summarize_system.j2")),
    ("summarize_user", include_str!("../templates/summarize_user.j2")),
];

/// Which prompt to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Choose an action.
    Decide,
    /// Write a conversation.
    Converse,
    /// Summarize a conversation into memories.
    Summarize,
}

impl PromptKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Decide => "decide",
            Self::Converse => "converse",
            Self::Summarize => "summarize",
        }
    }
}

/// Manages prompt template loading and rendering.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl core::fmt::Debug for PromptEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PromptEngine").finish_non_exhaustive()
    }
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message setting the scene and the reply format.
    pub system: String,
    /// User message carrying the context.
    pub user: String,
}

impl PromptEngine {
    /// Create a prompt engine with the built-in templates, replacing any
    /// that `override_dir` provides.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if an override cannot be read or
    /// any template fails to compile.
    pub fn new(override_dir: Option<&Path>) -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        for (name, builtin) in BUILTIN_TEMPLATES {
            let source = match override_dir {
                Some(dir) => load_override(dir, name)?.unwrap_or_else(|| builtin.to_owned()),
                None => builtin.to_owned(),
            };
            env.add_template_owned(name, source)
                .map_err(|e| RunnerError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the system and user messages of `kind` from `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if rendering fails.
    pub fn render<S: Serialize>(&self, kind: PromptKind, context: &S) -> Result<RenderedPrompt, RunnerError> {
        let prefix = kind.prefix();
        Ok(RenderedPrompt {
            system: self.render_one(&format!("{prefix}_system"), context)?,
            user: self.render_one(&format!("{prefix}_user"), context)?,
        })
    }

    fn render_one<S: Serialize>(&self, name: &str, context: &S) -> Result<String, RunnerError> {
        self.env
            .get_template(name)
            .map_err(|e| RunnerError::Template(format!("missing {name} template: {e}")))?
            .render(context)
            .map_err(|e| RunnerError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read `{dir}/{name}.j2` if it exists.
fn load_override(dir: &Path, name: &str) -> Result<Option<String>, RunnerError> {
    let path = dir.join(format!("{name}.j2"));
    if !path.is_file() {
        return Ok(None);
    }
    debug!(path = %path.display(), "Loading prompt template override");
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|e| RunnerError::Template(format!("failed to read {}: {e}", path.display())))
}

//! Errors raised while loading or checking authored quest data.

use thiserror::Error;

use crate::templates::TemplateId;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse quest config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A template that could never run correctly. Aborts construction.
    #[error("invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("duplicate story block id '{0}'")]
    DuplicateTemplate(TemplateId),
}

impl RulesError {
    pub(crate) fn invalid_block(id: &TemplateId, reason: impl Into<String>) -> Self {
        RulesError::InvalidTemplate {
            template: id.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_goal(name: &str, reason: impl Into<String>) -> Self {
        let template = if name.is_empty() { "<unnamed goal>" } else { name };
        RulesError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

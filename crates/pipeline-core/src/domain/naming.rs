//! Channel names: `<namespace>-<stage>-v<major>-<tableized source>`

use crate::config::PipelineConfig;
use crate::domain::source::PipelineSource;
use shared_types::PipelineVersion;

/// Derives publish channels for source types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelNaming {
    namespace: String,
    stage: String,
}

impl ChannelNaming {
    pub fn new(namespace: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            stage: stage.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.namespace.clone(), config.stage.clone())
    }

    /// Only the major component of `version` is significant.
    pub fn channel_name(&self, source_name: &str, version: PipelineVersion) -> String {
        format!(
            "{}-{}-v{}-{}",
            self.namespace,
            self.stage,
            version.channel_suffix(),
            tableize(source_name)
        )
    }

    /// Channel for version `1_0`.
    pub fn default_channel(&self, source_name: &str) -> String {
        self.channel_name(source_name, PipelineVersion::DEFAULT)
    }

    pub fn channel_for<S: PipelineSource>(&self, version: PipelineVersion) -> String {
        self.channel_name(S::SOURCE_NAME, version)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }
}

impl Default for ChannelNaming {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// `TestEmitter` -> `test_emitters`, `inventory::Box` -> `boxes`.
pub fn tableize(source_name: &str) -> String {
    let base = source_name.rsplit("::").next().unwrap_or(source_name);
    pluralize(&snake_case(base))
}

fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower)
            {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

fn pluralize(word: &str) -> String {
    const SIBILANTS: [&str; 5] = ["ss", "x", "z", "ch", "sh"];
    // Singular words ending in a lone `s`.
    const SINGULAR_S: [&str; 3] = ["bus", "alias", "status"];

    if word.is_empty() {
        return String::new();
    }
    if SIBILANTS
        .iter()
        .chain(SINGULAR_S.iter())
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    if word.ends_with('s') {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

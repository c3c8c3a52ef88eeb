//! Repository identifier parsing
//!
//! Accepts either the short `owner/name` form or a full repository URL and
//! normalizes both into a canonical repository URL against a configured base.

use crate::{Result, StardepsError};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SHORT_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+/[\w.-]+$").expect("valid literal regex"));

/// A parsed `owner/name` repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parses a repository reference from user input.
    ///
    /// Accepts `owner/name` (e.g. `facebook/react`) or a full URL
    /// (e.g. `https://github.com/facebook/react`). Malformed input is an
    /// input error, surfaced before any network activity.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if SHORT_FORM.is_match(input) {
            let (owner, name) = input
                .split_once('/')
                .ok_or_else(|| StardepsError::Input(format!("Invalid repository: {input}")))?;
            return Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            let url = Url::parse(input)
                .map_err(|e| StardepsError::Input(format!("Invalid repository URL: {e}")))?;
            let mut segments = url
                .path_segments()
                .ok_or_else(|| StardepsError::Input(format!("Invalid repository URL: {input}")))?
                .filter(|s| !s.is_empty());

            if let (Some(owner), Some(name)) = (segments.next(), segments.next()) {
                return Ok(Self {
                    owner: owner.to_string(),
                    name: name.trim_end_matches(".git").to_string(),
                });
            }
            return Err(StardepsError::Input(format!(
                "Repository URL must contain owner and name: {input}"
            )));
        }

        Err(StardepsError::Input(format!(
            "Invalid repository format '{input}'. Use \"owner/repo\" (e.g. \"facebook/react\")"
        )))
    }

    /// Canonical repository URL under the given site base,
    /// e.g. `https://github.com/facebook/react`
    pub fn canonical_url(&self, base: &Url) -> Result<String> {
        let url = base.join(&format!("/{}/{}", self.owner, self.name))?;
        Ok(url.to_string())
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

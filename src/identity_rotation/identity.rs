use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Tokens shorter than this are never identities.
const MIN_IDENTITY_LEN: usize = 3;

/// A named network egress location, e.g. a VPN country.
///
/// Always alphabetic and at least three characters long; construct with [`Identity::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Cleans a raw token and accepts it if it still looks like an identity name.
    ///
    /// Commas and periods are stripped; the rest must be alphabetic.
    pub fn parse(token: &str) -> Option<Self> {
        let cleaned: String = token.trim().chars().filter(|c| *c != ',' && *c != '.').collect();
        if cleaned.chars().count() < MIN_IDENTITY_LEN || !cleaned.chars().all(char::is_alphabetic) {
            return None;
        }
        Some(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses the identity source's listing.
///
/// Two layouts are accepted: a single comma-separated line, or lines of
/// whitespace-separated tokens (header and separator lines skipped). Tokens matching
/// `excluded` (case-insensitive) are dropped, duplicates are dropped case-insensitively
/// keeping the first spelling, and source order is preserved.
pub fn parse_identity_list(output: &str, excluded: &[String]) -> Vec<Identity> {
    let output = output.trim();
    let tokens: Vec<&str> = if output.contains(',') {
        output.split(',').map(str::trim).filter(|t| !t.is_empty()).collect()
    } else {
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('-') && !line.starts_with("Available"))
            .flat_map(str::split_whitespace)
            .collect()
    };

    let excluded: HashSet<String> = excluded.iter().map(|t| t.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut identities = Vec::new();

    for token in tokens {
        let Some(identity) = Identity::parse(token) else {
            debug!("Skipping non-identity token {:?}", token);
            continue;
        };
        let key = identity.as_str().to_lowercase();
        if excluded.contains(&key) || !seen.insert(key) {
            continue;
        }
        identities.push(identity);
    }

    identities
}

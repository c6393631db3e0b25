//! Per-platform identifier classification and Steam vanity-URL resolution.

use std::collections::HashMap;

use fancy_regex::{Captures, Regex};
use once_cell::sync::Lazy;
use tracing::debug;

use crate::enums::Platform;
use crate::error::{error_message, RlError, Result};
use crate::http::json_or_text;


/// Error text Steam returns for a profile that simply doesn't exist; any
/// other `<error>` text is unexpected enough to log.
const STEAM_PROFILE_NOT_FOUND: &str = "The specified profile could not be found.";

/// Pattern that can never match, for lookup kinds a platform doesn't support.
const NEVER: &str = r"[^\s\S]";

struct PlatformPatterns {
    id: Regex,
    name: Regex,
}

fn compile(pattern: &str) -> Regex {
    // anchored so the whole input has to match
    Regex::new(&format!("^(?:{pattern})$")).expect("platform pattern")
}

static PLATFORM_PATTERNS: Lazy<HashMap<Platform, PlatformPatterns>> = Lazy::new(|| {
    HashMap::from([
        (
            Platform::Steam,
            PlatformPatterns {
                // group 1: "id"/"profiles" URL kind, absent for bare input;
                // group 2: the steamID64 or vanity name
                id: compile(
                    r"(?:(?:https?://(?:www\.)?)?steamcommunity\.com/(id|profiles)/)?([a-zA-Z0-9_-]{2,32})/?",
                ),
                name: compile(NEVER),
            },
        ),
        (
            Platform::Ps4,
            PlatformPatterns {
                id: compile(NEVER),
                name: compile(r"[a-zA-Z][a-zA-Z0-9_-]{2,15}"),
            },
        ),
        (
            Platform::XboxOne,
            PlatformPatterns {
                id: compile(NEVER),
                name: compile(r"[a-zA-Z](?=.{0,15}$)(?:[a-zA-Z0-9-_]+ ?)+"),
            },
        ),
        (
            Platform::Epic,
            PlatformPatterns {
                id: compile(r"[0-9a-f]{32}"),
                name: compile(r".{3,16}"),
            },
        ),
        (
            Platform::Switch,
            PlatformPatterns {
                // punctuation can't start, end, or repeat in a row
                id: compile(NEVER),
                name: compile(r"[a-zA-Z0-9](?:[a-zA-Z0-9]|[\-_.](?![\-_.])){4,14}[a-zA-Z0-9]"),
            },
        ),
    ])
});

/// Backtrack-limit overruns count as no match; the patterns above can't
/// trigger them on inputs of sane length.
fn full_match<'t>(pattern: &Regex, text: &'t str) -> Option<Captures<'t>> {
    pattern.captures(text).ok().flatten()
}

/// IDs and display names a raw identifier classified into for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LookupStrings {
    pub(crate) ids: Vec<String>,
    pub(crate) names: Vec<String>,
}

impl LookupStrings {
    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }
}

/// Classifies identifiers against the per-platform pattern table and runs
/// the Steam resolution sub-flow. Steam calls are unauthenticated and go
/// straight through the plain `reqwest::Client`, outside the transport's
/// retry policy.
#[derive(Debug, Clone)]
pub(crate) struct IdentityResolver {
    http: reqwest::Client,
    steam_base: String,
}

impl IdentityResolver {
    pub(crate) fn new(http: reqwest::Client, steam_base: String) -> Self {
        Self { http, steam_base }
    }

    /// Classify `identifier` for `platform` into IDs and names.
    ///
    /// Fails with [`RlError::IllegalUsername`] when the input matches
    /// neither of the platform's patterns. A Steam input that matches but
    /// resolves to no profile yields an empty result instead, so the
    /// multi-platform search can keep going.
    pub(crate) async fn classify(
        &self,
        platform: Platform,
        identifier: &str,
    ) -> Result<LookupStrings> {
        let patterns = &PLATFORM_PATTERNS[&platform];
        let id_match = full_match(&patterns.id, identifier);
        let name_match = full_match(&patterns.name, identifier);
        if id_match.is_none() && name_match.is_none() {
            return Err(RlError::IllegalUsername {
                platform,
                username: identifier.to_owned(),
            });
        }

        let mut lookup = LookupStrings::default();
        if let Some(captures) = id_match {
            if platform == Platform::Steam {
                lookup.ids = self.resolve_steam_ids(&captures).await?;
            } else {
                lookup.ids.push(identifier.to_owned());
            }
        }
        if name_match.is_some() {
            lookup.names.push(identifier.to_owned());
        }
        Ok(lookup)
    }

    /// Resolve a matched Steam identifier to steamID64s via the legacy
    /// profile page. A bare identifier is tried as both URL kinds.
    async fn resolve_steam_ids(&self, captures: &Captures<'_>) -> Result<Vec<String>> {
        let identifier = match captures.get(2) {
            Some(group) => group.as_str(),
            None => return Ok(Vec::new()),
        };
        let kinds: &[&str] = match captures.get(1).map(|group| group.as_str()) {
            Some("profiles") => &["profiles"],
            Some(_) => &["id"],
            None => &["profiles", "id"],
        };

        let mut ids = Vec::new();
        for &kind in kinds {
            let url = format!("{}/{}/{}/?xml=1", self.steam_base, kind, identifier);
            let resp = self.http.get(&url).send().await?;
            let status = resp.status();
            if status.as_u16() >= 400 {
                let headers = resp.headers().clone();
                let body = json_or_text(resp).await?;
                return Err(RlError::Http {
                    status,
                    headers,
                    message: error_message(&body),
                });
            }
            let text = resp.text().await?;
            let profile = roxmltree::Document::parse(&text)?;

            if let Some(error) = profile
                .descendants()
                .find(|node| node.has_tag_name("error"))
            {
                let error_text = error.text().unwrap_or_default();
                if error_text != STEAM_PROFILE_NOT_FOUND {
                    debug!(kind, error = error_text, "Steam profile lookup failed");
                }
                continue;
            }

            match profile
                .descendants()
                .find(|node| node.has_tag_name("steamID64"))
                .and_then(|node| node.text())
            {
                Some(steam_id) if !steam_id.is_empty() => ids.push(steam_id.to_owned()),
                _ => debug!(kind, "steamID64 element missing or empty in Steam response"),
            }
        }
        Ok(ids)
    }
}

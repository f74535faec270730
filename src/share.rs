//! Share Links
//!
//! Access codes handed out to the viewers of a group purchase, formatted as
//! `STREAM-{event id}-{token}-{max viewers}`.

use std::{fmt, str::FromStr};

use rand::{Rng, distributions::Alphanumeric};
use thiserror::Error;

/// Every share link starts with this prefix.
pub const SHARE_PREFIX: &str = "STREAM";

/// Length of the random token.
pub const TOKEN_LEN: usize = 8;

/// Errors parsing a share link.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShareLinkError {
    /// The code does not start with `STREAM-`.
    #[error("share link must start with STREAM-")]
    MissingPrefix,

    /// The code does not have event, token and viewer parts.
    #[error("malformed share link: {0}")]
    Malformed(String),
}

/// Shareable access link for a group purchase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareLink {
    event_id: String,
    token: String,
    max_viewers: u32,
}

impl ShareLink {
    /// Generate a link with a fresh random token.
    pub fn generate(event_id: impl Into<String>, max_viewers: u32) -> Self {
        Self::generate_with(&mut rand::thread_rng(), event_id, max_viewers)
    }

    /// Generate a link using the given random source.
    pub fn generate_with(
        rng: &mut impl Rng,
        event_id: impl Into<String>,
        max_viewers: u32,
    ) -> Self {
        let token = rng
            .sample_iter(Alphanumeric)
            .take(TOKEN_LEN)
            .map(|byte| char::from(byte).to_ascii_uppercase())
            .collect();

        Self {
            event_id: event_id.into(),
            token,
            max_viewers,
        }
    }

    /// Parse a share link code.
    ///
    /// # Errors
    ///
    /// Returns a [`ShareLinkError`] if the code is not a well-formed link.
    pub fn parse(code: &str) -> Result<Self, ShareLinkError> {
        code.parse()
    }

    /// Event the link grants access to.
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Random token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Number of viewers the purchase covers.
    pub fn max_viewers(&self) -> u32 {
        self.max_viewers
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{SHARE_PREFIX}-{}-{}-{}",
            self.event_id, self.token, self.max_viewers
        )
    }
}

impl FromStr for ShareLink {
    type Err = ShareLinkError;

    /// Parse a link back into its parts. Event ids may themselves contain `-`,
    /// so the token and viewer count are taken from the end.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let malformed = || ShareLinkError::Malformed(code.to_string());

        let rest = code
            .trim()
            .strip_prefix(SHARE_PREFIX)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or(ShareLinkError::MissingPrefix)?;

        let (rest, max_viewers) = rest.rsplit_once('-').ok_or_else(malformed)?;
        let (event_id, token) = rest.rsplit_once('-').ok_or_else(malformed)?;

        let max_viewers = max_viewers.parse().map_err(|_err| malformed())?;

        if event_id.is_empty()
            || token.len() != TOKEN_LEN
            || !token.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(malformed());
        }

        Ok(Self {
            event_id: event_id.to_string(),
            token: token.to_string(),
            max_viewers,
        })
    }
}

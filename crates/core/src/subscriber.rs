//! Subscriber identity helpers.
//!
//! IMSIs arrive both bare (`001010000000001`) and in the canonical
//! `IMSI`-prefixed form. The session table indexes the bare form; backend
//! requests and metric labels use the prefixed one.

use serde::{Deserialize, Serialize};

/// Canonical IMSI prefix.
pub const IMSI_PREFIX: &str = "IMSI";

/// Returns the IMSI without its canonical prefix.
pub fn strip_imsi_prefix(imsi: &str) -> &str {
    imsi.strip_prefix(IMSI_PREFIX).unwrap_or(imsi)
}

/// Returns the IMSI in canonical `IMSI`-prefixed form.
pub fn decorate_imsi(imsi: &str) -> String {
    if imsi.starts_with(IMSI_PREFIX) {
        imsi.to_string()
    } else {
        format!("{}{}", IMSI_PREFIX, imsi)
    }
}

/// Whether two IMSIs name the same subscriber, ignoring the prefix.
pub fn same_subscriber(a: &str, b: &str) -> bool {
    strip_imsi_prefix(a) == strip_imsi_prefix(b)
}

/// Kind of subscriber identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriberIdKind {
    Imsi,
}

/// Subscriber identifier as sent to the flow controller and session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberId {
    pub id: String,
    pub kind: SubscriberIdKind,
}

impl SubscriberId {
    /// Builds the canonical subscriber id for an IMSI.
    pub fn from_imsi(imsi: &str) -> Self {
        Self {
            id: decorate_imsi(imsi),
            kind: SubscriberIdKind::Imsi,
        }
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Radio access technology reported to the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatType {
    TgppWlan,
}

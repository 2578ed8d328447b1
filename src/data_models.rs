use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque identifier of a notification recipient, as handed out by the transport.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub link: String,
    pub store: String,
}

impl Product {
    pub fn new(title: impl Into<String>, link: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            store: store.into(),
        }
    }

    pub fn dummy(title: &str) -> Self {
        Self::new(title, "https://example.com/item", "Test store")
    }

    pub fn alert_text(&self) -> String {
        format!("🔥 Deal spotted at {}:\n{}\n{}", self.store, self.title, self.link)
    }
}

/// A product that matched one of a user's keywords during a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub user: UserId,
    pub product: Product,
}

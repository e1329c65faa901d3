use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::helpers::time::{self, parse_record_timestamp, to_record_timestamp};

/// Bearer token held in memory, usable while `now < expires_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// Token just returned by `auth`, valid for the local policy window
    pub fn issued_now(value: String) -> Self {
        Self::new(value, time::now() + time::token_validity())
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(time::now())
    }
}

/// Token as persisted in the shared store: `{"token": "...", "expire": "<rfc3339>"}`.
///
/// Fields are optional so that partially written or foreign records still
/// deserialize and can be rejected as a whole by [`CachedTokenRecord::into_token`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTokenRecord {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expire: Option<String>,
}

impl CachedTokenRecord {
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "token": self.token,
            "expire": self.expire,
        })
    }

    /// `None` when the token is missing or blank, or the expiry is missing or unparseable
    pub fn into_token(self) -> Option<Token> {
        let value = self.token.filter(|t| !t.is_empty())?;
        let expires_at = self.expire.as_deref().and_then(parse_record_timestamp)?;
        Some(Token::new(value, expires_at))
    }
}

impl From<&Token> for CachedTokenRecord {
    fn from(token: &Token) -> Self {
        Self {
            token: Some(token.value.clone()),
            expire: Some(to_record_timestamp(&token.expires_at)),
        }
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Secret;

/// The passphrase cursors are encrypted with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CursorKey(pub Secret);

impl From<String> for CursorKey {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&str> for CursorKey {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result envelope returned by the manager's admin mutations.
///
/// The server reports logical failures in-band as `{ok: false, msg: "..."}`
/// with HTTP 200, so the envelope is collapsed into a tagged result via
/// [`Mutation::expect_ok`] instead of each caller inspecting the boolean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mutation {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Mutation {
    /// The payload on success; on `ok: false`, an error reading
    /// `"{action}: {server msg}"`.
    pub fn expect_ok(self, action: &str) -> Result<Map<String, Value>> {
        if self.ok {
            Ok(self.payload)
        } else {
            let msg = self.msg.as_deref().unwrap_or("unknown reason");
            anyhow::bail!("{action}: {msg}")
        }
    }
}

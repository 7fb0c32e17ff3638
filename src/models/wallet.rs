use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A freshly issued pro wallet. The mnemonic is only ever returned once.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProWalletResponse {
    pub pro_id: String,
    pub token: String,
    pub mnemonic24: String,
    pub created_utc: DateTime<Utc>,
}

impl std::fmt::Debug for CreateProWalletResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateProWalletResponse")
            .field("pro_id", &self.pro_id)
            .field("token", &"[REDACTED]")
            .field("mnemonic24", &"[REDACTED]")
            .field("created_utc", &self.created_utc)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyProWalletResponse {
    pub pro_id: String,
    pub valid: bool,
}

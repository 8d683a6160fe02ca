use serde::Deserialize;
use serde_json::Value;

use super::entity_id;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUnclaimedClub {
    #[serde(rename = "idClub")]
    pub id_club: Option<Value>,
    pub nombre: Option<String>,
}

/// Club left without a representative, offered for claiming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclaimedClub {
    pub id: i64,
    pub name: Option<String>,
}

impl UnclaimedClub {
    /// Returns None when the payload carries no usable club id.
    pub fn from_raw(raw: RawUnclaimedClub) -> Option<Self> {
        let id = raw.id_club.as_ref().and_then(entity_id)?;
        Some(UnclaimedClub { id, name: raw.nombre })
    }

    /// Page where the current user can claim this club.
    pub fn claim_page(&self) -> String {
        format!("reclamar-club.html?id={}", self.id)
    }
}

use http::Method;
use serde::Deserialize;
use serde_json::Value;

use super::entity_id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Other(String),
}

impl InvitationStatus {
    /// Case-insensitive: "PENDIENTE", "Pendiente" and "pendiente" are all pending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("pendiente") {
            InvitationStatus::Pending
        } else {
            InvitationStatus::Other(s.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInvitation {
    #[serde(rename = "idInvitacion")]
    pub id_invitacion: Option<Value>,
    pub estado: Option<String>,
    #[serde(rename = "nombreClub")]
    pub nombre_club: Option<String>,
}

/// Club invitation addressed to the current competitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: Option<i64>,
    pub status: InvitationStatus,
    pub club_name: Option<String>,
}

impl Invitation {
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}

impl From<RawInvitation> for Invitation {
    fn from(raw: RawInvitation) -> Self {
        Invitation {
            id: raw.id_invitacion.as_ref().and_then(entity_id),
            status: InvitationStatus::parse(raw.estado.as_deref().unwrap_or_default()),
            club_name: raw.nombre_club.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Answer given to an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Reject,
}

impl InvitationAction {
    /// Trailing path segment of the answer endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationAction::Accept => "aceptar",
            InvitationAction::Reject => "rechazar",
        }
    }

    /// Accepting is a POST, rejecting a PUT.
    pub fn method(self) -> Method {
        match self {
            InvitationAction::Accept => Method::POST,
            InvitationAction::Reject => Method::PUT,
        }
    }
}

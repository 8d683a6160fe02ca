use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::entity_id;
use crate::format::parse_timestamp;

/// Notification type tag as sent by the backend (`tipo`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    InvitationReceived,
    ClubInvitation,
    ClubAvailable,
    ClubRejected,
    ClubPending,
    NewClub,
    InvitationAccepted,
    InvitationRejected,
    RequestReceived,
    RequestAccepted,
    RequestRejected,
    ClubValidated,
    Info,
    Success,
    /// Any tag without client-side behaviour of its own (kept verbatim).
    Other(String),
}

impl NotificationKind {
    /// Parse a backend tag. Matching is exact on the upper-case form;
    /// unknown tags are preserved as `Other`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_uppercase().as_str() {
            "INVITACION_RECIBIDA" => NotificationKind::InvitationReceived,
            "INVITACION_CLUB" => NotificationKind::ClubInvitation,
            "CLUB_DISPONIBLE" => NotificationKind::ClubAvailable,
            "CLUB_RECHAZADO" => NotificationKind::ClubRejected,
            "CLUB_PENDIENTE" => NotificationKind::ClubPending,
            "NUEVO_CLUB" => NotificationKind::NewClub,
            "INVITACION_ACEPTADA" => NotificationKind::InvitationAccepted,
            "INVITACION_RECHAZADA" => NotificationKind::InvitationRejected,
            "SOLICITUD_RECIBIDA" => NotificationKind::RequestReceived,
            "SOLICITUD_ACEPTADA" => NotificationKind::RequestAccepted,
            "SOLICITUD_RECHAZADA" => NotificationKind::RequestRejected,
            "CLUB_VALIDADO" => NotificationKind::ClubValidated,
            "INFO" => NotificationKind::Info,
            "EXITO" => NotificationKind::Success,
            _ => NotificationKind::Other(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::InvitationReceived => "INVITACION_RECIBIDA",
            NotificationKind::ClubInvitation => "INVITACION_CLUB",
            NotificationKind::ClubAvailable => "CLUB_DISPONIBLE",
            NotificationKind::ClubRejected => "CLUB_RECHAZADO",
            NotificationKind::ClubPending => "CLUB_PENDIENTE",
            NotificationKind::NewClub => "NUEVO_CLUB",
            NotificationKind::InvitationAccepted => "INVITACION_ACEPTADA",
            NotificationKind::InvitationRejected => "INVITACION_RECHAZADA",
            NotificationKind::RequestReceived => "SOLICITUD_RECIBIDA",
            NotificationKind::RequestAccepted => "SOLICITUD_ACEPTADA",
            NotificationKind::RequestRejected => "SOLICITUD_RECHAZADA",
            NotificationKind::ClubValidated => "CLUB_VALIDADO",
            NotificationKind::Info => "INFO",
            NotificationKind::Success => "EXITO",
            NotificationKind::Other(tag) => tag,
        }
    }
}

/// Notification exactly as the backend sends it.
///
/// Two generations of the API coexist: the id arrives as `id` or
/// `idNotificacion`, and the read flag as `leida` or `leido`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNotification {
    pub id: Option<Value>,
    #[serde(rename = "idNotificacion")]
    pub id_notificacion: Option<Value>,
    pub tipo: Option<String>,
    pub titulo: Option<String>,
    pub mensaje: Option<String>,
    pub leida: Option<bool>,
    pub leido: Option<bool>,
    #[serde(rename = "fechaCreacion")]
    pub fecha_creacion: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    #[serde(rename = "idInvitacion")]
    pub id_invitacion: Option<Value>,
}

/// Canonical notification record held in the polling cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Option<i64>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub metadata: Map<String, Value>,
    /// Invitation id when the payload carries it as a top-level field.
    pub invitation_id: Option<i64>,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        !self.read
    }

    /// Numeric entity id stored under `key` in the metadata map.
    pub fn metadata_id(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(entity_id)
    }
}

impl From<RawNotification> for Notification {
    fn from(raw: RawNotification) -> Self {
        let id = raw
            .id
            .as_ref()
            .and_then(entity_id)
            .or_else(|| raw.id_notificacion.as_ref().and_then(entity_id));

        Notification {
            id,
            kind: NotificationKind::parse(raw.tipo.as_deref().unwrap_or_default()),
            title: raw.titulo.unwrap_or_default(),
            message: raw.mensaje.unwrap_or_default(),
            read: raw.leida.unwrap_or(false) || raw.leido.unwrap_or(false),
            created_at: raw.fecha_creacion.as_deref().and_then(parse_timestamp),
            metadata: raw.metadata.unwrap_or_default(),
            invitation_id: raw.id_invitacion.as_ref().and_then(entity_id),
        }
    }
}

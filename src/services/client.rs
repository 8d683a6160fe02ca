use std::sync::Arc;

use http::Method;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::{
    decode_list, Invitation, InvitationAction, Notification, RawInvitation, RawNotification,
    RawUnclaimedClub, UnclaimedClub,
};
use crate::services::api::Backend;

const NOTIFICATIONS_PATH: &str = "/api/notificaciones";
const INVITATIONS_PATH: &str = "/api/competidor/invitaciones";
const UNCLAIMED_CLUB_PATH: &str = "/api/clubes/sin-reclamar";

/// Typed access to the Robotech endpoints used by the notification core.
#[derive(Clone)]
pub struct RobotechClient {
    backend: Arc<dyn Backend>,
}

impl RobotechClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Fetch up to `limit` notifications filtered by read state.
    pub async fn list_notifications(&self, read: bool, limit: u32) -> AppResult<Vec<Notification>> {
        let path = format!("{}?leidas={}&limit={}", NOTIFICATIONS_PATH, read, limit);
        let data = self.backend.request(&path, Method::GET, None).await.into_result()?;
        decode_list::<RawNotification, _>(data, "notification")
    }

    /// Server-side unread counter.
    pub async fn unread_count(&self) -> AppResult<u64> {
        let path = format!("{}/count", NOTIFICATIONS_PATH);
        let data = self.backend.request(&path, Method::GET, None).await.into_result()?;

        data.as_u64()
            .or_else(|| data.get("count").and_then(Value::as_u64))
            .ok_or_else(|| AppError::MalformedPayload(format!("unexpected count payload: {}", data)))
    }

    pub async fn mark_read(&self, notification_id: i64) -> AppResult<()> {
        let path = format!("{}/{}/marcar-leida", NOTIFICATIONS_PATH, notification_id);
        self.backend.request(&path, Method::PUT, None).await.into_result()?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> AppResult<()> {
        let path = format!("{}/marcar-todas-leidas", NOTIFICATIONS_PATH);
        self.backend.request(&path, Method::PUT, None).await.into_result()?;
        Ok(())
    }

    /// Invitations addressed to the current competitor.
    pub async fn my_invitations(&self) -> AppResult<Vec<Invitation>> {
        let data = self
            .backend
            .request(INVITATIONS_PATH, Method::GET, None)
            .await
            .into_result()?;
        decode_list::<RawInvitation, _>(data, "invitation")
    }

    /// Accept (POST) or reject (PUT) an invitation.
    pub async fn respond_invitation(&self, invitation_id: i64, action: InvitationAction) -> AppResult<()> {
        let path = format!("{}/{}/{}", INVITATIONS_PATH, invitation_id, action.as_str());
        self.backend
            .request(&path, action.method(), None)
            .await
            .into_result()?;
        Ok(())
    }

    /// Club waiting to be claimed by the current user, if any.
    pub async fn unclaimed_club(&self) -> AppResult<Option<UnclaimedClub>> {
        let data = self
            .backend
            .request(UNCLAIMED_CLUB_PATH, Method::GET, None)
            .await
            .into_result()?;

        match data {
            Value::Null => Ok(None),
            Value::Object(_) => {
                let raw: RawUnclaimedClub = serde_json::from_value(data)?;
                Ok(UnclaimedClub::from_raw(raw))
            }
            other => Err(AppError::MalformedPayload(format!(
                "unexpected club payload: {}",
                other
            ))),
        }
    }
}

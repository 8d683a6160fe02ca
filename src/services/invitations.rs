//! Accept/reject flow for club invitations received as notifications.

use std::sync::Arc;

use regex::Regex;

use crate::config::UiConfig;
use crate::error::{AppError, AppResult};
use crate::i18n;
use crate::models::{InvitationAction, Notification};
use crate::services::client::RobotechClient;
use crate::services::polling::NotificationPoller;
use crate::ui::{AlertKind, InvitationPrompt, Ui};

lazy_static::lazy_static! {
    static ref INVITATION_REF: Regex = Regex::new(r"(?i)invitaci[oó]n\s+#?(\d+)").unwrap();
    static ref HASH_REF: Regex = Regex::new(r"#(\d+)").unwrap();
    // Tried in order: quoted names first, then the bare word after "club".
    static ref CLUB_NAME: [Regex; 3] = [
        Regex::new(r#"(?i)club\s+'([^']+)'"#).unwrap(),
        Regex::new(r#"(?i)club\s+"([^"]+)""#).unwrap(),
        Regex::new(r"(?i)club\s+(\w+)").unwrap(),
    ];
}

/// How one invitation interaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationOutcome {
    /// No invitation id could be found; the user was told to go to the
    /// invitations page.
    Unresolvable,
    /// The modal was closed without an answer.
    Dismissed,
    /// The server accepted the answer and a reload was issued.
    Completed(InvitationAction),
    /// The server rejected the answer; carries the message shown.
    Failed(String),
}

/// Invitation id referenced in a message, e.g. `invitación #42`.
pub fn extract_invitation_id(message: &str) -> Option<i64> {
    INVITATION_REF
        .captures(message)
        .or_else(|| HASH_REF.captures(message))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Club name mentioned in an invitation message.
pub fn extract_club_name(lang: &str, message: &str) -> String {
    CLUB_NAME
        .iter()
        .find_map(|re| re.captures(message).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| i18n::tr(Some(lang), "invitation.default_club", None))
}

/// Work out which invitation a notification refers to.
///
/// Sources in order: the top-level field, the metadata entry, an id quoted
/// in the message, and finally the first pending invitation of the current
/// user.
pub async fn resolve_invitation_id(
    client: &RobotechClient,
    notification: &Notification,
) -> AppResult<i64> {
    if let Some(id) = notification
        .invitation_id
        .or_else(|| notification.metadata_id("idInvitacion"))
        .or_else(|| extract_invitation_id(&notification.message))
    {
        return Ok(id);
    }

    match client.my_invitations().await {
        Ok(invitations) => invitations
            .into_iter()
            .filter(|inv| inv.is_pending())
            .find_map(|inv| inv.id)
            .ok_or(AppError::UnresolvableInvitation),
        Err(e) => {
            tracing::debug!("Pending invitation lookup failed: {}", e);
            Err(AppError::UnresolvableInvitation)
        }
    }
}

#[derive(Clone)]
pub struct InvitationFlow {
    client: RobotechClient,
    poller: NotificationPoller,
    ui: Arc<dyn Ui>,
    view: UiConfig,
}

impl InvitationFlow {
    pub fn new(
        client: RobotechClient,
        poller: NotificationPoller,
        ui: Arc<dyn Ui>,
        view: UiConfig,
    ) -> Self {
        Self {
            client,
            poller,
            ui,
            view,
        }
    }

    fn text(&self, key: &str) -> String {
        i18n::tr(Some(&self.view.language), key, None)
    }

    pub async fn run(&self, notification: &Notification) -> InvitationOutcome {
        tracing::debug!(notification = ?notification.id, "Resolving invitation id");

        let invitation_id = match resolve_invitation_id(&self.client, notification).await {
            Ok(id) => id,
            Err(_) => {
                tracing::debug!(notification = ?notification.id, "Invitation id unresolvable");
                self.ui
                    .show_alert(
                        &self.text("dialog.error_title"),
                        &self.text("invitation.unresolvable"),
                        AlertKind::Error,
                    )
                    .await;
                return InvitationOutcome::Unresolvable;
            }
        };

        let prompt = InvitationPrompt::build(
            &self.view.language,
            invitation_id,
            extract_club_name(&self.view.language, &notification.message),
            notification.message.clone(),
        );
        tracing::debug!(invitation_id, club = %prompt.club_name, "Showing invitation modal");

        match self.ui.prompt_invitation(&prompt).await {
            Some(action) => self.respond(invitation_id, action).await,
            None => {
                tracing::debug!(invitation_id, "Invitation modal dismissed");
                InvitationOutcome::Dismissed
            }
        }
    }

    /// Send the user's answer and report the result.
    ///
    /// On success the notification cache is refreshed and the page reloaded
    /// after the configured delay so new roles take effect.
    pub async fn respond(&self, invitation_id: i64, action: InvitationAction) -> InvitationOutcome {
        tracing::debug!(invitation_id, action = action.as_str(), "Submitting invitation answer");

        self.ui.show_loading();
        let result = self.client.respond_invitation(invitation_id, action).await;
        self.ui.hide_loading();

        if let Err(e) = result {
            tracing::debug!(invitation_id, "Invitation answer failed: {}", e);
            let message = e.user_message(&self.text("invitation.respond_error"));
            self.ui
                .show_alert(&self.text("dialog.error_title"), &message, AlertKind::Error)
                .await;
            return InvitationOutcome::Failed(message);
        }

        let (title, body, kind) = match action {
            InvitationAction::Accept => (
                "invitation.accepted.title",
                "invitation.accepted.body",
                AlertKind::Success,
            ),
            InvitationAction::Reject => (
                "invitation.rejected.title",
                "invitation.rejected.body",
                AlertKind::Info,
            ),
        };
        self.ui.show_alert(&self.text(title), &self.text(body), kind).await;

        self.poller.refresh().await;

        tokio::time::sleep(self.view.reload_delay()).await;
        tracing::debug!(invitation_id, "Reloading after invitation answer");
        self.ui.reload();

        InvitationOutcome::Completed(action)
    }
}

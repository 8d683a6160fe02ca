//! Rendering seam between the notification core and whatever draws it.
//!
//! The core never builds markup. It hands view models and dialog requests to
//! a [`Ui`] implementation; the browser build draws modals, the headless
//! runner logs them.

use async_trait::async_trait;

use crate::i18n;
use crate::models::InvitationAction;
use crate::services::panel::NotificationListView;

/// Visual flavour of a blocking dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Info,
    Error,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Success => "success",
            AlertKind::Info => "info",
            AlertKind::Error => "error",
        }
    }
}

/// Content of the accept/reject invitation modal, labels included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationPrompt {
    pub invitation_id: i64,
    pub club_name: String,
    pub message: String,
    pub title: String,
    pub hint: String,
    pub question: String,
    pub accept_label: String,
    pub reject_label: String,
}

impl InvitationPrompt {
    pub fn build(lang: &str, invitation_id: i64, club_name: String, message: String) -> Self {
        Self {
            invitation_id,
            club_name,
            message,
            title: i18n::tr(Some(lang), "invitation.modal_title", None),
            hint: i18n::tr(Some(lang), "invitation.modal_hint", None),
            question: i18n::tr(Some(lang), "invitation.modal_question", None),
            accept_label: i18n::tr(Some(lang), "invitation.accept", None),
            reject_label: i18n::tr(Some(lang), "invitation.reject", None),
        }
    }
}

/// Page-level navigation.
pub trait Navigator: Send + Sync + 'static {
    /// Leave the current page for `target` (a page path, optionally with a query).
    fn navigate(&self, target: &str);

    /// Reload the current page so session-dependent UI (roles) is rebuilt.
    fn reload(&self);
}

#[async_trait]
pub trait Ui: Navigator {
    /// Replace the badge and dropdown contents.
    fn render_notifications(&self, view: &NotificationListView);

    /// Drop the "unread" highlight from rendered items and hide the badge.
    fn clear_unread_highlight(&self);

    /// Show a blocking dialog; resolves once the user dismisses it.
    async fn show_alert(&self, title: &str, message: &str, kind: AlertKind);

    /// Show the invitation modal. `None` means it was closed without an answer.
    async fn prompt_invitation(&self, prompt: &InvitationPrompt) -> Option<InvitationAction>;

    fn show_loading(&self);

    fn hide_loading(&self);
}

/// Headless UI that renders through `tracing`.
///
/// Dialogs resolve immediately and invitation prompts are never answered.
#[derive(Debug, Default, Clone)]
pub struct LogUi;

impl Navigator for LogUi {
    fn navigate(&self, target: &str) {
        tracing::info!("Navigation requested: {}", target);
    }

    fn reload(&self) {
        tracing::info!("Page reload requested");
    }
}

#[async_trait]
impl Ui for LogUi {
    fn render_notifications(&self, view: &NotificationListView) {
        if view.items.is_empty() {
            tracing::info!("{}", view.empty_label);
            return;
        }

        tracing::info!(
            unread = view.unread_count,
            "{} ({})",
            view.header_title,
            view.header_count
        );
        for item in &view.items {
            tracing::info!(
                id = ?item.id,
                unread = item.unread,
                icon = item.icon.as_str(),
                "{} | {} | {}",
                item.title,
                item.message,
                item.relative_time
            );
        }
    }

    fn clear_unread_highlight(&self) {
        tracing::debug!("Unread highlight cleared");
    }

    async fn show_alert(&self, title: &str, message: &str, kind: AlertKind) {
        match kind {
            AlertKind::Error => tracing::warn!("[{}] {}: {}", kind.as_str(), title, message),
            _ => tracing::info!("[{}] {}: {}", kind.as_str(), title, message),
        }
    }

    async fn prompt_invitation(&self, prompt: &InvitationPrompt) -> Option<InvitationAction> {
        tracing::info!(
            "{} #{} ({}): {} {} [{} / {}] left unanswered",
            prompt.title,
            prompt.invitation_id,
            prompt.club_name,
            prompt.message,
            prompt.question,
            prompt.accept_label,
            prompt.reject_label
        );
        None
    }

    fn show_loading(&self) {
        tracing::debug!("Loading...");
    }

    fn hide_loading(&self) {
        tracing::debug!("Loading finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_ui_never_answers_invitations() {
        let ui = LogUi;
        let prompt = InvitationPrompt::build(
            "en",
            3,
            "Halcones".to_string(),
            "El club 'Halcones' te ha invitado".to_string(),
        );
        assert_eq!(prompt.title, "Club Invitation");
        assert_eq!(prompt.accept_label, "Accept");
        assert_eq!(prompt.reject_label, "Reject");

        let answer = tokio_test::block_on(async {
            ui.show_alert("Aviso", "Hola", AlertKind::Info).await;
            ui.prompt_invitation(&prompt).await
        });
        assert_eq!(answer, None);
    }

    #[test]
    fn alert_kind_names() {
        assert_eq!(AlertKind::Success.as_str(), "success");
        assert_eq!(AlertKind::Error.as_str(), "error");
    }
}

//! Click handling for notification rows.
//!
//! Classification runs over an ordered rule list. Type tags are checked for
//! every rule before any text pattern is tried, so a notification carrying a
//! known tag is never captured by another rule's fuzzy text match. Within
//! each pass the first matching rule wins; overlapping text patterns are
//! resolved by rule order alone.

use std::sync::Arc;

use crate::config::FailurePolicy;
use crate::error::{report_swallowed, AppError};
use crate::i18n;
use crate::models::{Notification, NotificationKind};
use crate::services::client::RobotechClient;
use crate::services::invitations::{InvitationFlow, InvitationOutcome};
use crate::services::polling::NotificationPoller;
use crate::ui::{AlertKind, Ui};

pub const EDIT_REJECTED_CLUB_PAGE: &str = "editar-club-rechazado.html";
pub const PENDING_CLUBS_PAGE: &str = "admin-clubes.html?tab=pendientes";
pub const REQUESTS_INBOX_PAGE: &str = "representante-solicitudes.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Invitation,
    ClaimClub,
    EditRejectedClub,
    PendingClubs,
    InvitationResult,
    RequestsInbox,
    RequestResult,
    ClubValidated,
    Other,
}

impl Route {
    /// Routes that show a dialog themselves and mark the notification read.
    /// Navigation routes leave that to the target page.
    pub fn marks_read(self) -> bool {
        matches!(
            self,
            Route::InvitationResult | Route::RequestResult | Route::ClubValidated | Route::Other
        )
    }
}

struct Rule {
    route: Route,
    kinds: &'static [NotificationKind],
    title: &'static [&'static str],
    message: &'static [&'static str],
}

impl Rule {
    fn matches_kind(&self, kind: &NotificationKind) -> bool {
        self.kinds.contains(kind)
    }

    fn matches_text(&self, title: &str, message: &str) -> bool {
        self.title.iter().any(|p| title.contains(p)) || self.message.iter().any(|p| message.contains(p))
    }
}

const RULES: &[Rule] = &[
    Rule {
        route: Route::Invitation,
        kinds: &[NotificationKind::InvitationReceived, NotificationKind::ClubInvitation],
        title: &["invitación a club"],
        message: &["te ha invitado"],
    },
    Rule {
        route: Route::ClaimClub,
        kinds: &[NotificationKind::ClubAvailable],
        title: &["club disponible"],
        message: &[],
    },
    Rule {
        route: Route::EditRejectedClub,
        kinds: &[NotificationKind::ClubRejected],
        title: &["club rechazado"],
        message: &[],
    },
    Rule {
        route: Route::PendingClubs,
        kinds: &[NotificationKind::ClubPending, NotificationKind::NewClub],
        title: &["club pendiente", "nuevo club pendiente"],
        message: &[],
    },
    Rule {
        route: Route::InvitationResult,
        kinds: &[NotificationKind::InvitationAccepted, NotificationKind::InvitationRejected],
        title: &[],
        message: &[],
    },
    Rule {
        route: Route::RequestsInbox,
        kinds: &[NotificationKind::RequestReceived],
        title: &["solicitud recibida", "nueva solicitud"],
        message: &["ha solicitado unirse"],
    },
    Rule {
        route: Route::RequestResult,
        kinds: &[NotificationKind::RequestAccepted, NotificationKind::RequestRejected],
        title: &[],
        message: &[],
    },
    Rule {
        route: Route::ClubValidated,
        kinds: &[NotificationKind::ClubValidated],
        title: &[],
        message: &[],
    },
];

/// Pick the handling branch for a notification.
pub fn classify(notification: &Notification) -> Route {
    if let Some(rule) = RULES.iter().find(|r| r.matches_kind(&notification.kind)) {
        return rule.route;
    }

    let title = notification.title.to_lowercase();
    let message = notification.message.to_lowercase();
    RULES
        .iter()
        .find(|r| r.matches_text(&title, &message))
        .map(|r| r.route)
        .unwrap_or(Route::Other)
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    client: RobotechClient,
    poller: NotificationPoller,
    invitations: InvitationFlow,
    ui: Arc<dyn Ui>,
    language: String,
    policy: FailurePolicy,
}

impl NotificationDispatcher {
    pub fn new(
        client: RobotechClient,
        poller: NotificationPoller,
        invitations: InvitationFlow,
        ui: Arc<dyn Ui>,
        language: String,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            client,
            poller,
            invitations,
            ui,
            language,
            policy,
        }
    }

    fn text(&self, key: &str) -> String {
        i18n::tr(Some(&self.language), key, None)
    }

    /// React to a click on a notification row. Returns the branch taken.
    pub async fn handle(&self, notification: &Notification) -> Route {
        let route = classify(notification);
        tracing::debug!(
            notification = ?notification.id,
            kind = notification.kind.as_str(),
            ?route,
            "Dispatching notification click"
        );

        // The generic dialog follows the read flag; the specific ones precede it.
        let mark_before = route == Route::Other;
        if route.marks_read() && mark_before {
            self.mark_read(notification).await;
        }

        match route {
            Route::Invitation => {
                let outcome = self.invitations.run(notification).await;
                if let InvitationOutcome::Failed(message) = &outcome {
                    tracing::debug!("Invitation answer not applied: {}", message);
                }
            }
            Route::ClaimClub => self.open_unclaimed_club().await,
            Route::EditRejectedClub => self.ui.navigate(EDIT_REJECTED_CLUB_PAGE),
            Route::PendingClubs => self.ui.navigate(PENDING_CLUBS_PAGE),
            Route::RequestsInbox => self.ui.navigate(REQUESTS_INBOX_PAGE),
            Route::InvitationResult | Route::RequestResult => {
                let kind = match notification.kind {
                    NotificationKind::InvitationAccepted | NotificationKind::RequestAccepted => {
                        AlertKind::Success
                    }
                    _ => AlertKind::Info,
                };
                self.ui
                    .show_alert(&notification.title, &notification.message, kind)
                    .await;
            }
            Route::ClubValidated => {
                self.ui
                    .show_alert(&notification.title, &notification.message, AlertKind::Success)
                    .await;
            }
            Route::Other => {
                let title = if notification.title.is_empty() {
                    self.text("notifications.default_title")
                } else {
                    notification.title.clone()
                };
                self.ui
                    .show_alert(&title, &notification.message, AlertKind::Info)
                    .await;
            }
        }

        if route.marks_read() && !mark_before {
            self.mark_read(notification).await;
        }

        route
    }

    async fn open_unclaimed_club(&self) {
        match self.client.unclaimed_club().await {
            Ok(Some(club)) => self.ui.navigate(&club.claim_page()),
            Err(AppError::MalformedPayload(_)) | Err(AppError::Json(_)) => {
                self.ui
                    .show_alert(
                        &self.text("dialog.error_title"),
                        &self.text("club.fetch_error"),
                        AlertKind::Error,
                    )
                    .await;
            }
            other => {
                if let Err(e) = other {
                    tracing::debug!("Unclaimed club lookup failed: {}", e);
                }
                self.ui
                    .show_alert(
                        &self.text("club.not_available.title"),
                        &self.text("club.not_available.body"),
                        AlertKind::Error,
                    )
                    .await;
            }
        }
    }

    async fn mark_read(&self, notification: &Notification) {
        let Some(id) = notification.id else {
            return;
        };
        match self.client.mark_read(id).await {
            Ok(()) => {
                self.poller.mark_cached_read(Some(&[id][..])).await;
            }
            Err(e) => report_swallowed(self.policy, &format!("Marking notification {} read", id), &e),
        }
    }
}

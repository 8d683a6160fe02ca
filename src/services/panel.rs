//! Notification dropdown: the view model it renders and the bell
//! open/close behaviour.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::config::FailurePolicy;
use crate::error::{report_swallowed, AppResult};
use crate::format::relative_time;
use crate::i18n;
use crate::models::{Notification, NotificationKind};
use crate::services::client::RobotechClient;
use crate::services::polling::NotificationPoller;
use crate::ui::Ui;

pub const ALL_NOTIFICATIONS_PAGE: &str = "notificaciones.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationIcon {
    Info,
    Success,
    Warning,
}

impl NotificationIcon {
    pub fn for_kind(kind: &NotificationKind) -> Self {
        match kind {
            NotificationKind::Info => NotificationIcon::Info,
            NotificationKind::Success => NotificationIcon::Success,
            _ => NotificationIcon::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationIcon::Info => "info-circle",
            NotificationIcon::Success => "check-circle",
            NotificationIcon::Warning => "exclamation-triangle",
        }
    }
}

/// One row of the dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationItemView {
    pub id: Option<i64>,
    pub title: String,
    pub message: String,
    pub relative_time: String,
    pub unread: bool,
    pub icon: NotificationIcon,
    /// Record handed back to the dispatcher when the row is clicked.
    pub notification: Notification,
}

/// Everything the UI needs to draw the badge and the dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationListView {
    /// Unread notifications in the whole cache, not only the visible rows.
    pub unread_count: usize,
    pub header_title: String,
    pub header_count: String,
    pub new_badge: String,
    pub empty_label: String,
    pub footer_label: String,
    pub footer_link: String,
    pub items: Vec<NotificationItemView>,
}

impl NotificationListView {
    pub fn build(
        cache: &[Notification],
        now: DateTime<Utc>,
        lang: &str,
        visible: usize,
    ) -> Self {
        let header_count = if cache.len() > visible {
            format!("{}+", visible)
        } else {
            cache.len().to_string()
        };

        let items = cache
            .iter()
            .take(visible)
            .map(|n| NotificationItemView {
                id: n.id,
                title: n.title.clone(),
                message: n.message.clone(),
                relative_time: relative_time(lang, n.created_at, now),
                unread: n.is_unread(),
                icon: NotificationIcon::for_kind(&n.kind),
                notification: n.clone(),
            })
            .collect();

        Self {
            unread_count: cache.iter().filter(|n| n.is_unread()).count(),
            header_title: i18n::tr(Some(lang), "notifications.title", None),
            header_count,
            new_badge: i18n::tr(Some(lang), "notifications.new_badge", None),
            empty_label: i18n::tr(Some(lang), "notifications.empty", None),
            footer_label: i18n::tr(Some(lang), "notifications.view_all", None),
            footer_link: ALL_NOTIFICATIONS_PAGE.to_string(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Bell dropdown behaviour.
#[derive(Clone)]
pub struct NotificationPanel {
    client: RobotechClient,
    poller: NotificationPoller,
    ui: Arc<dyn Ui>,
    policy: FailurePolicy,
}

impl NotificationPanel {
    pub fn new(
        client: RobotechClient,
        poller: NotificationPoller,
        ui: Arc<dyn Ui>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            client,
            poller,
            ui,
            policy,
        }
    }

    /// Bell clicked: mark every unread cached notification as read.
    ///
    /// Requests run concurrently; only ids the server accepted are flipped
    /// in the cache. Returns how many were marked.
    pub async fn open(&self) -> usize {
        let unread: Vec<i64> = self
            .poller
            .cached()
            .await
            .iter()
            .filter(|n| n.is_unread())
            .filter_map(|n| n.id)
            .collect();

        if unread.is_empty() {
            return 0;
        }

        let results = join_all(unread.iter().map(|&id| self.client.mark_read(id))).await;

        let mut accepted = Vec::with_capacity(unread.len());
        for (id, result) in unread.into_iter().zip(results) {
            match result {
                Ok(()) => accepted.push(id),
                Err(e) => report_swallowed(self.policy, &format!("Marking notification {} read", id), &e),
            }
        }

        self.poller.mark_cached_read(Some(accepted.as_slice())).await
    }

    /// Dropdown hidden: drop the unread styling.
    pub fn close(&self) {
        self.ui.clear_unread_highlight();
    }

    /// Bulk mark-read, then redraw from the updated cache.
    pub async fn mark_all_read(&self) -> AppResult<usize> {
        self.client.mark_all_read().await?;
        let changed = self.poller.mark_cached_read(None).await;
        self.poller.render().await;
        Ok(changed)
    }
}

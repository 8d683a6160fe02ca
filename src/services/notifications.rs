use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::Notification;
use crate::services::api::Backend;
use crate::services::client::RobotechClient;
use crate::services::dispatch::{NotificationDispatcher, Route};
use crate::services::invitations::InvitationFlow;
use crate::services::panel::NotificationPanel;
use crate::services::polling::{NotificationPoller, PollingState};
use crate::services::session::SessionStore;
use crate::ui::Ui;

/// Entry points the surrounding page wires to its events.
///
/// All components share one [`PollingState`], so the cache seen by the
/// panel, the dispatcher and the invitation flow is the one the poller
/// keeps up to date.
#[derive(Clone)]
pub struct NotificationSystem {
    client: RobotechClient,
    poller: NotificationPoller,
    panel: NotificationPanel,
    dispatcher: NotificationDispatcher,
}

impl NotificationSystem {
    pub fn new(
        config: &Config,
        backend: Arc<dyn Backend>,
        session: Arc<dyn SessionStore>,
        ui: Arc<dyn Ui>,
    ) -> Self {
        let client = RobotechClient::new(backend);
        let policy = config.polling.failure_policy;

        let poller = NotificationPoller::new(
            client.clone(),
            session,
            ui.clone(),
            Arc::new(PollingState::new()),
            config.polling.clone(),
            config.ui.clone(),
        );
        let panel = NotificationPanel::new(client.clone(), poller.clone(), ui.clone(), policy);
        let invitations =
            InvitationFlow::new(client.clone(), poller.clone(), ui.clone(), config.ui.clone());
        let dispatcher = NotificationDispatcher::new(
            client.clone(),
            poller.clone(),
            invitations,
            ui,
            config.ui.language.clone(),
            policy,
        );

        Self {
            client,
            poller,
            panel,
            dispatcher,
        }
    }

    /// Begin polling. Returns false when already running or logged out.
    pub async fn start(&self) -> bool {
        self.poller.start().await
    }

    pub fn stop(&self) {
        self.poller.stop();
    }

    pub fn is_running(&self) -> bool {
        self.poller.state().is_started()
    }

    /// Bell clicked.
    pub async fn open_panel(&self) -> usize {
        self.panel.open().await
    }

    /// Dropdown hidden.
    pub fn close_panel(&self) {
        self.panel.close();
    }

    /// Notification row clicked.
    pub async fn handle_click(&self, notification: &Notification) -> Route {
        self.dispatcher.handle(notification).await
    }

    pub async fn mark_all_read(&self) -> AppResult<usize> {
        self.panel.mark_all_read().await
    }

    pub async fn cached(&self) -> Vec<Notification> {
        self.poller.cached().await
    }

    /// Unread total as counted by the server, beyond the cached window.
    pub async fn unread_count(&self) -> AppResult<u64> {
        self.client.unread_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvitationAction;
    use crate::services::session::{MemorySessionStore, TOKEN_KEY};
    use crate::test_support::{FakeBackend, RecordingUi, UiEvent};
    use crate::ui::AlertKind;
    use http::Method;
    use serde_json::json;

    const UNREAD: &str = "/api/notificaciones?leidas=false&limit=10";
    const READ: &str = "/api/notificaciones?leidas=true&limit=5";

    fn system(answer: Option<InvitationAction>) -> (Arc<FakeBackend>, Arc<RecordingUi>, NotificationSystem) {
        let backend = Arc::new(FakeBackend::new());
        let ui = Arc::new(RecordingUi::with_answer(answer));
        let session = Arc::new(MemorySessionStore::new());
        session.set(TOKEN_KEY, "token".to_string());

        let system = NotificationSystem::new(&Config::default(), backend.clone(), session, ui.clone());
        (backend, ui, system)
    }

    #[tokio::test(start_paused = true)]
    async fn click_on_rendered_invitation_accepts_and_reloads() {
        let (backend, ui, system) = system(Some(InvitationAction::Accept));
        backend.respond(
            Method::GET,
            UNREAD,
            FakeBackend::ok(json!([{
                "idNotificacion": 31,
                "tipo": "INVITACION_CLUB",
                "titulo": "Invitación a club",
                "mensaje": "El club 'Halcones' te ha invitado",
                "leida": false,
                "fechaCreacion": "2025-03-01T10:00:00",
                "metadata": { "idInvitacion": 42 }
            }])),
        );
        backend.respond(Method::GET, READ, FakeBackend::ok(json!([])));
        backend.respond(
            Method::POST,
            "/api/competidor/invitaciones/42/aceptar",
            FakeBackend::ok(json!({ "mensaje": "ok" })),
        );

        assert!(system.start().await);
        let rendered = ui.renders();
        assert_eq!(rendered.len(), 1);
        let row = rendered[0].items[0].notification.clone();

        assert_eq!(system.handle_click(&row).await, Route::Invitation);
        assert!(ui.events().contains(&UiEvent::Alert {
            title: "¡Bienvenido al Club!".to_string(),
            message: "¡Te has unido al club exitosamente! Recargando tu sesión...".to_string(),
            kind: AlertKind::Success,
        }));
        assert!(ui.events().contains(&UiEvent::Reload));

        system.stop();
        assert!(!system.is_running());
    }

    #[tokio::test]
    async fn panel_open_and_close_share_the_poller_cache() {
        let (backend, ui, system) = system(None);
        backend.respond(
            Method::GET,
            UNREAD,
            FakeBackend::ok(json!([{ "id": 1, "leida": false }])),
        );
        backend.respond(Method::GET, READ, FakeBackend::ok(json!([])));
        backend.respond(Method::PUT, "/api/notificaciones/1/marcar-leida", FakeBackend::ok(json!({})));

        assert!(system.start().await);
        assert_eq!(system.open_panel().await, 1);
        assert!(system.cached().await.iter().all(|n| n.read));

        system.close_panel();
        assert_eq!(ui.events().last(), Some(&UiEvent::ClearHighlight));
        system.stop();
    }

    #[tokio::test]
    async fn unread_count_comes_from_the_server() {
        let (backend, _ui, system) = system(None);
        backend.respond(
            Method::GET,
            "/api/notificaciones/count",
            FakeBackend::ok(json!({ "count": 14 })),
        );
        assert_eq!(system.unread_count().await.unwrap(), 14);

        backend.respond(
            Method::GET,
            "/api/notificaciones/count",
            FakeBackend::fail(401, "Sesión expirada"),
        );
        assert_eq!(system.unread_count().await.unwrap_err().status(), Some(401));
    }

    #[tokio::test]
    async fn logged_out_session_never_polls() {
        let backend = Arc::new(FakeBackend::new());
        let ui = Arc::new(RecordingUi::new());
        let system = NotificationSystem::new(
            &Config::default(),
            backend.clone(),
            Arc::new(MemorySessionStore::new()),
            ui.clone(),
        );

        assert!(!system.start().await);
        system.stop();
        assert!(backend.calls().is_empty());
        assert!(ui.events().is_empty());
    }
}

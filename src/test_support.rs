//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::format::parse_timestamp;
use crate::models::{InvitationAction, Notification, NotificationKind};
use crate::services::api::{ApiResponse, Backend};
use crate::services::panel::NotificationListView;
use crate::ui::{AlertKind, InvitationPrompt, Navigator, Ui};

/// Canned backend keyed by method and path.
///
/// Each route keeps answering with the last response installed for it.
/// Unknown routes answer 404.
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<HashMap<(Method, String), ApiResponse>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<(Method, String)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(data: Value) -> ApiResponse {
        ApiResponse {
            success: true,
            data,
            message: "Operación exitosa".to_string(),
            status: 200,
        }
    }

    pub fn fail(status: u16, message: &str) -> ApiResponse {
        ApiResponse {
            success: false,
            data: json!({ "mensaje": message }),
            message: message.to_string(),
            status,
        }
    }

    pub fn respond(&self, method: Method, path: &str, response: ApiResponse) {
        let mut routes = self.routes.lock().unwrap();
        routes.insert((method, path.to_string()), response);
    }

    /// Make every request to `path` wait before answering.
    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, method: &Method, path: &str) -> ApiResponse {
        let routes = self.routes.lock().unwrap();
        routes
            .get(&(method.clone(), path.to_string()))
            .cloned()
            .unwrap_or_else(|| Self::fail(404, "Recurso no encontrado"))
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn request(&self, path: &str, method: Method, _body: Option<Value>) -> ApiResponse {
        self.calls.lock().unwrap().push((method.clone(), path.to_string()));

        let delay = self.delays.lock().unwrap().get(path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.answer(&method, path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Render(NotificationListView),
    ClearHighlight,
    Alert {
        title: String,
        message: String,
        kind: AlertKind,
    },
    Prompt(InvitationPrompt),
    Loading,
    LoadingDone,
    Navigate(String),
    Reload,
}

/// UI that records every call and answers invitation prompts with a
/// fixed action.
#[derive(Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
    answer: Option<InvitationAction>,
    reloaded_at: Mutex<Option<Instant>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(answer: Option<InvitationAction>) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn renders(&self) -> Vec<NotificationListView> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Render(view) => Some(view),
                _ => None,
            })
            .collect()
    }

    pub fn reloaded_at(&self) -> Option<Instant> {
        *self.reloaded_at.lock().unwrap()
    }

    fn record(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Navigator for RecordingUi {
    fn navigate(&self, target: &str) {
        self.record(UiEvent::Navigate(target.to_string()));
    }

    fn reload(&self) {
        *self.reloaded_at.lock().unwrap() = Some(Instant::now());
        self.record(UiEvent::Reload);
    }
}

#[async_trait]
impl Ui for RecordingUi {
    fn render_notifications(&self, view: &NotificationListView) {
        self.record(UiEvent::Render(view.clone()));
    }

    fn clear_unread_highlight(&self) {
        self.record(UiEvent::ClearHighlight);
    }

    async fn show_alert(&self, title: &str, message: &str, kind: AlertKind) {
        self.record(UiEvent::Alert {
            title: title.to_string(),
            message: message.to_string(),
            kind,
        });
    }

    async fn prompt_invitation(&self, prompt: &InvitationPrompt) -> Option<InvitationAction> {
        self.record(UiEvent::Prompt(prompt.clone()));
        self.answer
    }

    fn show_loading(&self) {
        self.record(UiEvent::Loading);
    }

    fn hide_loading(&self) {
        self.record(UiEvent::LoadingDone);
    }
}

/// Minimal notification; an empty `created_at` leaves the timestamp unset.
pub fn notification(id: i64, created_at: &str, read: bool) -> Notification {
    Notification {
        id: Some(id),
        kind: NotificationKind::Other("GENERAL".to_string()),
        title: format!("Notificación {}", id),
        message: String::new(),
        read,
        created_at: parse_timestamp(created_at),
        metadata: Default::default(),
        invitation_id: None,
    }
}

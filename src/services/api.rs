use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{header, Method, StatusCode};
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::i18n;
use crate::services::session::SessionStore;
use crate::ui::Navigator;

/// Paths that never carry the bearer token.
const PUBLIC_PATH_MARKERS: [&str; 2] = ["/api/auth/", "/api/public/"];
const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGIN_PAGE: &str = "login.html";

/// Unified result of one backend call.
///
/// Every call produces an envelope, including transport failures, so callers
/// branch on `success` instead of handling two error channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Value,
    pub message: String,
    pub status: u16,
}

impl ApiResponse {
    pub fn connection_error(lang: &str) -> Self {
        ApiResponse {
            success: false,
            data: Value::Null,
            message: i18n::tr(Some(lang), "api.connection_error", None),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }

    /// Payload of a successful call, or the envelope turned into an error.
    pub fn into_result(self) -> AppResult<Value> {
        if self.success {
            return Ok(self.data);
        }
        if self.status == StatusCode::UNAUTHORIZED.as_u16() {
            return Err(AppError::SessionExpired);
        }
        Err(AppError::Api {
            status: self.status,
            message: self.message,
        })
    }
}

/// Generic HTTP call abstraction consumed by the notification core.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    async fn request(&self, path: &str, method: Method, body: Option<Value>) -> ApiResponse;
}

fn is_public_path(path: &str) -> bool {
    PUBLIC_PATH_MARKERS.iter().any(|marker| path.contains(marker))
}

fn non_empty_str<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Pick the human message for an envelope.
///
/// The backend answers with `mensaje`; older endpoints use `message` or
/// `error`.
fn pick_message(lang: &str, data: &Value, success: bool, status: u16) -> String {
    if success {
        non_empty_str(data, "mensaje")
            .or_else(|| non_empty_str(data, "message"))
            .map(str::to_string)
            .unwrap_or_else(|| i18n::tr(Some(lang), "api.operation_ok", None))
    } else {
        non_empty_str(data, "mensaje")
            .or_else(|| non_empty_str(data, "message"))
            .or_else(|| non_empty_str(data, "error"))
            .map(str::to_string)
            .unwrap_or_else(|| {
                i18n::tr(
                    Some(lang),
                    "api.error_status",
                    Some(&[("status", &status.to_string())]),
                )
            })
    }
}

/// `Backend` over reqwest with bearer-token injection from the session.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    lang: String,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl HttpBackend {
    pub fn new(
        config: &Config,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            lang: config.ui.language.clone(),
            session,
            navigator,
        })
    }

    fn expired_session(&self) -> ApiResponse {
        ApiResponse {
            success: false,
            data: Value::Null,
            message: i18n::tr(Some(&self.lang), "api.session_expired", None),
            status: StatusCode::UNAUTHORIZED.as_u16(),
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn request(&self, path: &str, method: Method, body: Option<Value>) -> ApiResponse {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            if method == Method::POST || method == Method::PUT {
                request = request.json(&body);
            }
        }

        if let Some(token) = self.session.token() {
            if !is_public_path(path) {
                request = request.bearer_auth(token);
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("API request {} {} failed: {}", method, path, e);
                return ApiResponse::connection_error(&self.lang);
            }
        };

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && !path.contains(LOGIN_PATH) {
            tracing::warn!("Session rejected by backend on {} {}", method, path);
            self.session.clear();
            self.navigator.navigate(LOGIN_PAGE);
            return self.expired_session();
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let data = if is_json {
            match response.json::<Value>().await {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!("Invalid JSON from {} {}: {}", method, path, e);
                    return ApiResponse::connection_error(&self.lang);
                }
            }
        } else {
            let text = response.text().await.unwrap_or_default();
            json!({ "mensaje": text })
        };

        let success = status.is_success();
        let message = pick_message(&self.lang, &data, success, status.as_u16());

        ApiResponse {
            success,
            data,
            message,
            status: status.as_u16(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::{MemorySessionStore, TOKEN_KEY};
    use crate::test_support::{RecordingUi, UiEvent};
    use mockito::Matcher;

    fn backend_for(
        base_url: &str,
        token: Option<&str>,
    ) -> (HttpBackend, Arc<MemorySessionStore>, Arc<RecordingUi>) {
        let mut config = Config::default();
        config.api.base_url = base_url.to_string();

        let session = Arc::new(MemorySessionStore::new());
        if let Some(token) = token {
            session.set(TOKEN_KEY, token.to_string());
        }
        let ui = Arc::new(RecordingUi::new());

        let backend = HttpBackend::new(&config, session.clone(), ui.clone()).unwrap();
        (backend, session, ui)
    }

    #[test]
    fn message_priority() {
        assert_eq!(
            pick_message("es", &json!({"mensaje": "A", "message": "B"}), false, 400),
            "A"
        );
        assert_eq!(pick_message("es", &json!({"error": "C"}), false, 400), "C");
        assert_eq!(pick_message("es", &json!({"mensaje": ""}), false, 404), "Error 404");
        assert_eq!(pick_message("es", &json!([1, 2]), true, 200), "Operación exitosa");
        assert_eq!(pick_message("es", &json!({"message": "ok"}), true, 200), "ok");
    }

    #[test]
    fn public_paths_are_detected() {
        assert!(is_public_path("/api/auth/login"));
        assert!(is_public_path("/api/public/torneos"));
        assert!(!is_public_path("/api/notificaciones"));
    }

    #[test]
    fn into_result_maps_envelopes() {
        let ok = ApiResponse {
            success: true,
            data: json!([1]),
            message: "ok".into(),
            status: 200,
        };
        assert_eq!(ok.into_result().unwrap(), json!([1]));

        let expired = ApiResponse {
            success: false,
            data: Value::Null,
            message: "Sesión expirada".into(),
            status: 401,
        };
        assert!(matches!(expired.into_result(), Err(AppError::SessionExpired)));

        let conflict = ApiResponse {
            success: false,
            data: Value::Null,
            message: "Ya respondida".into(),
            status: 409,
        };
        match conflict.into_result() {
            Err(AppError::Api { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Ya respondida");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn injects_bearer_token_on_private_paths() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/competidor/invitaciones")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"idInvitacion": 1}]"#)
            .create_async()
            .await;

        let (backend, _, _) = backend_for(&server.url(), Some("tok-123"));
        let resp = backend
            .request("/api/competidor/invitaciones", Method::GET, None)
            .await;

        mock.assert_async().await;
        assert!(resp.success);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data, json!([{"idInvitacion": 1}]));
        assert_eq!(resp.message, "Operación exitosa");
    }

    #[tokio::test]
    async fn skips_token_on_public_paths() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/public/sedes")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let (backend, _, _) = backend_for(&server.url(), Some("tok-123"));
        let resp = backend.request("/api/public/sedes", Method::GET, None).await;

        mock.assert_async().await;
        assert!(resp.success);
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/notificaciones/count")
            .with_status(401)
            .create_async()
            .await;

        let (backend, session, ui) = backend_for(&server.url(), Some("stale"));
        let resp = backend
            .request("/api/notificaciones/count", Method::GET, None)
            .await;

        assert!(!resp.success);
        assert_eq!(resp.status, 401);
        assert_eq!(resp.message, "Sesión expirada");
        assert!(!session.is_authenticated());
        assert_eq!(ui.events(), vec![UiEvent::Navigate(LOGIN_PAGE.to_string())]);
    }

    #[tokio::test]
    async fn login_failure_keeps_session_and_reports_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/auth/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"mensaje":"Email o contraseña incorrectos. Intentos restantes: 4"}"#)
            .create_async()
            .await;

        let (backend, session, ui) = backend_for(&server.url(), Some("previous"));
        let resp = backend
            .request(
                "/api/auth/login",
                Method::POST,
                Some(json!({"email": "a@b.pe", "password": "x"})),
            )
            .await;

        assert!(!resp.success);
        assert_eq!(
            resp.message,
            "Email o contraseña incorrectos. Intentos restantes: 4"
        );
        assert!(session.is_authenticated());
        assert!(ui.events().is_empty());
    }

    #[tokio::test]
    async fn plain_text_bodies_are_wrapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/api/notificaciones/4/marcar-leida")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("Notificación marcada")
            .create_async()
            .await;

        let (backend, _, _) = backend_for(&server.url(), Some("t"));
        let resp = backend
            .request("/api/notificaciones/4/marcar-leida", Method::PUT, None)
            .await;

        assert!(resp.success);
        assert_eq!(resp.data, json!({"mensaje": "Notificación marcada"}));
        assert_eq!(resp.message, "Notificación marcada");
    }

    #[tokio::test]
    async fn error_status_without_message_uses_status_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/clubes/sin-reclamar")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let (backend, _, _) = backend_for(&server.url(), Some("t"));
        let resp = backend
            .request("/api/clubes/sin-reclamar", Method::GET, None)
            .await;

        assert!(!resp.success);
        assert_eq!(resp.status, 404);
        assert_eq!(resp.message, "Error 404");
    }

    #[tokio::test]
    async fn transport_failure_becomes_connection_error() {
        let (backend, _, _) = backend_for("http://127.0.0.1:9", Some("t"));
        let resp = backend
            .request("/api/notificaciones", Method::GET, None)
            .await;

        assert_eq!(resp, ApiResponse::connection_error("es"));
    }
}

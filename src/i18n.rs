/*
Small i18n helper for the notification client.

This module provides:
- An embedded translations store for ES/EN (compile-time embedded JSON).
- A `tr` function to lookup translations by key + optional params.
- `t` / `t_with` convenience wrappers using the default language (DEFAULT_LANG).

Usage:
    use crate::i18n;
    let title = i18n::t("invitation.accepted.title");
    let ago = i18n::tr(Some("en"), "time.minutes", Some(&[("n", "5")]));

Notes:
- Placeholders in translation strings use single-brace format: `{name}`.
- Default language is `es`. If a key is missing for the requested language,
  the default language value is used.
*/

use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_LANG: &str = "es";

static TRANSLATIONS: OnceLock<HashMap<String, HashMap<String, String>>> = OnceLock::new();

const ES_JSON: &str = r#"
{
  "app.name": "Robotech",
  "api.session_expired": "Sesión expirada",
  "api.connection_error": "Error de conexión con el servidor",
  "api.operation_ok": "Operación exitosa",
  "api.error_status": "Error {status}",
  "dialog.error_title": "Error",
  "notifications.title": "Notificaciones",
  "notifications.empty": "No tienes notificaciones",
  "notifications.new_badge": "Nueva",
  "notifications.view_all": "Ver todas las notificaciones",
  "notifications.default_title": "Notificación",
  "time.now": "Ahora",
  "time.moment": "Hace un momento",
  "time.minutes": "Hace {n} min",
  "time.hours": "Hace {n} h",
  "time.day": "Hace {n} día",
  "time.days": "Hace {n} días",
  "club.not_available.title": "Club No Disponible",
  "club.not_available.body": "No se encontró el club para reclamar",
  "club.fetch_error": "Error al obtener el club",
  "invitation.unresolvable": "No se pudo procesar la invitación. Por favor, ve a la sección de invitaciones directamente.",
  "invitation.default_club": "un club",
  "invitation.modal_title": "Invitación a Club",
  "invitation.modal_hint": "Al aceptar, te unirás al club y podrás participar en torneos representándolos.",
  "invitation.modal_question": "¿Deseas unirte a este club?",
  "invitation.accept": "Aceptar",
  "invitation.reject": "Rechazar",
  "invitation.accepted.title": "¡Bienvenido al Club!",
  "invitation.accepted.body": "¡Te has unido al club exitosamente! Recargando tu sesión...",
  "invitation.rejected.title": "Invitación Rechazada",
  "invitation.rejected.body": "Has rechazado la invitación al club.",
  "invitation.respond_error": "No se pudo procesar tu respuesta. Por favor, intenta nuevamente."
}
"#;

const EN_JSON: &str = r#"
{
  "app.name": "Robotech",
  "api.session_expired": "Session expired",
  "api.connection_error": "Could not connect to the server",
  "api.operation_ok": "Operation successful",
  "api.error_status": "Error {status}",
  "dialog.error_title": "Error",
  "notifications.title": "Notifications",
  "notifications.empty": "You have no notifications",
  "notifications.new_badge": "New",
  "notifications.view_all": "See all notifications",
  "notifications.default_title": "Notification",
  "time.now": "Now",
  "time.moment": "Just now",
  "time.minutes": "{n} min ago",
  "time.hours": "{n} h ago",
  "time.day": "{n} day ago",
  "time.days": "{n} days ago",
  "club.not_available.title": "Club Not Available",
  "club.not_available.body": "No club was found to claim",
  "club.fetch_error": "Could not load the club",
  "invitation.unresolvable": "The invitation could not be processed. Please open the invitations section directly.",
  "invitation.default_club": "a club",
  "invitation.modal_title": "Club Invitation",
  "invitation.modal_hint": "If you accept you will join the club and compete in tournaments on its behalf.",
  "invitation.modal_question": "Do you want to join this club?",
  "invitation.accept": "Accept",
  "invitation.reject": "Reject",
  "invitation.accepted.title": "Welcome to the Club!",
  "invitation.accepted.body": "You joined the club successfully! Reloading your session...",
  "invitation.rejected.title": "Invitation Rejected",
  "invitation.rejected.body": "You rejected the club invitation.",
  "invitation.respond_error": "Your answer could not be processed. Please try again."
}
"#;

fn build_translations() -> HashMap<String, HashMap<String, String>> {
    let mut out = HashMap::new();

    let es_map: HashMap<String, String> = serde_json::from_str(ES_JSON).unwrap_or_else(|e| {
        panic!("failed to parse ES_JSON in i18n module: {}", e);
    });
    out.insert("es".to_string(), es_map);

    let en_map: HashMap<String, String> = serde_json::from_str(EN_JSON).unwrap_or_else(|e| {
        panic!("failed to parse EN_JSON in i18n module: {}", e);
    });
    out.insert("en".to_string(), en_map);

    out
}

fn translations() -> &'static HashMap<String, HashMap<String, String>> {
    TRANSLATIONS.get_or_init(build_translations)
}

/// Normalize a language tag into a short, lowercase code (e.g. "es-PE" -> "es").
pub fn normalize_language(lang: &str) -> String {
    lang.split('-').next().unwrap_or(lang).to_lowercase()
}

/// Returns true if the given language code has an embedded catalogue.
pub fn is_supported_language(lang: &str) -> bool {
    translations().contains_key(lang)
}

/// Translate a key using an explicit language (or default if None).
///
/// Placeholders `{name}` are replaced from `params`. Missing keys fall back
/// to the default language and finally to the key itself.
pub fn tr(lang: Option<&str>, key: &str, params: Option<&[(&str, &str)]>) -> String {
    let map = translations();

    let desired = lang.unwrap_or(DEFAULT_LANG);

    let val = map
        .get(desired)
        .and_then(|m| m.get(key))
        .cloned()
        .or_else(|| map.get(DEFAULT_LANG).and_then(|m| m.get(key)).cloned())
        .unwrap_or_else(|| key.to_string());

    if let Some(params) = params {
        let mut s = val;
        for (k, v) in params {
            s = s.replace(&format!("{{{}}}", k), v);
        }
        s
    } else {
        val
    }
}

/// Translate using the default language.
pub fn t(key: &str) -> String {
    tr(None, key, None)
}

/// Translate with params using the default language.
pub fn t_with(key: &str, params: &[(&str, &str)]) -> String {
    tr(None, key, Some(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_language_is_spanish() {
        assert_eq!(t("invitation.default_club"), "un club");
        assert_eq!(t("notifications.empty"), "No tienes notificaciones");
    }

    #[test]
    fn params_are_substituted() {
        assert_eq!(t_with("time.minutes", &[("n", "5")]), "Hace 5 min");
        assert_eq!(
            tr(Some("en"), "time.hours", Some(&[("n", "3")])),
            "3 h ago"
        );
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        assert_eq!(tr(Some("fr"), "time.now", None), "Ahora");
    }

    #[test]
    fn missing_key_returns_key() {
        let k = "non.existent.key";
        assert_eq!(t(k), k.to_string());
    }

    #[test]
    fn catalogues_share_the_same_keys() {
        let map = translations();
        let es = &map["es"];
        let en = &map["en"];
        for key in es.keys() {
            assert!(en.contains_key(key), "missing EN translation for {}", key);
        }
    }

    #[test]
    fn language_helpers() {
        assert!(is_supported_language("es"));
        assert!(is_supported_language("en"));
        assert!(!is_supported_language("ru"));
        assert_eq!(normalize_language("es-PE"), "es");
        assert_eq!(normalize_language("EN-us"), "en");
    }
}

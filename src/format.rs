use chrono::{DateTime, NaiveDateTime, Utc};

use crate::i18n;

/// Parse a backend timestamp.
///
/// Accepts RFC3339 strings and the zone-less ISO form the backend emits
/// (`2025-03-01T10:15:00` with optional fractional seconds), the latter
/// being read as UTC. Returns None if parsing fails.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Human string for how long ago `created_at` happened, relative to `now`.
pub fn relative_time(lang: &str, created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return i18n::tr(Some(lang), "time.now", None);
    };

    let seconds = (now - created_at).num_seconds();
    if seconds < 60 {
        return i18n::tr(Some(lang), "time.moment", None);
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return i18n::tr(Some(lang), "time.minutes", Some(&[("n", &minutes.to_string())]));
    }

    let hours = minutes / 60;
    if hours < 24 {
        return i18n::tr(Some(lang), "time.hours", Some(&[("n", &hours.to_string())]));
    }

    let days = hours / 24;
    if days < 7 {
        let key = if days == 1 { "time.day" } else { "time.days" };
        return i18n::tr(Some(lang), key, Some(&[("n", &days.to_string())]));
    }

    created_at.format("%d/%m/%Y").to_string()
}

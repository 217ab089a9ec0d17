use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en-US";

#[derive(Clone)]
pub struct I18nService {
    current_lang: String,
    translations: HashMap<String, HashMap<String, String>>,
}

impl I18nService {
    pub fn new(lang: &str) -> Self {
        let mut translations = HashMap::new();

        let de_content = include_str!("../../locales/de-DE/main.ftl");
        let en_content = include_str!("../../locales/en-US/main.ftl");

        translations.insert("de-DE".to_string(), parse_ftl(de_content));
        translations.insert("en-US".to_string(), parse_ftl(en_content));

        I18nService {
            current_lang: lang.to_string(),
            translations,
        }
    }

    /// Picks the catalogue for a system locale such as `de_AT` or `en-GB`.
    pub fn for_locale(locale: &str) -> Self {
        if locale.starts_with("de") { I18nService::new("de-DE") } else { I18nService::new(DEFAULT_LANG) }
    }

    pub fn lang(&self) -> &str {
        &self.current_lang
    }

    pub fn translate(&self, key: &str) -> String {
        if let Some(lang_map) = self.translations.get(&self.current_lang) {
            if let Some(val) = lang_map.get(key) {
                return val.clone();
            }
        }

        if let Some(lang_map) = self.translations.get(DEFAULT_LANG) {
            if let Some(val) = lang_map.get(key) {
                return val.clone();
            }
        }

        key.to_string()
    }

    /// Renders a server timestamp as a date in the current language, in the
    /// viewer's time zone. Timestamps without an offset are taken as local.
    /// Values that do not parse are shown as received.
    pub fn format_date(&self, raw: &str) -> String {
        let Some(date) = parse_date(raw) else {
            return raw.to_string();
        };
        let pattern = self.translate("date-format");
        date.format(&pattern).to_string()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_ftl(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

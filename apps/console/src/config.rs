use std::{collections::HashMap, fs};

#[derive(Debug)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8443".into(),
            request_timeout_secs: 30,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("request_timeout_secs") {
                apply_timeout(&mut settings, v);
            }
        }
    }

    if let Ok(v) = std::env::var("SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECS") {
        apply_timeout(&mut settings, &v);
    }

    settings
}

fn apply_timeout(settings: &mut Settings, raw: &str) {
    if let Ok(parsed) = raw.parse::<u64>() {
        if parsed > 0 {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_unparseable_timeout_values() {
        let mut settings = Settings::default();
        apply_timeout(&mut settings, "not-a-number");
        assert_eq!(settings.request_timeout_secs, Settings::default().request_timeout_secs);
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut settings = Settings::default();
        apply_timeout(&mut settings, "0");
        assert_eq!(settings.request_timeout_secs, Settings::default().request_timeout_secs);
    }

    #[test]
    fn applies_positive_timeout() {
        let mut settings = Settings::default();
        apply_timeout(&mut settings, "120");
        assert_eq!(settings.request_timeout_secs, 120);
    }
}

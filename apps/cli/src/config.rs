use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::domain::{Session, UserId};
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "events.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/graphql".into(),
            token: None,
            user_id: None,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    token: Option<String>,
    user_id: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file, then the environment. An explicitly named
/// file must exist; the default `events.toml` is optional.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = explicit_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    match fs::read_to_string(&path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if explicit_path.is_none() && err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

impl Settings {
    fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if let Some(v) = file_cfg.api_url {
            self.api_url = v;
        }
        if let Some(v) = file_cfg.token {
            self.token = Some(v);
        }
        if let Some(v) = file_cfg.user_id {
            self.user_id = Some(v);
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        Ok(())
    }

    /// `APP__*` names win over `EVENTS_*` when both are set.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = last_set(&lookup, &["EVENTS_API_URL", "APP__API_URL"]) {
            self.api_url = v;
        }
        if let Some(v) = last_set(&lookup, &["EVENTS_TOKEN", "APP__TOKEN"]) {
            self.token = Some(v);
        }
        if let Some(v) = last_set(&lookup, &["EVENTS_USER_ID", "APP__USER_ID"]) {
            self.user_id = Some(v);
        }
        if let Some(v) = last_set(
            &lookup,
            &["EVENTS_REQUEST_TIMEOUT_SECS", "APP__REQUEST_TIMEOUT_SECS"],
        ) {
            self.request_timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("invalid request timeout '{v}'"))?;
        }
        Ok(())
    }

    pub fn apply_overrides(
        &mut self,
        api_url: Option<String>,
        token: Option<String>,
        user_id: Option<String>,
    ) {
        if let Some(v) = api_url {
            self.api_url = v;
        }
        if let Some(v) = token {
            self.token = Some(v);
        }
        if let Some(v) = user_id {
            self.user_id = Some(v);
        }
    }

    pub fn endpoint(&self) -> anyhow::Result<Url> {
        let url = Url::parse(self.api_url.trim())
            .with_context(|| format!("invalid api_url '{}'", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api_url must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session(&self) -> Session {
        Session {
            token: non_blank(self.token.as_deref()),
            user_id: non_blank(self.user_id.as_deref()).map(UserId::from),
        }
    }
}

fn last_set(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|key| lookup(key)).last()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

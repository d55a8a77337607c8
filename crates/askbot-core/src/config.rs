use std::{env, path::PathBuf};

use crate::{errors::Error, Result};

pub const DEFAULT_REGISTRY_FILE: &str = "thread_storage.json";
pub const DEFAULT_WEBSITE_URL: &str = "https://telegram-miniapp-three.vercel.app/";
pub const DEFAULT_ANSWER_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_ANSWER_MODEL: &str = "gpt-4o-mini";

/// Typed configuration, built once at startup and shared by reference.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub website_url: String,

    // Registry
    pub registry_file: PathBuf,

    // Answer service
    pub answer_api_url: String,
    pub answer_api_key: Option<String>,
    pub answer_model: String,
    pub answer_system_prompt: Option<String>,
}

impl Config {
    /// Load from the process environment. Call [`load_dotenv`] first to pick
    /// up a `.env` file.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = get("TG_TOKEN").ok_or_else(|| {
            Error::Config("TG_TOKEN environment variable is required".to_string())
        })?;

        let website_url = get("WEBSITE_URL").unwrap_or_else(|| DEFAULT_WEBSITE_URL.to_string());
        reqwest::Url::parse(&website_url)
            .map_err(|e| Error::Config(format!("WEBSITE_URL is not a valid URL: {e}")))?;

        let registry_file = PathBuf::from(
            get("REGISTRY_FILE").unwrap_or_else(|| DEFAULT_REGISTRY_FILE.to_string()),
        );

        let answer_api_url =
            get("ANSWER_API_URL").unwrap_or_else(|| DEFAULT_ANSWER_API_URL.to_string());
        let answer_api_key = get("ANSWER_API_KEY");
        let answer_model = get("ANSWER_MODEL").unwrap_or_else(|| DEFAULT_ANSWER_MODEL.to_string());
        let answer_system_prompt = get("ANSWER_SYSTEM_PROMPT");

        Ok(Self {
            telegram_bot_token,
            website_url,
            registry_file,
            answer_api_url,
            answer_api_key,
            answer_model,
            answer_system_prompt,
        })
    }
}

/// Apply an optional `.env` file to the process environment. Variables already
/// set are not overridden.
///
/// A missing file is not a problem. Anything else (unreadable file, bad line)
/// is returned so the caller can log it once logging is up.
pub fn load_dotenv() -> Option<dotenvy::Error> {
    dotenv_problem(dotenvy::dotenv())
}

fn dotenv_problem<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_fatal() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup(&[("TG_TOKEN", "   ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn applies_defaults() {
        let cfg = Config::from_lookup(lookup(&[("TG_TOKEN", "123:abc")])).unwrap();
        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert_eq!(cfg.registry_file, PathBuf::from(DEFAULT_REGISTRY_FILE));
        assert_eq!(cfg.website_url, DEFAULT_WEBSITE_URL);
        assert_eq!(cfg.answer_api_url, DEFAULT_ANSWER_API_URL);
        assert_eq!(cfg.answer_model, DEFAULT_ANSWER_MODEL);
        assert!(cfg.answer_api_key.is_none());
        assert!(cfg.answer_system_prompt.is_none());
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let cfg = Config::from_lookup(lookup(&[
            ("TG_TOKEN", "t"),
            ("REGISTRY_FILE", "/var/lib/askbot/users.json"),
            ("ANSWER_API_KEY", " sk-test "),
            ("ANSWER_MODEL", ""),
        ]))
        .unwrap();
        assert_eq!(cfg.registry_file, PathBuf::from("/var/lib/askbot/users.json"));
        assert_eq!(cfg.answer_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.answer_model, DEFAULT_ANSWER_MODEL);
    }

    #[test]
    fn missing_dotenv_is_not_a_problem() {
        let dir = tempfile::tempdir().unwrap();
        assert!(dotenv_problem(dotenvy::from_path(dir.path().join(".env"))).is_none());
    }

    #[test]
    fn malformed_dotenv_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "ASKBOT_TEST_UNTERMINATED='no closing quote\n").unwrap();

        let problem = dotenv_problem(dotenvy::from_path(&path));
        assert!(
            matches!(problem, Some(dotenvy::Error::LineParse(..))),
            "{problem:?}"
        );
    }

    #[test]
    fn rejects_invalid_website_url() {
        let err = Config::from_lookup(lookup(&[("TG_TOKEN", "t"), ("WEBSITE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DEEPSEEK_API_KEY is not set; export it or add it to a .env file")]
    MissingApiKey,
    #[error("source directory does not exist or is not a directory: {0}")]
    SourceDirNotFound(PathBuf),
}

/// Read-only settings for both tools. Built once at startup and passed by
/// reference; there is no global configuration state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub max_response_tokens: u32,
    pub temperature: f32,
    /// Cap on extracted text per PDF before it goes into a prompt.
    pub max_pdf_chars: usize,
    /// Token budget for one batch of documents (one LLM call per batch).
    pub max_batch_tokens: usize,
}

impl Settings {
    /// Load settings from the process environment. A `.env` file in the
    /// working directory is honored if present. Fails fast when the API key
    /// is missing so neither tool gets as far as a network call without one.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. `load()` wires this
    /// to the real environment; tests supply a closure over a map.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = match get("DEEPSEEK_API_KEY") {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(ConfigError::MissingApiKey),
        };

        Ok(Self {
            api_key,
            base_url: get("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
            model: get("DEEPSEEK_MODEL").unwrap_or_else(|| "deepseek-chat".to_string()),
            source_dir: get("CONSULTOR_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("comunicados")),
            output_dir: get("CONSULTOR_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("resultados")),
            max_response_tokens: 4000,
            temperature: 0.1,
            max_pdf_chars: 5000,
            max_batch_tokens: 26000,
        })
    }

    /// Check filesystem preconditions the extractor relies on.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if !self.source_dir.is_dir() {
            return Err(ConfigError::SourceDirNotFound(self.source_dir));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let env = vars(&[]);
        let result = Settings::from_vars(|k| env.get(k).cloned());
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn blank_api_key_fails_fast() {
        let env = vars(&[("DEEPSEEK_API_KEY", "   ")]);
        let result = Settings::from_vars(|k| env.get(k).cloned());
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn defaults_are_populated() {
        let env = vars(&[("DEEPSEEK_API_KEY", "sk-test")]);
        let settings = Settings::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(settings.base_url, "https://api.deepseek.com");
        assert_eq!(settings.model, "deepseek-chat");
        assert_eq!(settings.max_response_tokens, 4000);
        assert_eq!(settings.max_pdf_chars, 5000);
        assert_eq!(settings.max_batch_tokens, 26000);
    }

    #[test]
    fn env_overrides_are_respected() {
        let env = vars(&[
            ("DEEPSEEK_API_KEY", "sk-test"),
            ("DEEPSEEK_MODEL", "deepseek-reasoner"),
            ("CONSULTOR_SOURCE_DIR", "/tmp/comunicados"),
            ("CONSULTOR_OUTPUT_DIR", "/tmp/salida"),
        ]);
        let settings = Settings::from_vars(|k| env.get(k).cloned()).unwrap();

        assert_eq!(settings.model, "deepseek-reasoner");
        assert_eq!(settings.source_dir, PathBuf::from("/tmp/comunicados"));
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/salida"));
    }

    #[test]
    fn validated_rejects_missing_source_dir() {
        let env = vars(&[
            ("DEEPSEEK_API_KEY", "sk-test"),
            ("CONSULTOR_SOURCE_DIR", "/nonexistent/path/for/test"),
        ]);
        let settings = Settings::from_vars(|k| env.get(k).cloned()).unwrap();
        assert!(matches!(
            settings.validated(),
            Err(ConfigError::SourceDirNotFound(_))
        ));
    }
}

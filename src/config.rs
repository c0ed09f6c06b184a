//! Gemini 연결 설정
//!
//! `.env.local` / 환경 변수에서 모델, 엔드포인트, 생성 파라미터를 읽습니다.

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_PROBE_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_PROBE_MAX_TOKENS: u32 = 5;

/// 생성 클라이언트 설정
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub base_url: String,
    /// 콘텐츠 생성용 모델
    pub model: String,
    /// 연결 테스트용 저비용 모델
    pub probe_model: String,
    /// 창작용 온도 (0, 1]
    pub temperature: f32,
    pub probe_max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            probe_model: DEFAULT_PROBE_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            probe_max_output_tokens: DEFAULT_PROBE_MAX_TOKENS,
        }
    }
}

impl GeminiConfig {
    /// 환경 변수에서 설정 로드 (없으면 기본값)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 키 조회 함수를 받아 설정 구성 (테스트에서 환경 변수 없이 사용)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let temperature = match get("GEMINI_TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .map_err(|_| AppError::Config(format!("GEMINI_TEMPERATURE is not a number: {raw}")))?,
            None => defaults.temperature,
        };

        let probe_max_output_tokens = match get("GEMINI_PROBE_MAX_TOKENS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                AppError::Config(format!("GEMINI_PROBE_MAX_TOKENS is not a positive integer: {raw}"))
            })?,
            None => defaults.probe_max_output_tokens,
        };

        let config = Self {
            base_url: get("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            probe_model: get("GEMINI_PROBE_MODEL").unwrap_or(defaults.probe_model),
            temperature,
            probe_max_output_tokens,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.temperature > 0.0 && self.temperature <= 1.0) {
            return Err(AppError::Config(format!(
                "temperature must be in (0, 1], got {}",
                self.temperature
            )));
        }
        if self.probe_max_output_tokens == 0 {
            return Err(AppError::Config("probe max output tokens must be > 0".to_string()));
        }
        if self.model.is_empty() || self.probe_model.is_empty() {
            return Err(AppError::Config("model identifiers must not be empty".to_string()));
        }
        Ok(())
    }

    /// `{base_url}/{model}:generateContent`
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.base_url, model)
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = GeminiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GeminiConfig::default());
        assert_eq!(
            config.endpoint(&config.model),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }

    #[test]
    fn overrides_are_trimmed_and_applied() {
        let config = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_BASE_URL", "http://127.0.0.1:9999/models/"),
            ("GEMINI_MODEL", " custom-model "),
            ("GEMINI_TEMPERATURE", "0.5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9999/models");
        assert_eq!(config.model, "custom-model");
        assert_eq!(config.temperature, 0.5);
    }

    #[test]
    fn temperature_outside_unit_interval_is_rejected() {
        for raw in ["0", "1.5", "-0.2", "warm"] {
            let result = GeminiConfig::from_lookup(lookup(&[("GEMINI_TEMPERATURE", raw)]));
            assert!(matches!(result, Err(AppError::Config(_))), "accepted {raw}");
        }
        assert!(GeminiConfig::from_lookup(lookup(&[("GEMINI_TEMPERATURE", "1")])).is_ok());
    }
}

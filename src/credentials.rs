//! Credential Provider
//!
//! 생성 클라이언트가 사용할 API 키를 공급하는 주입 가능한 기능.
//! - 클라이언트는 `active_credential()`만 호출합니다.
//! - `is_active()` / `request_selection()`은 UI 셸이 `Credential` 에러에 반응할 때 사용합니다.

use std::sync::Arc;

use async_trait::async_trait;
use keyring::{Entry, Error as KeyringError};

use crate::error::AppError;

/// 환경 변수 우선순위: GEMINI_API_KEY > API_KEY
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

const KEYCHAIN_SERVICE: &str = "com.brandstudio.app";
const KEYCHAIN_API_KEY: &str = "gemini:api_key";

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// 현재 활성화된 API 키 (호출 시점마다 다시 조회)
    async fn active_credential(&self) -> Option<String>;

    /// 활성 키가 선택되어 있는지
    async fn is_active(&self) -> bool {
        self.active_credential().await.is_some()
    }

    /// 사용자에게 키 선택을 요청
    ///
    /// 상호작용이 끝나면 성공으로 간주합니다.
    async fn request_selection(&self) -> Result<(), AppError>;
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 환경 변수 기반 (`.env.local` 로드 후)
#[derive(Debug, Default, Clone)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub fn lookup() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().and_then(non_blank))
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn active_credential(&self) -> Option<String> {
        Self::lookup()
    }

    async fn request_selection(&self) -> Result<(), AppError> {
        Err(AppError::InvalidOperation(format!(
            "API key is read from the environment. Set {} in .env.local",
            API_KEY_ENV_VARS[0]
        )))
    }
}

/// 고정 값 (임베딩, 테스트용)
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    key: Option<String>,
}

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: non_blank(key.into()),
        }
    }

    pub fn none() -> Self {
        Self { key: None }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn active_credential(&self) -> Option<String> {
        self.key.clone()
    }

    async fn request_selection(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// 선택 요청을 UI로 전달하는 콜백
pub type SelectionHook = Arc<dyn Fn() -> Result<(), AppError> + Send + Sync>;

/// OS 키체인 기반 (없으면 환경 변수로 대체)
pub struct KeyringCredentials {
    service: String,
    on_selection: Option<SelectionHook>,
}

impl KeyringCredentials {
    pub fn new() -> Self {
        Self {
            service: KEYCHAIN_SERVICE.to_string(),
            on_selection: None,
        }
    }

    /// 키 선택 요청 시 호출할 훅 (데스크톱 셸이 프론트엔드에 이벤트를 보냄)
    pub fn with_selection_hook(mut self, hook: SelectionHook) -> Self {
        self.on_selection = Some(hook);
        self
    }

    fn entry(&self) -> Result<Entry, AppError> {
        Entry::new(&self.service, KEYCHAIN_API_KEY).map_err(map_keyring_error)
    }

    /// 키체인에 API 키 저장
    pub fn store(&self, api_key: &str) -> Result<(), AppError> {
        let key = non_blank(api_key.to_string())
            .ok_or_else(|| AppError::InvalidInput("API key must not be empty".to_string()))?;
        self.entry()?.set_password(&key).map_err(map_keyring_error)?;
        tracing::info!("API key stored in keychain");
        Ok(())
    }

    /// 키체인에서 API 키 삭제 (없으면 무시)
    pub fn clear(&self) -> Result<(), AppError> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(KeyringError::NoEntry) => {
                tracing::info!("API key cleared from keychain");
                Ok(())
            }
            Err(err) => Err(map_keyring_error(err)),
        }
    }

    fn read_keychain(&self) -> Option<String> {
        let entry = self.entry().ok()?;
        match entry.get_password() {
            Ok(value) => non_blank(value),
            Err(KeyringError::NoEntry) => None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read API key from keychain");
                None
            }
        }
    }
}

impl Default for KeyringCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for KeyringCredentials {
    async fn active_credential(&self) -> Option<String> {
        self.read_keychain().or_else(EnvCredentials::lookup)
    }

    async fn request_selection(&self) -> Result<(), AppError> {
        match &self.on_selection {
            Some(hook) => hook(),
            None => Err(AppError::InvalidOperation(
                "No credential selection UI is attached".to_string(),
            )),
        }
    }
}

fn map_keyring_error(err: KeyringError) -> AppError {
    AppError::CredentialStore(err.to_string())
}

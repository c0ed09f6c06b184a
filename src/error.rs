//! Brand Studio Error Types
//!
//! 생성 파이프라인 에러와 애플리케이션 전역 에러 타입 정의

use serde::Serialize;
use thiserror::Error;

/// 외부 실패 메시지의 분류 결과
///
/// 상위 서비스가 구조화된 에러 코드를 주지 않으므로 메시지 텍스트로만 판별합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 인증/인가 실패 (키 재선택 필요)
    Credential,
    /// 그 외 모든 실패 (네트워크, 쿼터, 서버 오류)
    Failure,
}

/// 생성 요청 파이프라인 에러
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// 디스패치 전 전제 조건 위반 (빈 지식 저장소, 알 수 없는 enum 라벨 등)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Credential error: {0}")]
    Credential(String),

    /// 응답이 비어 있거나 선언된 스키마와 맞지 않음
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Generation failed: {0}")]
    Failure(String),
}

impl GenerationError {
    /// 전송/서비스 실패 메시지를 분류하여 에러로 변환
    pub fn from_service_message(message: impl Into<String>) -> Self {
        let message = message.into();
        match crate::gemini::classify_error(&message) {
            ErrorKind::Credential => GenerationError::Credential(message),
            ErrorKind::Failure => GenerationError::Failure(message),
        }
    }

    /// UI 반응(키 재선택 vs 일반 재시도 안내)을 결정하는 분류
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Credential(_) => ErrorKind::Credential,
            _ => ErrorKind::Failure,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "VALIDATION_ERROR",
            GenerationError::Credential(_) => "API_KEY_ERROR",
            GenerationError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            GenerationError::Failure(_) => "GENERATION_FAILED",
        }
    }
}

/// Brand Studio 애플리케이션 에러
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Knowledge item not found: {0}")]
    KnowledgeNotFound(String),

    #[error("Saved post not found: {0}")]
    SavedPostNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to extract text: {0}")]
    Extraction(String),

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("A generation request is already in flight")]
    GenerationInFlight,

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Tauri 명령 응답용 직렬화 가능한 에러
#[derive(Debug, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Database(_) => "DB_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Generation(e) => e.code(),
            AppError::KnowledgeNotFound(_) | AppError::SavedPostNotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Extraction(_) => "EXTRACT_ERROR",
            AppError::CredentialStore(_) => "CREDENTIAL_STORE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::GenerationInFlight => "GENERATION_IN_FLIGHT",
            AppError::InvalidOperation(_) => "INVALID_OPERATION",
        };

        CommandError {
            code: code.to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

impl From<GenerationError> for CommandError {
    fn from(error: GenerationError) -> Self {
        CommandError::from(AppError::from(error))
    }
}

/// Tauri 명령 결과 타입
pub type CommandResult<T> = Result<T, CommandError>;

/// 라이브러리 내부 결과 타입
pub type AppResult<T> = Result<T, AppError>;

//! 실패 메시지 분류
//!
//! 상위 서비스는 인증 실패를 안정적인 에러 코드로 알려주지 않으므로 메시지 텍스트를 봅니다.
//! 키워드 목록은 상위 에러 체계를 확인하기 전까지 늘리지 않습니다.

use crate::error::ErrorKind;

/// 인증/인가 실패를 나타내는 키워드
pub const CREDENTIAL_ERROR_MARKERS: [&str; 3] = ["401", "API key", "Requested entity was not found."];

/// 실패 메시지를 `Credential` / `Failure`로 분류
pub fn classify_error(message: &str) -> ErrorKind {
    if CREDENTIAL_ERROR_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
    {
        ErrorKind::Credential
    } else {
        ErrorKind::Failure
    }
}

//! State Repository
//!
//! 지식 / 오늘의 맥락 / 보관함을 키 단위 JSON 레코드로 저장합니다.
//! 레코드가 없거나 깨져 있으면 "없음"으로 취급하고, 호출자가 빈 기본값으로 대체합니다.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppResult;

pub const KNOWLEDGE_KEY: &str = "insta_knowledge";
pub const CONTEXT_KEY: &str = "insta_context";
pub const HISTORY_KEY: &str = "insta_history";

/// 저장소가 관리하는 모든 키
pub const STATE_KEYS: [&str; 3] = [KNOWLEDGE_KEY, CONTEXT_KEY, HISTORY_KEY];

/// 키-값 저장소 (값은 JSON 문자열)
pub trait StateRepository: Send {
    fn load_raw(&self, key: &str) -> AppResult<Option<String>>;

    fn save_raw(&self, key: &str, value: &str) -> AppResult<()>;

    /// 모든 레코드 삭제
    fn clear(&self) -> AppResult<()>;
}

/// 키에 저장된 값을 읽음 (없거나 해석 불가 → None)
pub fn load<T, R>(repo: &R, key: &str) -> AppResult<Option<T>>
where
    T: DeserializeOwned,
    R: StateRepository + ?Sized,
{
    let Some(raw) = repo.load_raw(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring malformed persisted record");
            Ok(None)
        }
    }
}

pub fn save<T, R>(repo: &R, key: &str, value: &T) -> AppResult<()>
where
    T: Serialize + ?Sized,
    R: StateRepository + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    repo.save_raw(key, &raw)
}

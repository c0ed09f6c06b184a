//! Tauri Commands Module
//!
//! 프론트엔드에서 호출 가능한 Tauri 명령어 정의

pub mod context;
pub mod credentials;
pub mod generation;
pub mod history;
pub mod knowledge;
pub mod storage;

use std::sync::MutexGuard;

use crate::error::{CommandError, CommandResult};
use crate::studio::Studio;
use crate::AppState;

/// 상태 잠금 (명령 하나 동안만 보유, await 사이에는 잡지 않음)
pub(crate) fn studio(state: &AppState) -> CommandResult<MutexGuard<'_, Studio>> {
    state.studio.lock().map_err(|_| CommandError {
        code: "STATE_ERROR".to_string(),
        message: "Studio state lock poisoned".to_string(),
        details: None,
    })
}

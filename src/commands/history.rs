//! History Commands
//!
//! 성공 보관함 관련 Tauri 명령어

use tauri::State;

use super::studio;
use crate::error::CommandResult;
use crate::models::{GeneratedPost, SavedPost};
use crate::AppState;

/// 보관함 목록 (최신 항목이 앞)
#[tauri::command]
pub fn list_history(state: State<AppState>) -> CommandResult<Vec<SavedPost>> {
    Ok(studio(&state)?.history().to_vec())
}

/// 현재 결과를 보관함에 저장
#[tauri::command]
pub fn archive_current_result(state: State<AppState>) -> CommandResult<SavedPost> {
    Ok(studio(&state)?.archive_current()?)
}

#[tauri::command]
pub fn remove_saved_post(id: String, state: State<AppState>) -> CommandResult<()> {
    Ok(studio(&state)?.remove_saved_post(&id)?)
}

/// 불러오기 및 재편집 (전략 / 무드도 함께 복원)
#[tauri::command]
pub fn remix_saved_post(id: String, state: State<AppState>) -> CommandResult<GeneratedPost> {
    Ok(studio(&state)?.remix(&id)?.clone())
}

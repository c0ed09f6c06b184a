//! Credential Commands
//!
//! API 키 상태 조회 / 저장 / 삭제 / 선택 요청

use serde::Serialize;
use tauri::State;

use crate::credentials::CredentialProvider;
use crate::error::CommandResult;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub active: bool,
}

#[tauri::command]
pub async fn credential_status(state: State<'_, AppState>) -> CommandResult<CredentialStatus> {
    Ok(CredentialStatus {
        active: state.credentials.is_active().await,
    })
}

/// 키체인에 저장 (프론트엔드에는 다시 노출하지 않음)
#[tauri::command]
pub fn save_credential(api_key: String, state: State<AppState>) -> CommandResult<()> {
    Ok(state.credentials.store(&api_key)?)
}

#[tauri::command]
pub fn clear_credential(state: State<AppState>) -> CommandResult<()> {
    Ok(state.credentials.clear()?)
}

/// 키 선택 UI 열기 (완료되면 성공으로 간주)
#[tauri::command]
pub async fn request_credential_selection(state: State<'_, AppState>) -> CommandResult<()> {
    Ok(state.credentials.request_selection().await?)
}

//! Generation Commands
//!
//! 게시물 생성, 생성 옵션, 연결 테스트

use serde::Deserialize;
use tauri::State;

use super::studio;
use crate::credentials::CredentialProvider;
use crate::error::{AppError, CommandResult, ErrorKind};
use crate::models::{GeneratedPost, GenerationOptions};
use crate::studio::run_generation;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGenerationOptionsArgs {
    pub strategy: String,
    pub mood: String,
    pub format: String,
}

#[tauri::command]
pub fn get_generation_options(state: State<AppState>) -> CommandResult<GenerationOptions> {
    Ok(studio(&state)?.options())
}

/// 정의되지 않은 라벨은 VALIDATION_ERROR
#[tauri::command]
pub fn set_generation_options(
    args: SetGenerationOptionsArgs,
    state: State<AppState>,
) -> CommandResult<GenerationOptions> {
    let options = GenerationOptions {
        strategy: args.strategy.parse()?,
        mood: args.mood.parse()?,
        format: args.format.parse()?,
    };
    let mut studio = studio(&state)?;
    studio.set_options(options);
    Ok(studio.options())
}

/// 게시물 생성
///
/// - `regenerate = true` 이면 새 결과가 올 때까지 이전 결과를 유지합니다.
/// - 인증 실패(API_KEY_ERROR)면 키 선택 UI를 다시 엽니다.
#[tauri::command]
pub async fn generate_post(
    regenerate: Option<bool>,
    state: State<'_, AppState>,
) -> CommandResult<GeneratedPost> {
    let result = run_generation(
        &state.studio,
        &state.slot,
        &state.client,
        regenerate.unwrap_or(false),
    )
    .await;

    if let Err(AppError::Generation(err)) = &result {
        if err.kind() == ErrorKind::Credential {
            if let Err(hook_err) = state.credentials.request_selection().await {
                tracing::warn!(error = %hook_err, "failed to request credential selection");
            }
        }
    }

    Ok(result?)
}

#[tauri::command]
pub fn get_current_result(state: State<AppState>) -> CommandResult<Option<GeneratedPost>> {
    Ok(studio(&state)?.current_result().cloned())
}

/// 연결 테스트 (실패는 모두 false)
#[tauri::command]
pub async fn test_connection(state: State<'_, AppState>) -> CommandResult<bool> {
    Ok(state.client.probe().await)
}

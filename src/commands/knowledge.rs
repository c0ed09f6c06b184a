//! Knowledge Commands
//!
//! 지식 저장소 관련 Tauri 명령어

use serde::Deserialize;
use tauri::State;

use super::studio;
use crate::error::CommandResult;
use crate::models::KnowledgeItem;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTextKnowledgeArgs {
    pub title: String,
    pub content: String,
}

/// 지식 목록 (최신 항목이 앞)
#[tauri::command]
pub fn list_knowledge(state: State<AppState>) -> CommandResult<Vec<KnowledgeItem>> {
    Ok(studio(&state)?.knowledge().to_vec())
}

/// 텍스트 직접 입력
#[tauri::command]
pub fn add_text_knowledge(
    args: AddTextKnowledgeArgs,
    state: State<AppState>,
) -> CommandResult<KnowledgeItem> {
    Ok(studio(&state)?.add_text_knowledge(&args.title, &args.content)?)
}

/// 파일에서 가져오기 (txt, md, csv, pdf, docx, pptx, xlsx, xls)
#[tauri::command]
pub async fn import_knowledge_file(
    path: String,
    state: State<'_, AppState>,
) -> CommandResult<KnowledgeItem> {
    // 추출은 블로킹 I/O 이므로 잠금 밖에서 수행
    let item = tokio::task::spawn_blocking(move || crate::knowledge::import_file(&path))
        .await
        .map_err(|e| crate::error::AppError::InvalidOperation(e.to_string()))??;
    Ok(studio(&state)?.add_knowledge(item)?)
}

#[tauri::command]
pub fn remove_knowledge(id: String, state: State<AppState>) -> CommandResult<()> {
    Ok(studio(&state)?.remove_knowledge(&id)?)
}

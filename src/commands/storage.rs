//! Storage Commands
//!
//! 데이터 내보내기 (SQLite DB 파일) / 전체 초기화

use tauri::State;

use super::studio;
use crate::db::Database;
use crate::error::CommandResult;
use crate::utils::validate_path;
use crate::AppState;

/// 현재 상태 DB를 지정한 경로로 복사
#[tauri::command]
pub fn export_data(path: String, state: State<AppState>) -> CommandResult<()> {
    let out_path = validate_path(&path)?;
    let db = Database::new(&state.db_path)?;
    db.export_to_file(&out_path)?;
    Ok(())
}

/// 모든 데이터를 삭제하고 초기화
#[tauri::command]
pub fn reset_all_data(state: State<AppState>) -> CommandResult<()> {
    Ok(studio(&state)?.reset_all()?)
}

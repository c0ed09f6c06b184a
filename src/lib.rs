//! Brand Studio - 브랜드 인스타그램 콘텐츠 생성기 백엔드 라이브러리
//!
//! 지식 저장소와 오늘의 맥락을 바탕으로 Gemini에 구조화된 게시물 생성을 요청합니다.
//! 데스크톱 셸(Tauri)은 `desktop` feature 에서만 빌드됩니다.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod gemini;
pub mod knowledge;
pub mod models;
pub mod prompt;
pub mod repository;
pub mod studio;
pub mod utils;

use std::path::{Path, PathBuf};

pub use error::{AppError, AppResult, CommandError, CommandResult, ErrorKind, GenerationError};
pub use gemini::{classify_error, GenerationClient};
pub use models::{GeneratedPost, GenerationRequest};
pub use prompt::build_prompt;

fn is_valid_env_key(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    key.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// `KEY=VALUE` 라인만 읽는 관대한 로더 (주석, 코드펜스, 설명 라인 무시)
fn try_load_env_lenient(path: &Path) -> std::io::Result<usize> {
    let text = std::fs::read_to_string(path)?;
    let mut loaded = 0usize;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("```") {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line).trim();
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim();
        if !is_valid_env_key(key) {
            continue;
        }
        // 이미 비어있지 않은 값이 있으면 덮어쓰지 않음
        if let Ok(existing) = std::env::var(key) {
            if !existing.trim().is_empty() {
                continue;
            }
        }

        let mut value = v.trim().to_string();
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = value[1..value.len() - 1].to_string();
        }

        std::env::set_var(key, value);
        loaded += 1;
    }

    Ok(loaded)
}

fn find_upwards(start: PathBuf, filename: &str, max_hops: usize) -> Option<PathBuf> {
    let mut cur = start;
    for _ in 0..=max_hops {
        let candidate = cur.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        if !cur.pop() {
            break;
        }
    }
    None
}

/// `.env.local` → `.env` 순서로 환경 변수 로드 (파일이 없으면 무시)
///
/// CWD가 프로젝트 루트가 아닐 수 있으므로 CWD와 실행 파일 위치에서 위로 올라가며 찾습니다.
/// strict 파서가 실패하면 lenient 로더로 보강합니다.
pub fn load_env() {
    if dotenvy::from_filename(".env.local").is_ok() {
        let _ = dotenvy::dotenv();
        return;
    }

    let mut candidates: Vec<PathBuf> = vec![];
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_upwards(cwd, ".env.local", 6) {
            candidates.push(p);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_upwards(dir.to_path_buf(), ".env.local", 8) {
                candidates.push(p);
            }
        }
    }

    for p in candidates {
        if dotenvy::from_path(&p).is_ok() {
            break;
        }
        match try_load_env_lenient(&p) {
            Ok(loaded) if loaded > 0 => {
                tracing::debug!(path = %p.display(), loaded, "env loaded leniently");
                break;
            }
            _ => {}
        }
    }

    let _ = dotenvy::dotenv();
}

#[cfg(feature = "desktop")]
mod desktop {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use tauri::{Emitter, Manager};
    use tracing_subscriber::EnvFilter;

    use crate::config::GeminiConfig;
    use crate::credentials::{CredentialProvider, KeyringCredentials};
    use crate::db::Database;
    use crate::error::AppError;
    use crate::gemini::GenerationClient;
    use crate::studio::{GenerationSlot, Studio};

    pub const DB_FILE_NAME: &str = "brand_studio.db";
    pub const CREDENTIAL_SELECTION_EVENT: &str = "credential://selection-requested";

    /// Tauri 앱 상태
    pub struct AppState {
        pub studio: Mutex<Studio>,
        pub slot: GenerationSlot,
        pub client: GenerationClient,
        pub credentials: Arc<KeyringCredentials>,
        pub db_path: PathBuf,
    }

    fn init_tracing() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("brand_studio_lib=info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Tauri 앱 실행
    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        crate::load_env();
        init_tracing();

        let result = tauri::Builder::default()
            .plugin(tauri_plugin_dialog::init())
            .plugin(tauri_plugin_shell::init())
            .setup(|app| {
                let db_path = app.path().app_data_dir()?.join(DB_FILE_NAME);
                let db = Database::new(&db_path)?;
                let studio = Studio::load(Box::new(db))?;

                // 키 선택 요청은 프론트엔드 이벤트로 전달
                let handle = app.handle().clone();
                let credentials = Arc::new(KeyringCredentials::new().with_selection_hook(Arc::new(
                    move || {
                        handle
                            .emit(CREDENTIAL_SELECTION_EVENT, ())
                            .map_err(|e| AppError::InvalidOperation(e.to_string()))
                    },
                )));

                let config = GeminiConfig::from_env()?;
                tracing::info!(model = %config.model, db = %db_path.display(), "brand studio starting");
                let provider: Arc<dyn CredentialProvider> = credentials.clone();
                let client = GenerationClient::new(config, provider)?;

                app.manage(AppState {
                    studio: Mutex::new(studio),
                    slot: GenerationSlot::default(),
                    client,
                    credentials,
                    db_path,
                });
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                crate::commands::knowledge::list_knowledge,
                crate::commands::knowledge::add_text_knowledge,
                crate::commands::knowledge::import_knowledge_file,
                crate::commands::knowledge::remove_knowledge,
                crate::commands::context::get_daily_context,
                crate::commands::context::select_weather,
                crate::commands::context::select_daily_mood,
                crate::commands::context::update_daily_context_text,
                crate::commands::context::reset_daily_context,
                crate::commands::generation::get_generation_options,
                crate::commands::generation::set_generation_options,
                crate::commands::generation::generate_post,
                crate::commands::generation::get_current_result,
                crate::commands::generation::test_connection,
                crate::commands::history::list_history,
                crate::commands::history::archive_current_result,
                crate::commands::history::remove_saved_post,
                crate::commands::history::remix_saved_post,
                crate::commands::credentials::credential_status,
                crate::commands::credentials::save_credential,
                crate::commands::credentials::clear_credential,
                crate::commands::credentials::request_credential_selection,
                crate::commands::storage::export_data,
                crate::commands::storage::reset_all_data,
            ])
            .run(tauri::generate_context!());

        if let Err(err) = result {
            tracing::error!(error = %err, "error while running tauri application");
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "desktop")]
pub use desktop::{run, AppState, CREDENTIAL_SELECTION_EVENT, DB_FILE_NAME};

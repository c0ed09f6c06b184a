//! Database Module
//!
//! SQLite 기반 앱 상태 저장소

mod memory;
mod schema;

use std::path::Path;

use rusqlite::backup::Backup;
use rusqlite::{Connection, OptionalExtension};

use crate::error::AppResult;
use crate::repository::StateRepository;

pub use memory::MemoryStore;

/// 데이터베이스 래퍼
pub struct Database {
    conn: Connection,
}

impl Database {
    /// 새 데이터베이스 연결 생성 (스키마 초기화 포함)
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.initialize()?;
        Ok(db)
    }

    /// 메모리 DB (테스트용)
    pub fn in_memory() -> AppResult<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.initialize()?;
        Ok(db)
    }

    /// 데이터베이스 스키마 초기화
    pub fn initialize(&self) -> AppResult<()> {
        self.conn.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(())
    }

    /// 현재 DB를 파일로 내보내기 (SQLite DB 파일)
    pub fn export_to_file(&self, out_path: &Path) -> AppResult<()> {
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut out_conn = Connection::open(out_path)?;
        out_conn.execute_batch(schema::CREATE_SCHEMA)?;

        let backup = Backup::new(&self.conn, &mut out_conn)?;
        backup.run_to_completion(5, std::time::Duration::from_millis(10), None)?;
        tracing::info!(path = %out_path.display(), "state exported");
        Ok(())
    }
}

impl StateRepository for Database {
    fn load_raw(&self, key: &str) -> AppResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value_json FROM app_state WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&self, key: &str, value: &str) -> AppResult<()> {
        self.conn.execute(
            "INSERT INTO app_state (key, value_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            (key, value, chrono::Utc::now().timestamp_millis()),
        )?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.conn.execute("DELETE FROM app_state", [])?;
        Ok(())
    }
}

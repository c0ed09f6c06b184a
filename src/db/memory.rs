use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::AppResult;
use crate::repository::StateRepository;

/// 메모리 저장소 (테스트, 임베딩용)
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // 맵 조작 중에는 패닉이 없으므로 poison 상태도 그대로 사용
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateRepository for MemoryStore {
    fn load_raw(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.records().get(key).cloned())
    }

    fn save_raw(&self, key: &str, value: &str) -> AppResult<()> {
        self.records().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.records().clear();
        Ok(())
    }
}

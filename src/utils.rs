use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// 시스템 중요 디렉토리 접근을 차단하는 Blocklist 검증 함수
/// - canonicalize()로 경로 정규화 후, 차단 목록과 비교합니다.
pub fn validate_path(path_str: &str) -> AppResult<PathBuf> {
    let path = Path::new(path_str);

    // 파일이 존재하면 canonicalize, 없으면 부모 디렉토리 기준
    let canonical_path = if path.exists() {
        path.canonicalize()
            .map_err(|e| AppError::InvalidInput(format!("Invalid path: {}", e)))?
    } else if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(AppError::InvalidInput("Parent directory does not exist".to_string()));
        }
        let canonical_parent = parent
            .canonicalize()
            .map_err(|e| AppError::InvalidInput(format!("Invalid parent path: {}", e)))?;
        canonical_parent.join(path.file_name().unwrap_or_default())
    } else {
        PathBuf::from(path_str)
    };

    if is_blocked_path(&canonical_path) {
        return Err(AppError::InvalidOperation(
            "Access to system directory is blocked.".to_string(),
        ));
    }

    Ok(canonical_path)
}

fn is_blocked_path(path: &Path) -> bool {
    #[cfg(target_os = "windows")]
    {
        let lower = path.to_string_lossy().to_lowercase();
        if lower.contains(r"c:\windows") || lower.contains(r"c:\program files") {
            return true;
        }
    }

    // /Users (macOS), /home (Linux)은 허용
    #[cfg(not(target_os = "windows"))]
    {
        const BLOCKED: [&str; 9] = [
            "/etc", "/var", "/proc", "/sys", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/root",
        ];
        if BLOCKED.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn system_directories_are_refused() {
        let err = validate_path("/etc/hosts").unwrap_err();
        assert!(matches!(err, AppError::InvalidOperation(_)));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn superuser_home_is_refused() {
        assert!(is_blocked_path(Path::new("/root/.ssh/id_rsa")));
        assert!(is_blocked_path(Path::new("/root")));
        assert!(!is_blocked_path(Path::new("/rootless/notes.txt")));
    }

    #[test]
    fn user_files_are_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let resolved = validate_path(file.to_str().unwrap()).unwrap();
        assert_eq!(resolved, file.canonicalize().unwrap());
    }

    #[test]
    fn missing_parent_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("notes.txt");
        assert!(validate_path(path.to_str().unwrap()).is_err());
    }
}

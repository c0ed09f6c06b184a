//! Knowledge Import
//!
//! 파일에서 텍스트를 추출해 지식 항목으로 변환합니다.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::models::{KnowledgeItem, KnowledgeKind};
use crate::utils::validate_path;

/// 가져오기 최대 파일 크기 (20MB)
pub const MAX_IMPORT_SIZE: u64 = 20 * 1024 * 1024;

/// 지원 확장자
pub const SUPPORTED_EXTENSIONS: [&str; 8] = ["txt", "md", "csv", "pdf", "docx", "pptx", "xlsx", "xls"];

/// 파일 하나를 지식 항목으로 가져오기
///
/// 제목은 파일 이름의 첫 `.` 앞부분입니다 (`brand.guide.pdf` → `brand`).
pub fn import_file(path_str: &str) -> AppResult<KnowledgeItem> {
    let path = validate_path(path_str)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::InvalidInput(format!("Unsupported file type: {}", extension)));
    }

    validate_file_size(&path, MAX_IMPORT_SIZE)?;

    let content = extract_file_text(&path, &extension)?;
    if content.trim().is_empty() {
        return Err(AppError::Extraction(format!(
            "No text content found in {}",
            path.display()
        )));
    }

    let title = title_from_path(&path);
    tracing::info!(title = %title, extension = %extension, chars = content.chars().count(), "knowledge file imported");
    KnowledgeItem::new(KnowledgeKind::File, title, content)
}

/// 파일 이름의 첫 `.` 앞부분
pub fn title_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

fn validate_file_size(path: &Path, max_size: u64) -> AppResult<u64> {
    let size = fs::metadata(path)?.len();
    if size > max_size {
        return Err(AppError::InvalidInput(format!(
            "파일 크기가 너무 큽니다: {}MB (최대 {}MB)",
            size / (1024 * 1024),
            max_size / (1024 * 1024)
        )));
    }
    Ok(size)
}

fn extract_file_text(path: &Path, extension: &str) -> AppResult<String> {
    match extension {
        "md" | "txt" | "csv" => Ok(fs::read_to_string(path)?),
        "pdf" => pdf_extract::extract_text(path).map_err(|e| AppError::Extraction(e.to_string())),
        "docx" => extract_docx_text(path),
        "pptx" => extract_pptx_text(path),
        "xlsx" | "xls" => extract_sheet_text(path),
        _ => Err(AppError::InvalidInput(format!("Unsupported file type: {}", extension))),
    }
}

fn extract_docx_text(path: &Path) -> AppResult<String> {
    let buf = fs::read(path)?;
    let docx = docx_rs::read_docx(&buf).map_err(|e| AppError::Extraction(e.to_string()))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            for child in p.children {
                if let docx_rs::ParagraphChild::Run(r) = child {
                    for child in r.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

fn extract_pptx_text(path: &Path) -> AppResult<String> {
    use quick_xml::events::Event;
    use quick_xml::reader::Reader;

    let file = fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| AppError::Extraction(e.to_string()))?;

    let mut all_text = String::new();

    // ppt/slides/slideN.xml 을 순서대로
    let mut slide_index = 1;
    loop {
        let slide_filename = format!("ppt/slides/slide{}.xml", slide_index);
        let mut slide_file = match archive.by_name(&slide_filename) {
            Ok(f) => f,
            Err(_) => break,
        };

        let mut content = String::new();
        slide_file.read_to_string(&mut content)?;

        let mut reader = Reader::from_str(&content);
        let mut buf = Vec::new();
        let mut slide_text = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Text(e)) => {
                    slide_text.push_str(&e.unescape().unwrap_or_default());
                    slide_text.push(' ');
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(AppError::Extraction(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if !slide_text.trim().is_empty() {
            all_text.push_str(&format!("[Slide {}]\n{}\n\n", slide_index, slide_text.trim()));
        }

        slide_index += 1;
    }

    Ok(all_text)
}

/// 시트별로 행을 탭 구분 텍스트로
fn extract_sheet_text(path: &Path) -> AppResult<String> {
    use calamine::{open_workbook_auto, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| AppError::Extraction(e.to_string()))?;

    let mut all_text = String::new();
    for name in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&name) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(sheet = %name, error = %e, "skipping unreadable sheet");
                continue;
            }
        };

        let rows: Vec<String> = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_string())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .filter(|line| !line.trim().is_empty())
            .collect();

        if !rows.is_empty() {
            all_text.push_str(&format!("[Sheet: {}]\n{}\n\n", name, rows.join("\n")));
        }
    }

    Ok(all_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn title_is_the_name_before_the_first_dot() {
        assert_eq!(title_from_path(Path::new("/tmp/brand.guide.pdf")), "brand");
        assert_eq!(title_from_path(Path::new("notes.md")), "notes");
        assert_eq!(title_from_path(Path::new("/tmp/.hidden")), ".hidden");
    }

    #[test]
    fn text_files_become_file_knowledge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.v2.csv");
        fs::write(&path, "item,price\nlatte,5000\n").unwrap();

        let item = import_file(path.to_str().unwrap()).unwrap();
        assert_eq!(item.kind, KnowledgeKind::File);
        assert_eq!(item.title, "menu");
        assert!(item.content.contains("latte,5000"));
    }

    #[test]
    fn pptx_slides_are_extracted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        {
            let file = fs::File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default();
            for (i, text) in ["Hello", "World"].iter().enumerate() {
                zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                    .unwrap();
                write!(zip, "<p:sld><a:t>{}</a:t></p:sld>", text).unwrap();
            }
            zip.finish().unwrap();
        }

        let item = import_file(path.to_str().unwrap()).unwrap();
        assert_eq!(item.content, "[Slide 1]\nHello\n\n[Slide 2]\nWorld\n\n");
    }

    #[test]
    fn unsupported_and_empty_files_are_refused() {
        let dir = tempfile::tempdir().unwrap();

        let image = dir.path().join("logo.png");
        fs::write(&image, [0u8; 4]).unwrap();
        assert!(matches!(
            import_file(image.to_str().unwrap()),
            Err(AppError::InvalidInput(_))
        ));

        let empty = dir.path().join("empty.txt");
        fs::write(&empty, "   \n").unwrap();
        assert!(matches!(
            import_file(empty.to_str().unwrap()),
            Err(AppError::Extraction(_))
        ));
    }

    #[test]
    fn oversized_files_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_IMPORT_SIZE + 1).unwrap();

        assert!(matches!(
            import_file(path.to_str().unwrap()),
            Err(AppError::InvalidInput(_))
        ));
    }
}

//! 文本提取服务 - 业务能力层
//!
//! 只负责"从上传文件中取出纯文本"，在任务创建之前同步调用，从不进入 worker。

use tracing::{debug, error};

use crate::error::ExtractError;
use crate::models::Document;

/// 从文档中提取纯文本
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &Document) -> Result<String, ExtractError>;
}

/// 支持 PDF 与 Word 文档的提取器
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextExtractor;

impl FileTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_pdf(document: &Document) -> Result<String, ExtractError> {
        let text = pdf_extract::extract_text_from_mem(&document.bytes).map_err(|e| {
            error!("PDF 解析失败 ({}): {}", document.filename, e);
            ExtractError::ParseFailed {
                filename: document.filename.clone(),
                reason: e.to_string(),
            }
        })?;

        let text = text
            .replace('\0', "")
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        debug!("PDF 文本提取成功: {} ({} 字符)", document.filename, text.len());
        Ok(text)
    }

    fn extract_docx(document: &Document) -> Result<String, ExtractError> {
        let docx = docx_rs::read_docx(&document.bytes).map_err(|e| {
            error!("DOCX 解析失败 ({}): {}", document.filename, e);
            ExtractError::ParseFailed {
                filename: document.filename.clone(),
                reason: e.to_string(),
            }
        })?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
                _ => None,
            })
            .collect();

        let text = paragraphs.join("\n");
        debug!("DOCX 文本提取成功: {} ({} 字符)", document.filename, text.len());
        Ok(text)
    }
}

impl TextExtractor for FileTextExtractor {
    fn extract(&self, document: &Document) -> Result<String, ExtractError> {
        match document.extension().as_deref() {
            Some("pdf") => Self::extract_pdf(document),
            // .doc 也交给 docx 解析器，旧格式会得到解析错误
            Some("docx") | Some("doc") => Self::extract_docx(document),
            _ => {
                error!("不支持的文件类型: {}", document.filename);
                Err(ExtractError::UnsupportedFormat {
                    filename: document.filename.clone(),
                })
            }
        }
    }
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let extractor = FileTextExtractor::new();
        let err = extractor
            .extract(&Document::new("resume.txt", b"hello".to_vec()))
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_extension_is_rejected() {
        let extractor = FileTextExtractor::new();
        assert!(matches!(
            extractor.extract(&Document::new("resume", b"hello".to_vec())),
            Err(ExtractError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_corrupt_pdf_is_parse_error() {
        let extractor = FileTextExtractor::new();
        let err = extractor
            .extract(&Document::new("resume.pdf", b"not a pdf".to_vec()))
            .unwrap_err();
        assert!(matches!(err, ExtractError::ParseFailed { .. }));
    }

    #[test]
    fn test_corrupt_docx_is_parse_error() {
        let extractor = FileTextExtractor::new();
        let err = extractor
            .extract(&Document::new("resume.DOCX", b"not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, ExtractError::ParseFailed { .. }));
    }
}

// src/validation.rs
use crate::config::UploadConfig;
use crate::errors::{ClientError, Result};
use crate::models::UploadedFile;

pub const EMPTY_QUESTION: &str = "Please enter a question to classify";
pub const BAD_EXTENSION: &str = "Please select a valid file type (XLSX, XLS, CSV)";
pub const TOO_LARGE: &str = "File size must be less than 16MB";

/// Trims the question and rejects it when nothing is left.
pub fn validate_question(raw: &str) -> Result<String> {
    let question = raw.trim();
    if question.is_empty() {
        return Err(ClientError::Validation(EMPTY_QUESTION.to_string()));
    }
    Ok(question.to_string())
}

/// `.` plus the lowercased text after the last dot. A name without a dot
/// yields the whole name, which never matches an allowed extension.
pub fn file_extension(name: &str) -> String {
    let tail = name.rsplit('.').next().unwrap_or(name);
    format!(".{}", tail.to_lowercase())
}

/// Checks extension and size before anything is sent.
pub fn validate_upload(file: &UploadedFile, limits: &UploadConfig) -> Result<()> {
    let extension = file_extension(&file.name);
    if !limits.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&extension)) {
        return Err(ClientError::Validation(BAD_EXTENSION.to_string()));
    }
    if file.size() > limits.max_bytes {
        return Err(ClientError::Validation(TOO_LARGE.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(validate_question("  What is DNA?\n").unwrap(), "What is DNA?");
    }

    #[test]
    fn test_blank_questions_rejected() {
        for raw in ["", "   ", "\t\n"] {
            let err = validate_question(raw).unwrap_err();
            assert!(matches!(err, ClientError::Validation(ref m) if m == EMPTY_QUESTION));
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(file_extension("report.CSV"), ".csv");
        assert_eq!(file_extension("archive.tar.xlsx"), ".xlsx");
        assert_eq!(file_extension("README"), ".readme");
    }

    #[test]
    fn test_upload_rules() {
        let limits = UploadConfig::default();

        let txt = UploadedFile::new("report.txt", vec![0; 10]);
        assert_eq!(validate_upload(&txt, &limits).unwrap_err().to_string(), BAD_EXTENSION);

        let big = UploadedFile::new("report.csv", vec![0; 17 * MIB]);
        assert_eq!(validate_upload(&big, &limits).unwrap_err().to_string(), TOO_LARGE);

        let ok = UploadedFile::new("report.csv", vec![b'q'; MIB]);
        assert!(validate_upload(&ok, &limits).is_ok());

        let upper = UploadedFile::new("Exam.XLSX", vec![0; 8]);
        assert!(validate_upload(&upper, &limits).is_ok());
    }

    #[test]
    fn test_exact_limit_is_allowed() {
        let limits = UploadConfig::default();
        let edge = UploadedFile::new("edge.xls", vec![0; 16 * MIB]);
        assert!(validate_upload(&edge, &limits).is_ok());
    }
}

use iced::widget::{button, column, container, row, text, text_input};
use iced::{Color, Element, Length};
use std::path::{Path, PathBuf};

use crate::app::Message;
use crate::error::{ClientError, Result};
use crate::models::UploadReceipt;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const BAD_TYPE: &str = "Please upload a PDF, DOCX, or TXT file";
const TOO_LARGE: &str = "File too large. Maximum size is 10MB";
const UPLOAD_FALLBACK: &str = "Upload failed. Please try again.";

/// Checks name and size before any request is issued.
pub fn validate(file_name: &str, size: u64) -> Result<()> {
    let extension = file_name
        .rfind('.')
        .map(|idx| file_name[idx + 1..].to_ascii_lowercase());

    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => return Err(ClientError::validation(BAD_TYPE)),
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(ClientError::validation(TOO_LARGE));
    }

    Ok(())
}

/// A file that passed pre-flight validation. Only `inspect` builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    path: PathBuf,
    file_name: String,
    size: u64,
}

impl UploadCandidate {
    pub fn inspect(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::validation("Choose a file to upload"))?
            .to_string();

        let metadata = std::fs::metadata(path).map_err(|e| {
            ClientError::validation(format!("Cannot open {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(ClientError::validation(format!("{} is not a file", path.display())));
        }

        validate(&file_name, metadata.len())?;

        Ok(UploadCandidate {
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Default)]
pub struct UploadPanel {
    pub path_input: String,
    uploading: bool,
    message: Option<String>,
    error: Option<String>,
}

impl UploadPanel {
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validates the chosen path. A rejected file leaves the panel idle with
    /// an inline error and yields nothing to send.
    pub fn submit(&mut self) -> Option<UploadCandidate> {
        if self.uploading {
            return None;
        }

        let raw = self.path_input.trim();
        if raw.is_empty() {
            return None;
        }

        match UploadCandidate::inspect(Path::new(raw)) {
            Ok(candidate) => {
                self.uploading = true;
                self.error = None;
                self.message = None;
                Some(candidate)
            }
            Err(e) => {
                tracing::debug!(path = raw, "upload rejected: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Records the outcome. Returns true when the source list should refresh.
    pub fn finish(&mut self, outcome: Result<UploadReceipt>) -> bool {
        self.uploading = false;
        self.path_input.clear();

        match outcome {
            Ok(receipt) => {
                self.message = Some(format!(
                    "{} ({} chunks indexed)",
                    receipt.message, receipt.chunks_indexed
                ));
                true
            }
            Err(e) => {
                self.error = Some(e.detail_or(UPLOAD_FALLBACK));
                false
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut path = text_input("/path/to/notes.pdf", &self.path_input).padding(10);
        let label = if self.is_uploading() { "Uploading..." } else { "Upload" };
        let mut send = button(text(label)).padding(10);
        if !self.is_uploading() {
            path = path
                .on_input(Message::UploadPathChanged)
                .on_submit(Message::SubmitUpload);
            send = send.on_press(Message::SubmitUpload);
        }

        let mut content = column![
            text("Upload Document").size(20),
            row![path, send].spacing(10),
        ]
        .spacing(10);

        if let Some(message) = self.message() {
            content = content.push(text(message).color(Color::from_rgb(0.43, 0.91, 0.72)));
        }
        if let Some(error) = self.error() {
            content = content.push(text(error).color(Color::from_rgb(0.97, 0.44, 0.44)));
        }

        let hint = text("Supported formats: PDF, DOCX, TXT • Max size: 10MB").size(13);
        content = content.push(hint);

        container(content).width(Length::Fill).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, len: usize) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![b'a'; len]).unwrap();
        path
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        assert!(validate("Notes.PDF", 10).is_ok());
        assert!(validate("notes.v2.docx", 10).is_ok());
        assert!(validate("readme.txt", 0).is_ok());
        assert_eq!(validate("setup.exe", 10), Err(ClientError::validation(BAD_TYPE)));
        assert_eq!(validate("Makefile", 10), Err(ClientError::validation(BAD_TYPE)));
        assert_eq!(validate("archive.pdf.zip", 10), Err(ClientError::validation(BAD_TYPE)));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate("big.txt", MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate("big.txt", MAX_UPLOAD_BYTES + 1),
            Err(ClientError::validation(TOO_LARGE))
        );
    }

    #[test]
    fn test_exe_is_rejected_before_size_is_considered() {
        assert_eq!(validate("tool.exe", 1), Err(ClientError::validation(BAD_TYPE)));
        assert_eq!(
            validate("tool.exe", MAX_UPLOAD_BYTES * 4),
            Err(ClientError::validation(BAD_TYPE))
        );
    }

    #[test]
    fn test_panel_rejects_oversized_file_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "dump.txt", 11 * 1024 * 1024);

        let mut panel = UploadPanel::default();
        panel.path_input = path.display().to_string();
        assert!(panel.submit().is_none());
        assert!(!panel.is_uploading());
        assert_eq!(panel.error(), Some(TOO_LARGE));
    }

    #[test]
    fn test_panel_clears_input_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "paper.pdf", 1024);

        let mut panel = UploadPanel::default();
        panel.path_input = path.display().to_string();
        let candidate = panel.submit().unwrap();
        assert_eq!(candidate.size(), 1024);
        assert!(panel.is_uploading());
        assert!(panel.submit().is_none());

        let refresh = panel.finish(Err(ClientError::request(
            Some(500),
            "Request failed with status code 500",
        )));
        assert!(!refresh);
        assert!(panel.path_input.is_empty());
        assert_eq!(panel.error(), Some(UPLOAD_FALLBACK));
    }

    #[test]
    fn test_panel_success_reports_chunks() {
        let mut panel = UploadPanel::default();
        let refresh = panel.finish(Ok(UploadReceipt {
            message: "Indexed paper.pdf".into(),
            chunks_indexed: 12,
        }));
        assert!(refresh);
        assert_eq!(panel.message(), Some("Indexed paper.pdf (12 chunks indexed)"));
    }
}

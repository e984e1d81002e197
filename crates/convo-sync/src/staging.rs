//! Attachment staging buffer
//!
//! Holds files selected for the next send of one conversation. Files with a
//! type outside the allow-list are dropped at selection time; files that are
//! empty, oversized, or over the per-message count are rejected with an error
//! the view can show inline.

use std::path::Path;

use convo_common::AttachmentConfig;
use convo_core::{DomainError, UploadFile};
use tracing::debug;
use uuid::Uuid;

/// A file as picked by the user, before any validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    /// MIME type reported by the picker, if any
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Lowercased extension, if the name has one
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// A file accepted into the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Local identity, used to remove the entry before sending
    pub local_id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl StagedFile {
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn to_upload(&self) -> UploadFile {
        UploadFile {
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            data: self.data.clone(),
        }
    }
}

/// Acceptance rules applied when files are added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingRules {
    pub allowed_extensions: Vec<String>,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl StagingRules {
    pub fn from_config(config: &AttachmentConfig) -> Self {
        Self {
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_file_size: config.max_file_size_bytes(),
            max_files: config.max_files,
        }
    }

    pub fn is_allowed(&self, file: &SelectedFile) -> bool {
        file.extension()
            .is_some_and(|ext| self.allowed_extensions.iter().any(|a| *a == ext))
    }
}

impl Default for StagingRules {
    fn default() -> Self {
        Self::from_config(&AttachmentConfig::default())
    }
}

/// Outcome of one `add` call
#[derive(Debug, Default)]
pub struct StagingReport {
    /// Local ids of the files now in the buffer
    pub staged: Vec<Uuid>,
    /// Filenames dropped for having a type outside the allow-list
    pub ignored: Vec<String>,
    /// Files refused with a message for the user
    pub rejected: Vec<DomainError>,
}

impl StagingReport {
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Conversation-scoped buffer of files awaiting send
#[derive(Debug, Clone, Default)]
pub struct AttachmentStaging {
    rules: StagingRules,
    files: Vec<StagedFile>,
}

impl AttachmentStaging {
    pub fn new(rules: StagingRules) -> Self {
        Self {
            rules,
            files: Vec::new(),
        }
    }

    /// Validate and append selected files
    pub fn add(&mut self, selected: impl IntoIterator<Item = SelectedFile>) -> StagingReport {
        let mut report = StagingReport::default();

        for file in selected {
            if !self.rules.is_allowed(&file) {
                debug!(filename = %file.filename, "Dropping file with unsupported type");
                report.ignored.push(file.filename);
                continue;
            }
            if let Err(err) = self.check(&file) {
                report.rejected.push(err);
                continue;
            }

            let staged = StagedFile {
                local_id: Uuid::new_v4(),
                content_type: file
                    .content_type
                    .clone()
                    .unwrap_or_else(|| mime_for(file.extension().as_deref()).to_string()),
                filename: file.filename,
                data: file.data,
            };
            report.staged.push(staged.local_id);
            self.files.push(staged);
        }

        report
    }

    fn check(&self, file: &SelectedFile) -> Result<(), DomainError> {
        if self.files.len() >= self.rules.max_files {
            return Err(DomainError::TooManyAttachments {
                max: self.rules.max_files,
            });
        }
        if file.data.is_empty() {
            return Err(DomainError::AttachmentRejected {
                filename: file.filename.clone(),
                reason: "file is empty".to_string(),
            });
        }
        if file.data.len() as u64 > self.rules.max_file_size {
            return Err(DomainError::AttachmentRejected {
                filename: file.filename.clone(),
                reason: format!(
                    "file exceeds the {} MB limit",
                    self.rules.max_file_size / (1024 * 1024)
                ),
            });
        }
        Ok(())
    }

    /// Remove one entry; returns whether it was present
    pub fn remove(&mut self, local_id: Uuid) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.local_id != local_id);
        self.files.len() != before
    }

    /// Remove the entries that went out with a confirmed send
    pub fn remove_sent(&mut self, sent: &[Uuid]) {
        self.files.retain(|f| !sent.contains(&f.local_id));
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.files.iter().map(|f| f.local_id).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Copies of the staged files in upload form
    pub fn uploads(&self) -> Vec<UploadFile> {
        self.files.iter().map(StagedFile::to_upload).collect()
    }
}

fn mime_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        Some("rtf") => "application/rtf",
        Some("odt") => "application/vnd.oasis.opendocument.text",
        Some("csv") => "text/csv",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("ods") => "application/vnd.oasis.opendocument.spreadsheet",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

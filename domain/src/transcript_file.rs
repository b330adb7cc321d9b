//! Intake checks for uploaded transcript files.

use crate::error::Error;
use log::*;
use std::path::Path;

const ALLOWED_EXTENSIONS: [&str; 2] = ["txt", "pdf"];

/// An uploaded transcript that passed intake checks.
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl TranscriptFile {
    /// Accepts `.txt` and `.pdf` uploads no larger than `max_file_size` bytes.
    pub fn new(
        file_name: Option<String>,
        data: Vec<u8>,
        max_file_size: usize,
    ) -> Result<Self, Error> {
        let file_name = file_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| Error::validation("file name is required"))?;

        let extension = extension_of(&file_name).ok_or_else(|| {
            warn!("Rejected transcript upload without an extension: {file_name}");
            Error::validation(format!(
                "unsupported file type for '{file_name}', allowed: .txt, .pdf"
            ))
        })?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            warn!("Rejected transcript upload with extension .{extension}");
            return Err(Error::validation(format!(
                "unsupported file type .{extension}, allowed: .txt, .pdf"
            )));
        }

        if data.len() > max_file_size {
            warn!(
                "Rejected transcript upload of {} bytes (limit {max_file_size})",
                data.len()
            );
            return Err(Error::validation(format!(
                "file size exceeds the maximum of {max_file_size} bytes"
            )));
        }

        if data.is_empty() {
            return Err(Error::validation("file is empty"));
        }

        Ok(Self {
            mime_type: mime_type_for(&extension).to_string(),
            file_name,
            data,
        })
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn mime_type_for(extension: &str) -> &'static str {
    match extension {
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

//!
//! chalet upload sandbox
//! ---------------------
//! Ingests uploaded picture bytes under a single sandbox directory. Every
//! destination is normalized and must resolve to a direct child of the root;
//! anything else (e.g. `../` segments smuggled through the original filename)
//! is a hard rejection with no write attempted.
//!
//! Generated names are `<epoch-millis>_<uuid8>_<original>`: the timestamp
//! prefix keeps lexical and chronological order aligned, the uuid fragment
//! removes the same-instant collision window between concurrent uploads.
//! Writes go through a temp file and a rename so a failed write never leaves
//! an addressable partial file.

use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub struct FileIngestor {
    root: PathBuf,
    public_base: String,
}

impl FileIngestor {
    /// Create an ingestor rooted at `root`. The directory itself is created
    /// lazily on first store; `public_base` prefixes returned references.
    pub fn new<P: AsRef<Path>>(root: P, public_base: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    /// Store an uploaded payload and return its externally reachable URL.
    pub fn store(&self, payload: &[u8], original_name: &str) -> AppResult<String> {
        if payload.is_empty() {
            return Err(AppError::invalid("empty_file", "uploaded file is empty"));
        }
        std::fs::create_dir_all(&self.root)
            .map_err(|e| AppError::storage("mkdir".to_string(), format!("create {}: {}", self.root.display(), e)))?;

        let candidate = candidate_name(original_name);
        let destination = self.contained_destination(&candidate)?;

        // Temp file lives in the sandbox so the rename stays on one filesystem.
        let tmp = self.root.join(format!(".{}.part", candidate));
        std::fs::write(&tmp, payload)
            .map_err(|e| AppError::storage("write".to_string(), format!("write {}: {}", tmp.display(), e)))?;
        if let Err(e) = std::fs::rename(&tmp, &destination) {
            let _ = std::fs::remove_file(&tmp);
            return Err(AppError::storage("rename".to_string(), format!("rename into {}: {}", destination.display(), e)));
        }

        Ok(format!("{}/uploads/{}", self.public_base, candidate))
    }

    /// Resolve the candidate name under the root and enforce containment:
    /// after normalization the destination's parent must equal the root
    /// exactly, or the request is rejected before anything touches disk.
    fn contained_destination(&self, candidate: &str) -> AppResult<PathBuf> {
        let root_abs = self
            .root
            .absolutize()
            .map_err(|e| AppError::storage("resolve_root".to_string(), e.to_string()))?
            .to_path_buf();
        let destination = self
            .root
            .join(candidate)
            .absolutize()
            .map_err(|e| AppError::storage("resolve_dest".to_string(), e.to_string()))?
            .to_path_buf();
        match destination.parent() {
            Some(parent) if parent == root_abs => Ok(destination),
            _ => Err(AppError::security(
                "path_escape".to_string(),
                format!("destination {} escapes upload root {}", destination.display(), root_abs.display()),
            )),
        }
    }
}

fn candidate_name(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", millis, &suffix[..8], original_name)
}

#[cfg(test)]
#[path = "uploads_tests.rs"]
mod uploads_tests;

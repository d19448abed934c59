// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executors for queued modifications
//!
//! Every executor treats "already done" as success so a modification can be
//! replayed after a crash.

use gk_adapters::{
    AddNotificationRequest, FileStore, FileStoreError, JobInputStream, JobStore, JobStoreError,
};
use gk_core::jobspec::MISSING_FIELD;
use gk_core::{
    Charset, JobSpecificationError, JobSpecificationMapper, Line, Modification, Opcode, Transfile,
};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file store error: {0}")]
    FileStore(#[from] FileStoreError),

    #[error("job store error: {0}")]
    JobStore(#[from] JobStoreError),

    #[error("job specification error: {0}")]
    JobSpecification(#[from] JobSpecificationError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> OperationError + '_ {
    move |source| OperationError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Runs modifications against the inbound and shadow directories and the
/// upstream stores
#[derive(Clone)]
pub struct OperationExecutor<F, J> {
    dir: PathBuf,
    shadow_dir: PathBuf,
    fallback_charset: Charset,
    mapper: JobSpecificationMapper,
    file_store: F,
    job_store: J,
}

impl<F: FileStore, J: JobStore> OperationExecutor<F, J> {
    pub fn new(
        dir: impl Into<PathBuf>,
        shadow_dir: impl Into<PathBuf>,
        file_store: F,
        job_store: J,
    ) -> Self {
        Self {
            dir: dir.into(),
            shadow_dir: shadow_dir.into(),
            fallback_charset: Charset::Latin5,
            mapper: JobSpecificationMapper::default(),
            file_store,
            job_store,
        }
    }

    pub fn with_mapper(mut self, mapper: JobSpecificationMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_fallback_charset(mut self, charset: Charset) -> Self {
        self.fallback_charset = charset;
        self
    }

    pub async fn execute(&self, modification: &Modification) -> Result<(), OperationError> {
        tracing::debug!(%modification, "executing");
        let name = &modification.transfile_name;
        let arg = &modification.arg;
        match modification.opcode {
            Opcode::DeleteFile => self.delete_file(arg),
            Opcode::MoveFile => self.move_file(arg),
            Opcode::CreateTransfile => self.create_transfile(name, arg),
            Opcode::CreateJob => self.create_job(name, arg).await,
            Opcode::CreateInvalidTransfileNotification => {
                self.notify_invalid_transfile(name, arg).await;
                Ok(())
            }
        }
    }

    fn delete_file(&self, name: &str) -> Result<(), OperationError> {
        let path = self.dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "file already deleted");
                Ok(())
            }
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn move_file(&self, name: &str) -> Result<(), OperationError> {
        let source = self.dir.join(name);
        let target = self.shadow_dir.join(name);
        if !source.exists() {
            tracing::warn!(path = %source.display(), "file to move is gone, assuming moved");
            return Ok(());
        }
        std::fs::create_dir_all(&self.shadow_dir).map_err(io_error(&self.shadow_dir))?;

        if let Err(e) = std::fs::rename(&source, &target) {
            // Rename fails across filesystems
            tracing::debug!(error = %e, "rename failed, copying instead");
            std::fs::copy(&source, &target).map_err(io_error(&target))?;
            std::fs::remove_file(&source).map_err(io_error(&source))?;
        }
        tracing::info!(from = %source.display(), to = %target.display(), "moved file");
        Ok(())
    }

    fn create_transfile(&self, name: &str, content: &str) -> Result<(), OperationError> {
        std::fs::create_dir_all(&self.shadow_dir).map_err(io_error(&self.shadow_dir))?;
        let target = self.shadow_dir.join(name);
        let temp = self.shadow_dir.join(format!(".{}.tmp", name));
        std::fs::write(&temp, content).map_err(io_error(&temp))?;
        std::fs::rename(&temp, &target).map_err(io_error(&target))?;
        tracing::info!(path = %target.display(), "created transfile");
        Ok(())
    }

    async fn create_job(&self, transfile_name: &str, raw_line: &str) -> Result<(), OperationError> {
        let transfile_path = self.dir.join(transfile_name);
        let raw = std::fs::read(&transfile_path).map_err(io_error(&transfile_path))?;
        let line = Line::parse(raw_line);

        let upload = match line.non_blank("f").map(|f| self.dir.join(f)) {
            Some(datafile) if datafile.exists() => {
                let content = std::fs::read(&datafile).map_err(io_error(&datafile))?;
                Some(self.file_store.add_file(content).await?)
            }
            Some(datafile) => {
                tracing::warn!(path = %datafile.display(), "datafile not found, creating job without it");
                None
            }
            None => None,
        };

        let file_store_id = upload.as_deref().unwrap_or(MISSING_FIELD);
        let spec = match self.mapper.map(&line, transfile_name, file_store_id, &raw) {
            Ok(spec) => spec,
            Err(e) => {
                self.discard_upload(upload.as_deref()).await;
                return Err(e.into());
            }
        };

        match self.job_store.add_job(&JobInputStream::new(spec)).await {
            Ok(info) => {
                tracing::info!(transfile = transfile_name, job_id = info.job_id, "job created");
                Ok(())
            }
            Err(e) => {
                // A 5xx may still have created the job, so the upload stays
                if !e.is_server_error() {
                    self.discard_upload(upload.as_deref()).await;
                }
                Err(e.into())
            }
        }
    }

    async fn discard_upload(&self, id: Option<&str>) {
        let Some(id) = id else {
            return;
        };
        if let Err(e) = self.file_store.delete_file(id).await {
            tracing::warn!(id, error = %e, "failed to delete orphaned upload");
        }
    }

    async fn notify_invalid_transfile(&self, transfile_name: &str, cause: &str) {
        let path = self.dir.join(transfile_name);
        let (address, content) = match Transfile::open(&path, self.fallback_charset) {
            Ok(transfile) => (notification_address(transfile.lines()), transfile.content().to_string()),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "transfile unreadable for notification");
                (MISSING_FIELD.to_string(), String::new())
            }
        };

        tracing::warn!(transfile = transfile_name, to = %address, cause, "invalid transfile");
        let request =
            AddNotificationRequest::invalid_transfile(address, transfile_name, cause, content);
        if let Err(e) = self.job_store.add_notification(&request).await {
            tracing::error!(transfile = transfile_name, error = %e, "failed to send notification");
        }
    }
}

/// First non-blank `m` of any line, else the first non-blank `M`
fn notification_address(lines: &[Line]) -> String {
    lines
        .iter()
        .find_map(|l| l.non_blank("m"))
        .or_else(|| lines.iter().find_map(|l| l.non_blank("M")))
        .unwrap_or(MISSING_FIELD)
        .to_string()
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;

use std::collections::HashMap;

use crate::domain::errors::StorageError;
use crate::domain::models::{DownloadResult, UploadResult};

/// Byte-level progress of one transfer.
///
/// The remote client reports no real progress, so upload progress is
/// synthesized (see the upload controller); the record still uses the shape a
/// genuine progress stream would, so a real source can be swapped in without
/// touching consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub loaded: u64,
    pub total: u64,
    pub percentage: u8,
}

impl Progress {
    pub fn new(loaded: u64, total: u64) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            ((loaded as f64 / total as f64) * 100.0).round() as u8
        };
        Self {
            loaded,
            total,
            percentage,
        }
    }

    pub fn complete(total: u64) -> Self {
        Self {
            loaded: total,
            total,
            percentage: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

/// State machine for one upload invocation. Transitions only move forward
/// (idle -> uploading -> success | error) within a single invocation; a fresh
/// invocation or an explicit reset restarts the machine.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub status: UploadStatus,
    pub progress: Progress,
    pub result: Option<UploadResult>,
    pub error: Option<StorageError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiUploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    /// Some files succeeded, some failed
    Partial,
    Error,
}

/// Aggregate state of a sequential multi-file upload: a per-filename state
/// map plus running counters.
#[derive(Debug, Clone, Default)]
pub struct MultiUploadState {
    pub status: MultiUploadStatus,
    pub files: HashMap<String, UploadState>,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadStatus {
    #[default]
    Idle,
    Downloading,
    Success,
    Error,
}

/// State machine for one download invocation.
#[derive(Debug, Clone, Default)]
pub struct DownloadState {
    pub status: DownloadStatus,
    pub progress: Progress,
    pub result: Option<DownloadResult>,
    pub error: Option<StorageError>,
}

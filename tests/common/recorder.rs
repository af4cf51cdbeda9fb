//! Chat transport that records every outbound call instead of talking to Telegram

#![allow(dead_code)]

use async_trait::async_trait;
use igrelay::telegram::{ChatTransport, StatusHandle};
use igrelay::{AppError, AppResult};
use std::path::Path;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;

/// One outbound call as seen by the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentCall {
    Status(String),
    Edit(i32, String),
    Photo { file: String, caption: Option<String> },
    Video { file: String, caption: Option<String> },
}

/// Recording transport with optional injected failures
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<SentCall>>,
    next_id: AtomicI32,
    uploads: AtomicUsize,
    /// 1-based upload attempts that fail
    fail_uploads: Vec<usize>,
    fail_status: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads with these 1-based attempt numbers are rejected
    pub fn failing_uploads(attempts: &[usize]) -> Self {
        Self {
            fail_uploads: attempts.to_vec(),
            ..Self::default()
        }
    }

    /// Every status message send is rejected
    pub fn failing_status() -> Self {
        Self {
            fail_status: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SentCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Photo and video uploads in the order they were made
    pub fn uploads(&self) -> Vec<SentCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, SentCall::Photo { .. } | SentCall::Video { .. }))
            .collect()
    }

    /// Last status text, whether sent or edited
    pub fn last_status(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|c| match c {
            SentCall::Status(text) | SentCall::Edit(_, text) => Some(text),
            _ => None,
        })
    }

    fn record(&self, call: SentCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn upload(&self, path: &Path, caption: Option<&str>, video: bool) -> AppResult<()> {
        // The file must still be on disk when the upload happens
        assert!(path.exists(), "uploading missing file {}", path.display());

        let attempt = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_uploads.contains(&attempt) {
            return Err(AppError::Delivery(format!("upload {} rejected", attempt)));
        }

        let file = path.file_name().unwrap().to_string_lossy().to_string();
        let caption = caption.map(str::to_string);
        self.record(if video {
            SentCall::Video { file, caption }
        } else {
            SentCall::Photo { file, caption }
        });
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_status(&self, text: &str) -> AppResult<StatusHandle> {
        if self.fail_status {
            return Err(AppError::Delivery("status rejected".to_string()));
        }
        self.record(SentCall::Status(text.to_string()));
        Ok(StatusHandle(self.next_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn edit_status(&self, handle: StatusHandle, text: &str) -> AppResult<()> {
        self.record(SentCall::Edit(handle.0, text.to_string()));
        Ok(())
    }

    async fn send_photo(&self, path: &Path, caption: Option<&str>) -> AppResult<()> {
        self.upload(path, caption, false)
    }

    async fn send_video(&self, path: &Path, caption: Option<&str>) -> AppResult<()> {
        self.upload(path, caption, true)
    }
}

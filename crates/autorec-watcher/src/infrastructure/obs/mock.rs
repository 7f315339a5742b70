//! Mock recording host for tests.
//!
//! Behaves like a well-mannered OBS: starting while recording and stopping
//! while idle both succeed.  Every call is recorded so tests can assert on
//! exactly what the watcher asked for.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::record_games::{HostError, RecordingHost};

/// A call made to [`MockRecordingHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    IsRecording,
    StartRecording,
    StopRecording,
}

#[derive(Default)]
struct Inner {
    recording: bool,
    offline: bool,
    calls: Vec<HostCall>,
}

/// A [`RecordingHost`] that keeps its recording flag in memory.
#[derive(Clone, Default)]
pub struct MockRecordingHost {
    inner: Arc<Mutex<Inner>>,
}

impl MockRecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the user recording on their own.
    pub fn set_recording(&self, recording: bool) {
        self.inner.lock().expect("lock poisoned").recording = recording;
    }

    /// While offline every call fails with [`HostError::Unreachable`].
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().expect("lock poisoned").offline = offline;
    }

    pub fn is_recording_now(&self) -> bool {
        self.inner.lock().expect("lock poisoned").recording
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.inner.lock().expect("lock poisoned").calls.clone()
    }

    fn with_call<T>(&self, call: HostCall, f: impl FnOnce(&mut Inner) -> T) -> Result<T, HostError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.calls.push(call);
        if inner.offline {
            return Err(HostError::Unreachable("mock host offline".to_string()));
        }
        Ok(f(&mut inner))
    }
}

#[async_trait]
impl RecordingHost for MockRecordingHost {
    async fn is_recording(&self) -> Result<bool, HostError> {
        self.with_call(HostCall::IsRecording, |inner| inner.recording)
    }

    async fn start_recording(&self) -> Result<(), HostError> {
        self.with_call(HostCall::StartRecording, |inner| inner.recording = true)
    }

    async fn stop_recording(&self) -> Result<(), HostError> {
        self.with_call(HostCall::StopRecording, |inner| inner.recording = false)
    }
}

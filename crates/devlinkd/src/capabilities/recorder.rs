//! Microphone recording.
//!
//! Only one recording runs at a time. The [`RecorderSlot`] owns that state:
//! starting while a recording is active reports the active file without
//! starting again, and stopping while idle reports the last file recorded
//! (or nothing if no recording was ever made).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use tracing::{debug, info};

use devlink_protocol::{Payload, Permission};

use super::{CAPABILITY_TARGET, CapabilityError};
use crate::dispatch::RegistryBuilder;

const MODULE: &str = "recorder";

/// Captures microphone audio into files.
pub trait AudioRecorder: Send + Sync {
    /// Begins recording into `output`.
    fn start(&self, output: &Path) -> Result<(), CapabilityError>;

    /// Finishes the current recording.
    fn stop(&self) -> Result<(), CapabilityError>;
}

#[derive(Debug, Default)]
struct SlotState {
    active: Option<PathBuf>,
    last: Option<PathBuf>,
}

/// Single-instance recording state shared by the recorder handlers.
pub struct RecorderSlot {
    recorder: Arc<dyn AudioRecorder>,
    output_dir: PathBuf,
    state: Mutex<SlotState>,
}

impl RecorderSlot {
    /// Records through `recorder` into files under `output_dir`.
    #[must_use]
    pub fn new(recorder: Arc<dyn AudioRecorder>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            recorder,
            output_dir: output_dir.into(),
            state: Mutex::new(SlotState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts recording and returns the output file.
    ///
    /// # Errors
    ///
    /// Propagates the recorder's failure to start.
    pub fn start(&self) -> Result<PathBuf, CapabilityError> {
        let mut state = self.lock();
        if let Some(active) = &state.active {
            debug!(
                target: CAPABILITY_TARGET,
                path = %active.display(),
                "recording already active"
            );
            return Ok(active.clone());
        }

        let output = self.output_dir.join(format!("rec_{}.mp4", epoch_millis()));
        self.recorder.start(&output)?;
        info!(
            target: CAPABILITY_TARGET,
            path = %output.display(),
            "recording started"
        );
        state.active = Some(output.clone());
        state.last = Some(output.clone());
        Ok(output)
    }

    /// Stops recording and returns the file that was being written, or the
    /// last recorded file when idle.
    ///
    /// # Errors
    ///
    /// Propagates the recorder's failure to stop; the recording stays active.
    pub fn stop(&self) -> Result<Option<PathBuf>, CapabilityError> {
        let mut state = self.lock();
        let Some(active) = state.active.clone() else {
            return Ok(state.last.clone());
        };
        self.recorder.stop()?;
        state.active = None;
        info!(
            target: CAPABILITY_TARGET,
            path = %active.display(),
            "recording stopped"
        );
        Ok(Some(active))
    }

    /// Returns `true` while a recording is active.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.lock().active.is_some()
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

fn path_value(path: Option<&Path>) -> Value {
    path.map_or(Value::Null, |path| {
        Value::String(path.to_string_lossy().into_owned())
    })
}

pub(crate) fn register(builder: RegistryBuilder, slot: Arc<RecorderSlot>) -> RegistryBuilder {
    let stopping = Arc::clone(&slot);
    builder
        .register(MODULE, "start", Some(Permission::Microphone), move |_| {
            let output = slot.start()?;
            Ok(Payload::new().with("path", path_value(Some(&output))))
        })
        .register(MODULE, "stop", Some(Permission::Microphone), move |_| {
            let output = stopping.stop()?;
            Ok(Payload::new().with("path", path_value(output.as_deref())))
        })
}

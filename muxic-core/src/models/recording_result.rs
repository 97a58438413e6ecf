use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;
use super::format::AudioFormatDescriptor;
use super::recording::Recording;

/// Why the capture loop left the capturing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop signal was observed.
    Operator,
    /// The failure threshold was reached.
    PollFailures { consecutive: u32 },
}

/// Counters for one capture session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub polls: u64,
    pub empty_polls: u64,
    pub chunks: u64,
    pub bytes_captured: u64,
    pub transient_failures: u64,
    pub releases: u64,
    pub redraws: u64,
}

/// Everything the capture loop hands back once it is finished.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub recording: Recording,
    pub stop_reason: StopReason,
    pub stats: CaptureStats,
    /// Error from the session's stop call; captured data is kept regardless.
    pub stop_error: Option<CaptureError>,
}

/// Result of persisting a recording to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTrack {
    pub file_path: PathBuf,
    pub file_bytes: u64,
    pub data_bytes: u64,
    pub duration_secs: f64,
    pub checksum: String,
}

/// Sidecar metadata written next to a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub track_name: String,
    pub file_path: String,
    pub created_at: String,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub data_bytes: u64,
    pub checksum: String,
}

impl RecordingMetadata {
    pub fn new(track_name: &str, saved: &SavedTrack, format: &AudioFormatDescriptor) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            track_name: track_name.to_string(),
            file_path: saved.file_path.to_string_lossy().into_owned(),
            created_at: chrono::Utc::now().to_rfc3339(),
            duration_secs: saved.duration_secs,
            sample_rate: format.sample_rate(),
            channels: format.channels(),
            bits_per_sample: format.bits_per_sample(),
            data_bytes: saved.data_bytes,
            checksum: saved.checksum.clone(),
        }
    }
}

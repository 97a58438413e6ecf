//! # muxic-core
//!
//! Platform-agnostic half of the muxic recorder.
//!
//! Drives a capture device through a non-blocking polling loop, meters the
//! incoming audio for a live level bar, converts float captures to 16-bit
//! PCM and writes the result as a WAV file. Platform backends (Windows
//! WASAPI) implement `CaptureProvider` / `CaptureSession` and plug into
//! the generic `CaptureLoop`.
//!
//! ## Architecture
//!
//! ```text
//! muxic-core (this crate)
//! ├── traits/       ← CaptureProvider, CaptureSession, CaptureDelegate
//! ├── models/       ← CaptureError, LoopState, AudioFormatDescriptor, Recording, etc.
//! ├── processing/   ← sample conversion, peak meter, level bar, WAV encode/parse
//! ├── session/      ← CaptureLoop (generic state machine), StopSignal, finalize
//! └── storage/      ← atomic track writer, metadata sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioSource, DeviceSelector};
pub use models::config::CaptureLoopConfig;
pub use models::error::CaptureError;
pub use models::format::{AudioFormatDescriptor, FormatExtension, FormatTag};
pub use models::recording::{RawChunk, Recording};
pub use models::recording_result::{CaptureOutcome, CaptureStats, RecordingMetadata, SavedTrack, StopReason};
pub use models::state::LoopState;
pub use processing::wav_format::{encode_wav, parse_wav, read_wav_header, ParsedWav, WavHeader};
pub use session::capture_loop::CaptureLoop;
pub use session::finalize::finalize_for_container;
pub use session::stop_signal::StopSignal;
pub use storage::track_writer::write_wav_atomic;
pub use traits::capture_delegate::{CaptureDelegate, NullDelegate};
pub use traits::capture_provider::CaptureProvider;
pub use traits::capture_session::{BufferPoll, CaptureSession, DeviceBuffer};

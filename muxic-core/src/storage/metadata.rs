use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;
use crate::storage::track_writer;

/// `take1.wav` → `take1.metadata.json`
pub fn sidecar_path(track_path: &Path) -> PathBuf {
    track_path.with_extension("metadata.json")
}

/// Write the JSON sidecar next to a saved track.
pub fn write_metadata(metadata: &RecordingMetadata, track_path: &Path) -> Result<PathBuf, CaptureError> {
    let path = sidecar_path(track_path);
    let json = serde_json::to_vec_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    track_writer::write_atomic(&path, &json)?;
    log::debug!("Wrote metadata sidecar {}", path.display());
    Ok(path)
}

/// Read the sidecar for `track_path`, if it was written.
pub fn read_metadata(track_path: &Path) -> Result<Option<RecordingMetadata>, CaptureError> {
    let path = sidecar_path(track_path);
    let json = match fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(CaptureError::StorageError(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::AudioFormatDescriptor;
    use crate::models::recording_result::SavedTrack;

    fn sample(track_path: &Path) -> RecordingMetadata {
        let saved = SavedTrack {
            file_path: track_path.to_path_buf(),
            file_bytes: 44 + 1600,
            data_bytes: 1600,
            duration_secs: 0.01,
            checksum: "ab".repeat(32),
        };
        let format = AudioFormatDescriptor::pcm(2, 44100, 16).unwrap();
        RecordingMetadata::new("take1", &saved, &format)
    }

    #[test]
    fn sidecar_sits_next_to_track() {
        assert_eq!(
            sidecar_path(Path::new("tracks/take1.wav")),
            PathBuf::from("tracks/take1.metadata.json")
        );
    }

    #[test]
    fn written_sidecar_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("take1.wav");
        let metadata = sample(&track);

        let written = write_metadata(&metadata, &track).unwrap();

        assert!(written.ends_with("take1.metadata.json"));
        assert_eq!(read_metadata(&track).unwrap(), Some(metadata));
    }

    #[test]
    fn missing_sidecar_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_metadata(&dir.path().join("nope.wav")).unwrap(), None);
    }

    #[test]
    fn corrupt_sidecar_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("bad.wav");
        fs::write(sidecar_path(&track), b"{ not json").unwrap();

        assert!(matches!(read_metadata(&track), Err(CaptureError::StorageError(_))));
    }

    #[test]
    fn metadata_carries_format_and_checksum() {
        let metadata = sample(Path::new("take1.wav"));
        assert_eq!(metadata.sample_rate, 44100);
        assert_eq!(metadata.channels, 2);
        assert_eq!(metadata.bits_per_sample, 16);
        assert_eq!(metadata.checksum.len(), 64);
        assert!(uuid::Uuid::parse_str(&metadata.id).is_ok());
    }
}

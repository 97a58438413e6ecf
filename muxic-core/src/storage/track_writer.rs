use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::CaptureError;
use crate::models::recording::Recording;
use crate::models::recording_result::SavedTrack;
use crate::processing::wav_format;

/// Encode `recording` as a WAV file at `path`.
///
/// The file is written to a temporary sibling first and renamed into
/// place, so a failed save never leaves a half-written track behind and
/// never clobbers the previous contents of `path`.
pub fn write_wav_atomic(path: &Path, recording: &Recording) -> Result<SavedTrack, CaptureError> {
    let bytes = wav_format::encode_wav(recording.format(), recording.data())?;
    write_atomic(path, &bytes)?;

    let saved = SavedTrack {
        file_path: path.to_path_buf(),
        file_bytes: bytes.len() as u64,
        data_bytes: recording.len() as u64,
        duration_secs: recording.duration_secs(),
        checksum: sha256_hex(&bytes),
    };
    log::info!(
        "Saved {} ({} bytes, {:.1}s, sha256 {})",
        saved.file_path.display(),
        saved.file_bytes,
        saved.duration_secs,
        saved.checksum
    );
    Ok(saved)
}

/// Write `bytes` to a temp file next to `path`, sync it, then rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CaptureError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .map_err(|e| CaptureError::IoWrite(format!("failed to create {}: {}", dir.display(), e)))?;

    let temp_path = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
    if let Err(e) = write_synced(&temp_path, bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CaptureError::IoWrite(format!("failed to move into {}: {}", path.display(), e))
    })
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), CaptureError> {
    let mut file = File::create(path)
        .map_err(|e| CaptureError::IoWrite(format!("failed to create {}: {}", path.display(), e)))?;
    file.write_all(bytes)
        .map_err(|e| CaptureError::IoWrite(format!("write failed: {}", e)))?;
    file.flush()
        .map_err(|e| CaptureError::IoWrite(format!("flush failed: {}", e)))?;
    file.sync_all()
        .map_err(|e| CaptureError::IoWrite(format!("sync failed: {}", e)))?;
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{:02x}", b)).collect()
}

//! The `tracks/` directory: one `<name>.wav` per recorded track.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use muxic_core::processing::wav_format;

pub const TRACKS_DIR: &str = "tracks";
const TRACK_EXTENSION: &str = "wav";

/// A `.wav` file found in the tracks directory.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEntry {
    pub name: String,
    pub file_name: String,
    pub size_bytes: u64,
    /// `None` when the file does not parse as WAV.
    pub duration_secs: Option<f64>,
}

impl TrackEntry {
    pub fn size_kb(&self) -> u64 {
        self.size_bytes / 1024
    }
}

pub struct TrackCatalog {
    root: PathBuf,
}

impl TrackCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `tracks/<name>.wav`, after checking the name stays inside the catalog.
    pub fn track_path(&self, name: &str) -> Result<PathBuf> {
        validate_track_name(name)?;
        Ok(self.root.join(format!("{name}.{TRACK_EXTENSION}")))
    }

    /// Tracks sorted by name, or `None` when the directory does not exist.
    pub fn list(&self) -> Result<Option<Vec<TrackEntry>>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", self.root.display())),
        };

        let mut tracks = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TRACK_EXTENSION) {
                continue;
            }
            let metadata = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            tracks.push(TrackEntry {
                name,
                file_name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: metadata.len(),
                duration_secs: read_duration(&path, metadata.len()),
            });
        }
        tracks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(tracks))
    }
}

/// Duration from the header alone; a short file counts only the payload
/// bytes it actually holds.
fn read_duration(path: &Path, file_len: u64) -> Option<f64> {
    let file = File::open(path).ok()?;
    match wav_format::read_wav_header(&mut BufReader::new(file)) {
        Ok(header) => {
            let available = file_len.saturating_sub(header.data_offset);
            let data_len = u64::from(header.data_len).min(available);
            let frames = data_len / u64::from(header.format.block_align());
            Some(frames as f64 / f64::from(header.format.sample_rate()))
        }
        Err(e) => {
            log::debug!("{} is not a readable WAV file: {}", path.display(), e);
            None
        }
    }
}

/// Track names become file names; keep them to a single path component.
pub fn validate_track_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("track name must not be empty");
    }
    if name.contains(['/', '\\']) || name.contains("..") {
        bail!("invalid track name '{name}': must not contain path separators or '..'");
    }
    Ok(())
}

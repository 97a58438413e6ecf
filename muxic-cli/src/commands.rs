use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Context, Result};

use muxic_core::models::recording_result::RecordingMetadata;
use muxic_core::storage::metadata;
use muxic_core::{
    finalize_for_container, write_wav_atomic, AudioFormatDescriptor, AudioSource, CaptureDelegate, CaptureError, CaptureLoop,
    CaptureLoopConfig, CaptureProvider, CaptureSession, DeviceSelector, Recording, SavedTrack, StopReason,
    StopSignal,
};

use crate::catalog::TrackCatalog;
use crate::console_delegate::ConsoleDelegate;
use crate::settings::UserConfig;

/// Seconds of silence written by `mix`.
const MIX_PLACEHOLDER_SECS: u32 = 2;

/// `muxic record <track>`: capture from the configured device until Enter.
pub fn record<P: CaptureProvider>(
    provider: &P,
    catalog: &TrackCatalog,
    config_path: &Path,
    track: &str,
) -> Result<()> {
    let track_path = catalog.track_path(track)?;
    let config = UserConfig::load_from(config_path)?;
    let selector = DeviceSelector::from_name(config.default_device.as_deref());
    let session = provider.open(&selector).context("failed to open capture device")?;
    println!("{}", device_banner(&selector, session.source()));

    let stop = StopSignal::new();
    let listener = stop.clone();
    let gate = move || {
        println!("Press Enter to start recording...");
        wait_for_enter(&mut io::stdin().lock()).map_err(|e| CaptureError::Unknown(e.to_string()))?;
        println!("[RECORDING] Recording... (Press Enter to stop)");
        thread::Builder::new()
            .name("muxic-stop-listener".into())
            .spawn(move || {
                if let Err(e) = wait_for_enter(&mut io::stdin().lock()) {
                    log::warn!("Reading stdin failed, stopping: {}", e);
                }
                listener.trigger();
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn stop listener: {}", e)))?;
        Ok(())
    };

    let saved = capture_track(
        session,
        CaptureLoopConfig::default(),
        Arc::new(ConsoleDelegate::stdout()),
        gate,
        &stop,
        track,
        &track_path,
    )?;
    println!("[OK] Track '{}' saved to {}", track, saved.file_path.display());
    Ok(())
}

/// Arm, capture, convert and save one track.
///
/// Whatever was captured is saved even when the device stopped responding;
/// that case is then reported as an error.
pub fn capture_track<S, G>(
    session: S,
    config: CaptureLoopConfig,
    delegate: Arc<dyn CaptureDelegate>,
    gate: G,
    stop: &StopSignal,
    track: &str,
    track_path: &Path,
) -> Result<SavedTrack>
where
    S: CaptureSession,
    G: FnOnce() -> Result<(), CaptureError>,
{
    let mut capture = CaptureLoop::new(session, config)?;
    capture.set_delegate(Arc::clone(&delegate));
    capture.arm(gate)?;
    let outcome = capture.run(stop)?;

    if outcome.recording.format().is_float32() {
        delegate.on_status("Converting 32-bit float to 16-bit PCM...");
    }
    let recording = finalize_for_container(outcome.recording)?;
    let saved = write_wav_atomic(track_path, &recording)
        .with_context(|| format!("failed to save track '{track}'"))?;

    let meta = RecordingMetadata::new(track, &saved, recording.format());
    if let Err(e) = metadata::write_metadata(&meta, track_path) {
        log::warn!("Track saved without metadata: {}", e);
    }

    if let StopReason::PollFailures { consecutive } = outcome.stop_reason {
        println!("[OK] Partial track '{}' saved to {}", track, saved.file_path.display());
        return Err(CaptureError::DeviceUnresponsive {
            consecutive_failures: consecutive,
        }
        .into());
    }
    Ok(saved)
}

/// Names the endpoint actually opened, which for the default selector is
/// only known once the session exists.
fn device_banner(selector: &DeviceSelector, source: &AudioSource) -> String {
    match selector {
        DeviceSelector::Named(_) => format!("Using device: {}", source.name),
        DeviceSelector::Default => format!("Using default device: {}", source.name),
    }
}

fn wait_for_enter(input: &mut impl BufRead) -> io::Result<()> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

/// `muxic list`
pub fn list(catalog: &TrackCatalog, out: &mut impl Write) -> Result<()> {
    let Some(tracks) = catalog.list()? else {
        writeln!(out, "No tracks directory found. Record a track first!")?;
        return Ok(());
    };

    writeln!(out, "[TRACKS] Recorded Tracks:")?;
    writeln!(out, "==================")?;
    if tracks.is_empty() {
        writeln!(out, "  (no tracks recorded yet)")?;
        return Ok(());
    }
    for (i, track) in tracks.iter().enumerate() {
        match track.duration_secs {
            Some(secs) => writeln!(out, "  {}. {} ({} KB, {:.1}s)", i + 1, track.name, track.size_kb(), secs)?,
            None => writeln!(out, "  {}. {} ({} KB)", i + 1, track.name, track.size_kb())?,
        }
    }
    writeln!(out, "\nTotal: {} track(s)", tracks.len())?;
    Ok(())
}

/// `muxic mix <output>`: lists the inputs and writes a silent placeholder.
pub fn mix(catalog: &TrackCatalog, output: &str, out: &mut impl Write) -> Result<()> {
    let output_path = catalog.track_path(output)?;
    let tracks = catalog.list()?.unwrap_or_default();
    if tracks.is_empty() {
        bail!("No tracks found to mix");
    }

    writeln!(out, "[MIXING] Mixing tracks into '{}'...", output)?;
    for track in &tracks {
        writeln!(out, "  + {}", track.file_name)?;
    }

    let format = AudioFormatDescriptor::pcm(2, 44100, 16)?;
    let silence_len = format.avg_bytes_per_sec() as usize * MIX_PLACEHOLDER_SECS as usize;
    let silence = Recording::from_parts(format, vec![0; silence_len]);
    write_wav_atomic(&output_path, &silence).with_context(|| format!("failed to write mix '{output}'"))?;

    writeln!(out, "[OK] Mixed {} tracks into {}", tracks.len(), output_path.display())?;
    Ok(())
}

/// `muxic export <track> <file>`
pub fn export(catalog: &TrackCatalog, track: &str, destination: &Path, out: &mut impl Write) -> Result<()> {
    let source = catalog.track_path(track)?;
    if !source.is_file() {
        bail!("Track '{}' not found", track);
    }
    fs::copy(&source, destination)
        .with_context(|| format!("failed to copy {} to {}", source.display(), destination.display()))?;
    writeln!(out, "[OK] Exported '{}' to {}", track, destination.display())?;
    Ok(())
}

/// `muxic device list`: marks the configured default with `*`.
pub fn device_list<P: CaptureProvider>(provider: &P, config_path: &Path, out: &mut impl Write) -> Result<()> {
    let config = UserConfig::load_from(config_path)?;
    let devices = provider.list_devices().context("failed to enumerate capture devices")?;

    writeln!(out, "[DEVICES] Audio Capture Devices:")?;
    match &config.default_device {
        Some(name) => writeln!(out, "Current Default: {name}")?,
        None => writeln!(out, "Current Default: (none selected)")?,
    }
    writeln!(out, "======================")?;

    if devices.is_empty() {
        writeln!(out, "No audio capture devices found.")?;
        return Ok(());
    }
    for (i, device) in devices.iter().enumerate() {
        let indicator = if config.default_device.as_deref() == Some(device.name.as_str()) {
            "*"
        } else {
            " "
        };
        writeln!(out, "{} {}. {}", indicator, i + 1, device.name)?;
    }
    Ok(())
}

/// `muxic device select <name...>`
pub fn device_select(config_path: &Path, words: &[String], out: &mut impl Write) -> Result<()> {
    let name = words.join(" ");
    if name.trim().is_empty() {
        bail!("device name required");
    }
    let mut config = UserConfig::load_from(config_path)?;
    config.default_device = Some(name.clone());
    config.save_to(config_path)?;
    writeln!(out, "Selected default recording device: '{}'", name)?;
    Ok(())
}

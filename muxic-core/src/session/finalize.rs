use crate::models::error::CaptureError;
use crate::models::recording::Recording;
use crate::processing::sample_convert;

/// Prepare a finished recording for the WAV encoder.
///
/// 32-bit float recordings are converted to 16-bit PCM with a matching
/// descriptor (channels and sample rate kept). Everything else passes
/// through untouched.
pub fn finalize_for_container(recording: Recording) -> Result<Recording, CaptureError> {
    if !recording.format().is_float32() {
        return Ok(recording);
    }

    let (format, data) = recording.into_parts();
    let pcm = sample_convert::float32_to_pcm16(&data)?;
    let pcm_format = format.to_pcm16()?;
    log::info!(
        "Converted {} bytes of 32-bit float to {} bytes of 16-bit PCM ({})",
        data.len(),
        pcm.len(),
        pcm_format
    );
    Ok(Recording::from_parts(pcm_format, pcm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::{AudioFormatDescriptor, FormatExtension, FormatTag, EXTENSION_SIZE};

    fn float_bytes(samples: &[f32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn float_recording_becomes_pcm16() {
        let format = AudioFormatDescriptor::ieee_float(2, 48000).unwrap();
        let recording = Recording::from_parts(format, float_bytes(&[1.0, -1.0, 0.0, 2.0]));

        let finished = finalize_for_container(recording).unwrap();

        assert_eq!(finished.format().tag(), FormatTag::Pcm);
        assert_eq!(finished.format().bits_per_sample(), 16);
        assert_eq!(finished.format().channels(), 2);
        assert_eq!(finished.format().sample_rate(), 48000);
        assert_eq!(finished.format().block_align(), 4);
        assert_eq!(finished.format().avg_bytes_per_sec(), 192_000);
        assert_eq!(
            finished.data(),
            &[0xFF, 0x7F, 0x01, 0x80, 0x00, 0x00, 0xFF, 0x7F]
        );
    }

    #[test]
    fn extensible_float_is_converted() {
        let ext = FormatExtension::new([0xAB; EXTENSION_SIZE]);
        let format = AudioFormatDescriptor::extensible(1, 44100, 32, ext).unwrap();
        let recording = Recording::from_parts(format, float_bytes(&[0.5]));

        let finished = finalize_for_container(recording).unwrap();

        assert_eq!(finished.format().tag(), FormatTag::Pcm);
        assert!(finished.format().extension().is_none());
        assert_eq!(finished.len(), 2);
    }

    #[test]
    fn pcm16_passes_through() {
        let format = AudioFormatDescriptor::pcm(2, 44100, 16).unwrap();
        let recording = Recording::from_parts(format, vec![1, 2, 3, 4]);
        let finished = finalize_for_container(recording.clone()).unwrap();
        assert_eq!(finished, recording);
    }

    #[test]
    fn truncated_float_payload_is_rejected() {
        let format = AudioFormatDescriptor::ieee_float(1, 44100).unwrap();
        let recording = Recording::from_parts(format, vec![0u8; 5]);
        assert_eq!(
            finalize_for_container(recording).unwrap_err(),
            CaptureError::InvalidBufferLength(5)
        );
    }
}

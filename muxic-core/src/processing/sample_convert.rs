//! Float-to-integer PCM conversion.
//!
//! Operates on little-endian byte buffers as delivered by the device, so no
//! device memory is ever reinterpreted in place.

use crate::models::error::CaptureError;

/// Bytes per 32-bit float sample.
const F32_BYTES: usize = 4;

/// Convert interleaved LE `f32` samples to interleaved LE `i16` samples.
///
/// Each sample is clamped to `[-1.0, 1.0]`, scaled by 32767 and truncated
/// toward zero. No dithering. Output length = `input.len() / 2` bytes.
pub fn float32_to_pcm16(input: &[u8]) -> Result<Vec<u8>, CaptureError> {
    if input.len() % F32_BYTES != 0 {
        return Err(CaptureError::InvalidBufferLength(input.len()));
    }

    let sample_count = input.len() / F32_BYTES;
    let mut data = Vec::with_capacity(sample_count * 2);
    for group in input.chunks_exact(F32_BYTES) {
        let sample = f32::from_le_bytes([group[0], group[1], group[2], group[3]]);
        data.extend_from_slice(&float_to_i16(sample).to_le_bytes());
    }
    Ok(data)
}

/// NaN maps to 0 (saturating `as` cast).
fn float_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(samples: &[f32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn ints(pcm: &[u8]) -> Vec<i16> {
        pcm.chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    #[test]
    fn full_scale_maps_to_i16_max() {
        let pcm = float32_to_pcm16(&floats(&[0.0, 1.0, -1.0])).unwrap();
        assert_eq!(pcm.len(), 6);
        // -1.0 maps to -32767, never -32768
        assert_eq!(ints(&pcm), vec![0, i16::MAX, -i16::MAX]);
    }

    #[test]
    fn out_of_range_is_clamped() {
        let pcm = float32_to_pcm16(&floats(&[2.0, -2.0, 1.0001, f32::INFINITY])).unwrap();
        assert_eq!(ints(&pcm), vec![32767, -32767, 32767, 32767]);
    }

    #[test]
    fn truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5
        let pcm = float32_to_pcm16(&floats(&[0.5, -0.5, 0.99999])).unwrap();
        assert_eq!(ints(&pcm), vec![16383, -16383, 32766]);
    }

    #[test]
    fn nan_becomes_silence() {
        let pcm = float32_to_pcm16(&floats(&[f32::NAN])).unwrap();
        assert_eq!(ints(&pcm), vec![0]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(float32_to_pcm16(&[]).unwrap().is_empty());
    }

    #[test]
    fn rejects_partial_sample() {
        let err = float32_to_pcm16(&[0u8; 6]).unwrap_err();
        assert_eq!(err, CaptureError::InvalidBufferLength(6));
    }

    #[test]
    fn output_is_little_endian() {
        let pcm = float32_to_pcm16(&floats(&[1.0])).unwrap();
        assert_eq!(pcm, vec![0xFF, 0x7F]);
    }
}

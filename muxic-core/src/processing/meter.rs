/// Peak amplitude of a raw PCM chunk, for the live level indicator.
///
/// 16-bit samples are normalized by 32768; 32-bit samples are read as
/// IEEE floats and used as-is. Any other bit depth reports 0.0. A trailing
/// partial sample is ignored.
pub fn peak_amplitude(data: &[u8], bits_per_sample: u16) -> f32 {
    match bits_per_sample {
        16 => data
            .chunks_exact(2)
            .map(|b| (i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0).abs())
            .fold(0.0f32, f32::max),
        32 => data
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]).abs())
            .fold(0.0f32, f32::max),
        _ => 0.0,
    }
}

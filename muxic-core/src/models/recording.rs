use super::error::CaptureError;
use super::format::AudioFormatDescriptor;

/// One poll's worth of interleaved samples, copied out of the device buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    bytes: Vec<u8>,
    frames: u32,
}

impl RawChunk {
    /// Copy `frames * block_align` bytes out of a device-owned slice.
    ///
    /// The device slice is only valid until the buffer is released, so the
    /// chunk never borrows it.
    pub fn copy_from(device_bytes: &[u8], frames: u32, block_align: u16) -> Result<Self, CaptureError> {
        let expected = frames as usize * block_align as usize;
        if device_bytes.len() < expected {
            return Err(CaptureError::MalformedChunk {
                expected,
                actual: device_bytes.len(),
            });
        }
        Ok(Self {
            bytes: device_bytes[..expected].to_vec(),
            frames,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Audio accumulated over one capture session.
///
/// Grows only by appending whole chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    format: AudioFormatDescriptor,
    data: Vec<u8>,
}

impl Recording {
    pub fn new(format: AudioFormatDescriptor) -> Self {
        Self {
            format,
            data: Vec::new(),
        }
    }

    /// Wrap an existing payload, e.g. after sample conversion.
    pub fn from_parts(format: AudioFormatDescriptor, data: Vec<u8>) -> Self {
        Self { format, data }
    }

    pub fn append(&mut self, chunk: RawChunk) {
        self.data.extend_from_slice(&chunk.bytes);
    }

    pub fn format(&self) -> &AudioFormatDescriptor {
        &self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn frames(&self) -> u64 {
        (self.data.len() / self.format.block_align() as usize) as u64
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.format.sample_rate())
    }

    pub fn into_parts(self) -> (AudioFormatDescriptor, Vec<u8>) {
        (self.format, self.data)
    }
}

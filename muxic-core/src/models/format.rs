use std::fmt;

use super::error::CaptureError;

/// `WAVE_FORMAT_PCM`
pub const WAVE_FORMAT_PCM: u16 = 0x0001;
/// `WAVE_FORMAT_IEEE_FLOAT`
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
/// `WAVE_FORMAT_EXTENSIBLE`
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Size of the `WAVEFORMATEXTENSIBLE` tail that follows the basic fields:
/// valid bits (2) + channel mask (4) + sub-format GUID (16).
pub const EXTENSION_SIZE: usize = 22;

/// Format tag of a WAV `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Pcm,
    IeeeFloat,
    Extensible,
    Other(u16),
}

impl FormatTag {
    pub fn from_raw(tag: u16) -> Self {
        match tag {
            WAVE_FORMAT_PCM => Self::Pcm,
            WAVE_FORMAT_IEEE_FLOAT => Self::IeeeFloat,
            WAVE_FORMAT_EXTENSIBLE => Self::Extensible,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Self::Pcm => WAVE_FORMAT_PCM,
            Self::IeeeFloat => WAVE_FORMAT_IEEE_FLOAT,
            Self::Extensible => WAVE_FORMAT_EXTENSIBLE,
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pcm => f.write_str("PCM"),
            Self::IeeeFloat => f.write_str("IEEE float"),
            Self::Extensible => f.write_str("extensible"),
            Self::Other(tag) => write!(f, "0x{tag:04X}"),
        }
    }
}

/// Opaque extensible-format tail, carried verbatim from negotiation to encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatExtension([u8; EXTENSION_SIZE]);

impl FormatExtension {
    pub fn new(bytes: [u8; EXTENSION_SIZE]) -> Self {
        Self(bytes)
    }

    /// Copy the tail out of a device-provided slice. Extra trailing bytes are
    /// rejected rather than silently dropped.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CaptureError> {
        let tail: [u8; EXTENSION_SIZE] = bytes.try_into().map_err(|_| {
            CaptureError::InvalidFormat(format!(
                "extensible tail must be {EXTENSION_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(tail))
    }

    pub fn as_bytes(&self) -> &[u8; EXTENSION_SIZE] {
        &self.0
    }
}

/// Immutable description of an interleaved PCM stream.
///
/// Invariants, checked at construction:
/// - `block_align == channels * bits_per_sample / 8`
/// - `avg_bytes_per_sec == sample_rate * block_align`
/// - an extension is present iff the tag is `Extensible`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormatDescriptor {
    tag: FormatTag,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    block_align: u16,
    avg_bytes_per_sec: u32,
    extension: Option<FormatExtension>,
}

impl AudioFormatDescriptor {
    /// Integer PCM.
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Result<Self, CaptureError> {
        Self::derived(FormatTag::Pcm, channels, sample_rate, bits_per_sample, None)
    }

    /// 32-bit IEEE float.
    pub fn ieee_float(channels: u16, sample_rate: u32) -> Result<Self, CaptureError> {
        Self::derived(FormatTag::IeeeFloat, channels, sample_rate, 32, None)
    }

    /// `WAVE_FORMAT_EXTENSIBLE` with its opaque tail.
    pub fn extensible(
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        extension: FormatExtension,
    ) -> Result<Self, CaptureError> {
        Self::derived(
            FormatTag::Extensible,
            channels,
            sample_rate,
            bits_per_sample,
            Some(extension),
        )
    }

    /// Build from every field as reported by a device or read from a file.
    ///
    /// The derived fields are validated, not recomputed.
    pub fn from_parts(
        tag: FormatTag,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        block_align: u16,
        avg_bytes_per_sec: u32,
        extension: Option<FormatExtension>,
    ) -> Result<Self, CaptureError> {
        let expected = Self::derived(tag, channels, sample_rate, bits_per_sample, extension)?;
        if expected.block_align != block_align {
            return Err(CaptureError::InvalidFormat(format!(
                "block align {block_align} does not match {channels} channels of {bits_per_sample} bits"
            )));
        }
        if expected.avg_bytes_per_sec != avg_bytes_per_sec {
            return Err(CaptureError::InvalidFormat(format!(
                "byte rate {avg_bytes_per_sec} does not match {sample_rate} Hz x {block_align} bytes"
            )));
        }
        Ok(expected)
    }

    fn derived(
        tag: FormatTag,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        extension: Option<FormatExtension>,
    ) -> Result<Self, CaptureError> {
        if channels == 0 {
            return Err(CaptureError::InvalidFormat("channel count must be positive".into()));
        }
        if sample_rate == 0 {
            return Err(CaptureError::InvalidFormat("sample rate must be positive".into()));
        }
        if bits_per_sample == 0 || bits_per_sample % 8 != 0 {
            return Err(CaptureError::InvalidFormat(format!(
                "unsupported bit depth: {bits_per_sample}"
            )));
        }
        match (tag, extension.is_some()) {
            (FormatTag::Extensible, false) => {
                return Err(CaptureError::InvalidFormat(
                    "extensible format requires its extension bytes".into(),
                ))
            }
            (FormatTag::Extensible, true) | (_, false) => {}
            (_, true) => {
                return Err(CaptureError::InvalidFormat(format!(
                    "{tag} format cannot carry extension bytes"
                )))
            }
        }

        let block_align = u32::from(channels) * u32::from(bits_per_sample / 8);
        let block_align = u16::try_from(block_align).map_err(|_| {
            CaptureError::InvalidFormat(format!("block align {block_align} overflows u16"))
        })?;
        let avg_bytes_per_sec = sample_rate
            .checked_mul(u32::from(block_align))
            .ok_or_else(|| CaptureError::InvalidFormat("byte rate overflows u32".into()))?;

        Ok(Self {
            tag,
            channels,
            sample_rate,
            bits_per_sample,
            block_align,
            avg_bytes_per_sec,
            extension,
        })
    }

    pub fn tag(&self) -> FormatTag {
        self.tag
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Bytes per interleaved frame.
    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    pub fn avg_bytes_per_sec(&self) -> u32 {
        self.avg_bytes_per_sec
    }

    pub fn extension(&self) -> Option<&FormatExtension> {
        self.extension.as_ref()
    }

    /// Whether samples are 32-bit IEEE floats.
    ///
    /// The extensible sub-format GUID is opaque, so a 32-bit extensible
    /// stream is assumed to be float, as shared-mode mix formats are.
    pub fn is_float32(&self) -> bool {
        self.bits_per_sample == 32 && matches!(self.tag, FormatTag::IeeeFloat | FormatTag::Extensible)
    }

    /// The 16-bit PCM equivalent of this stream (same channels and rate).
    pub fn to_pcm16(&self) -> Result<Self, CaptureError> {
        Self::pcm(self.channels, self.sample_rate, 16)
    }
}

impl fmt::Display for AudioFormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} channels, {} bits",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}

//! WAV container encoding and parsing.
//!
//! All multi-byte fields are written with `to_le_bytes`, so the output is
//! identical on any host.
//!
//! Standard layout (44-byte header):
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    36 + fmt extra + data_size
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16, or 40 for WAVE_FORMAT_EXTENSIBLE
//! [20-21]  format tag
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  avg bytes per second
//! [32-33]  block_align
//! [34-35]  bits_per_sample
//!          (extensible only: cbSize = 22, then 22 opaque tail bytes)
//! [..]     "data", data_size, payload
//! ```

use std::io::{self, Read, Seek, SeekFrom};

use crate::models::error::CaptureError;
use crate::models::format::{AudioFormatDescriptor, FormatExtension, FormatTag, EXTENSION_SIZE};

/// `fmt ` chunk size for PCM and float tags.
pub const FMT_CHUNK_SIZE: u32 = 16;
/// `fmt ` chunk size for `WAVE_FORMAT_EXTENSIBLE`: 16 + cbSize field + tail.
pub const FMT_CHUNK_SIZE_EXTENSIBLE: u32 = FMT_CHUNK_SIZE + 2 + EXTENSION_SIZE as u32;

/// Size of the header in front of the payload for `format`.
pub fn header_len(format: &AudioFormatDescriptor) -> usize {
    12 + 8 + fmt_chunk_size(format) as usize + 8
}

fn fmt_chunk_size(format: &AudioFormatDescriptor) -> u32 {
    if format.extension().is_some() {
        FMT_CHUNK_SIZE_EXTENSIBLE
    } else {
        FMT_CHUNK_SIZE
    }
}

/// Encode a complete WAV file in memory.
///
/// Fails only when the payload cannot be described by the 32-bit RIFF size
/// fields.
pub fn encode_wav(format: &AudioFormatDescriptor, payload: &[u8]) -> Result<Vec<u8>, CaptureError> {
    let fmt_size = fmt_chunk_size(format);
    let data_size =
        u32::try_from(payload.len()).map_err(|_| CaptureError::InvalidBufferLength(payload.len()))?;
    let riff_size = (4 + 8 + fmt_size + 8)
        .checked_add(data_size)
        .ok_or(CaptureError::InvalidBufferLength(payload.len()))?;

    let mut buf = Vec::with_capacity(header_len(format) + payload.len());

    // RIFF chunk descriptor
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&riff_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&fmt_size.to_le_bytes());
    buf.extend_from_slice(&format.tag().raw().to_le_bytes());
    buf.extend_from_slice(&format.channels().to_le_bytes());
    buf.extend_from_slice(&format.sample_rate().to_le_bytes());
    buf.extend_from_slice(&format.avg_bytes_per_sec().to_le_bytes());
    buf.extend_from_slice(&format.block_align().to_le_bytes());
    buf.extend_from_slice(&format.bits_per_sample().to_le_bytes());
    if let Some(extension) = format.extension() {
        buf.extend_from_slice(&(EXTENSION_SIZE as u16).to_le_bytes());
        buf.extend_from_slice(extension.as_bytes());
    }

    // data sub-chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    buf.extend_from_slice(payload);

    Ok(buf)
}

/// A parsed WAV file borrowing its payload from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWav<'a> {
    pub format: AudioFormatDescriptor,
    pub data: &'a [u8],
}

/// Parse a WAV file produced by [`encode_wav`] or any RIFF/WAVE writer.
///
/// Unknown chunks are skipped (honoring the RIFF pad byte). The `data`
/// chunk must be complete.
pub fn parse_wav(bytes: &[u8]) -> Result<ParsedWav<'_>, CaptureError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(CaptureError::InvalidFormat("missing RIFF/WAVE signature".into()));
    }

    let mut format = None;
    let mut data = None;
    let mut offset = 12;

    while offset + 8 <= bytes.len() && (format.is_none() || data.is_none()) {
        let id = &bytes[offset..offset + 4];
        let size = read_u32(bytes, offset + 4) as usize;
        let body_start = offset + 8;
        let body_end = body_start
            .checked_add(size)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                CaptureError::InvalidFormat(format!(
                    "chunk {:?} runs past end of file",
                    String::from_utf8_lossy(id)
                ))
            })?;
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => format = Some(parse_fmt(body)?),
            b"data" => data = Some(body),
            _ => {}
        }

        offset = body_end + (size & 1);
    }

    match (format, data) {
        (Some(format), Some(data)) => Ok(ParsedWav { format, data }),
        (None, _) => Err(CaptureError::InvalidFormat("no fmt chunk".into())),
        (_, None) => Err(CaptureError::InvalidFormat("no data chunk".into())),
    }
}

/// The format and payload location of a WAV stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub format: AudioFormatDescriptor,
    /// Length declared by the `data` chunk; may exceed what the file holds.
    pub data_len: u32,
    /// Stream offset of the first payload byte.
    pub data_offset: u64,
}

/// Cap on `fmt ` chunk bodies read into memory.
const MAX_FMT_CHUNK: u32 = 1024;

/// Read just the chunk headers of a WAV stream, seeking over chunk bodies.
///
/// Unlike [`parse_wav`] the payload is never loaded, so the `data` chunk
/// may be truncated.
pub fn read_wav_header<R: Read + Seek>(reader: &mut R) -> Result<WavHeader, CaptureError> {
    let mut riff = [0u8; 12];
    read_exact_or(reader, &mut riff, "missing RIFF/WAVE signature")?;
    if &riff[0..4] != b"RIFF" || &riff[8..12] != b"WAVE" {
        return Err(CaptureError::InvalidFormat("missing RIFF/WAVE signature".into()));
    }

    let mut format = None;
    let mut data = None;
    let mut offset = 12u64;

    loop {
        let mut chunk = [0u8; 8];
        let missing = if format.is_none() { "no fmt chunk" } else { "no data chunk" };
        read_exact_or(reader, &mut chunk, missing)?;
        let size = read_u32(&chunk, 4);
        let body_start = offset + 8;
        let next = body_start + size as u64 + (size & 1) as u64;

        match &chunk[0..4] {
            b"fmt " => {
                if size > MAX_FMT_CHUNK {
                    return Err(CaptureError::InvalidFormat(format!("fmt chunk of {size} bytes")));
                }
                let mut body = vec![0u8; size as usize];
                read_exact_or(reader, &mut body, "fmt chunk runs past end of file")?;
                format = Some(parse_fmt(&body)?);
            }
            b"data" => data = Some((size, body_start)),
            _ => {}
        }

        if let (Some(format), Some((data_len, data_offset))) = (&format, data) {
            return Ok(WavHeader {
                format: format.clone(),
                data_len,
                data_offset,
            });
        }
        reader.seek(SeekFrom::Start(next)).map_err(storage_error)?;
        offset = next;
    }
}

fn read_exact_or<R: Read>(reader: &mut R, buf: &mut [u8], missing: &str) -> Result<(), CaptureError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => CaptureError::InvalidFormat(missing.into()),
        _ => storage_error(e),
    })
}

fn storage_error(e: io::Error) -> CaptureError {
    CaptureError::StorageError(e.to_string())
}

fn parse_fmt(body: &[u8]) -> Result<AudioFormatDescriptor, CaptureError> {
    if body.len() < FMT_CHUNK_SIZE as usize {
        return Err(CaptureError::InvalidFormat(format!(
            "fmt chunk is {} bytes, need at least {FMT_CHUNK_SIZE}",
            body.len()
        )));
    }

    let tag = FormatTag::from_raw(read_u16(body, 0));
    let channels = read_u16(body, 2);
    let sample_rate = read_u32(body, 4);
    let avg_bytes_per_sec = read_u32(body, 8);
    let block_align = read_u16(body, 12);
    let bits_per_sample = read_u16(body, 14);

    let extension = if tag == FormatTag::Extensible {
        if body.len() < FMT_CHUNK_SIZE_EXTENSIBLE as usize {
            return Err(CaptureError::InvalidFormat("extensible fmt chunk is truncated".into()));
        }
        let cb_size = read_u16(body, 16) as usize;
        if cb_size != EXTENSION_SIZE {
            return Err(CaptureError::InvalidFormat(format!(
                "extensible cbSize is {cb_size}, expected {EXTENSION_SIZE}"
            )));
        }
        Some(FormatExtension::from_slice(&body[18..18 + EXTENSION_SIZE])?)
    } else {
        None
    };

    AudioFormatDescriptor::from_parts(
        tag,
        channels,
        sample_rate,
        bits_per_sample,
        block_align,
        avg_bytes_per_sec,
        extension,
    )
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

use crate::models::audio_models::AudioSource;
use crate::models::error::CaptureError;
use crate::models::format::AudioFormatDescriptor;

/// A device-owned buffer handed out by [`CaptureSession::poll_buffer`].
///
/// Borrowing the session keeps the slice from outliving the next call on
/// it; callers copy the bytes out before releasing.
#[derive(Debug, Clone, Copy)]
pub struct DeviceBuffer<'a> {
    pub bytes: &'a [u8],
    pub frames: u32,
}

/// Result of one non-blocking poll.
#[derive(Debug)]
pub enum BufferPoll<'a> {
    /// Nothing available yet. Not an error.
    Empty,
    /// Interleaved samples, valid until `release_buffer` is called.
    Chunk(DeviceBuffer<'a>),
    /// The poll failed; no buffer is held.
    Failed(CaptureError),
}

/// An opened capture device.
///
/// Owned and driven by a single thread; no `Send` bound, since platform
/// handles are usually bound to the thread that created them.
pub trait CaptureSession {
    /// Negotiated stream format, available once the session is open.
    fn format(&self) -> &AudioFormatDescriptor;

    /// The endpoint this session was opened on.
    fn source(&self) -> &AudioSource;

    /// Start the device. Transitions the capture loop to capturing.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Non-blocking poll for the next packet.
    fn poll_buffer(&mut self) -> BufferPoll<'_>;

    /// Give the buffer from the last successful poll back to the device.
    ///
    /// Called after every `Empty` or `Chunk` poll, with 0 frames for
    /// `Empty`. Implementations holding no buffer treat it as a no-op.
    fn release_buffer(&mut self, frames: u32) -> Result<(), CaptureError>;

    /// Stop the device. Called exactly once when capture ends.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

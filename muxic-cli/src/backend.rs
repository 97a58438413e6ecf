//! Platform capture backend selection.

use muxic_core::CaptureError;

#[cfg(target_os = "windows")]
pub type Provider = muxic_windows::WasapiProvider;

#[cfg(not(target_os = "windows"))]
pub type Provider = unsupported::UnsupportedProvider;

pub fn provider() -> Result<Provider, CaptureError> {
    #[cfg(target_os = "windows")]
    {
        muxic_windows::WasapiProvider::new()
    }
    #[cfg(not(target_os = "windows"))]
    {
        Ok(unsupported::UnsupportedProvider)
    }
}

#[cfg(not(target_os = "windows"))]
mod unsupported {
    use muxic_core::{
        AudioFormatDescriptor, AudioSource, BufferPoll, CaptureError, CaptureProvider, CaptureSession,
        DeviceSelector,
    };

    const MESSAGE: &str = "audio capture is only available on Windows (WASAPI)";

    /// Lets the catalog commands run anywhere; capture commands fail.
    pub struct UnsupportedProvider;

    pub enum NoSession {}

    impl CaptureProvider for UnsupportedProvider {
        type Session = NoSession;

        fn list_devices(&self) -> Result<Vec<AudioSource>, CaptureError> {
            Err(CaptureError::DeviceNotFound(MESSAGE.into()))
        }

        fn open(&self, _selector: &DeviceSelector) -> Result<NoSession, CaptureError> {
            Err(CaptureError::DeviceNotFound(MESSAGE.into()))
        }
    }

    impl CaptureSession for NoSession {
        fn format(&self) -> &AudioFormatDescriptor {
            match *self {}
        }

        fn source(&self) -> &AudioSource {
            match *self {}
        }

        fn start(&mut self) -> Result<(), CaptureError> {
            match *self {}
        }

        fn poll_buffer(&mut self) -> BufferPoll<'_> {
            match *self {}
        }

        fn release_buffer(&mut self, _frames: u32) -> Result<(), CaptureError> {
            match *self {}
        }

        fn stop(&mut self) -> Result<(), CaptureError> {
            match *self {}
        }
    }
}

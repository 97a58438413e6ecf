use crate::models::audio_models::{AudioSource, DeviceSelector};
use crate::models::error::CaptureError;
use crate::traits::capture_session::CaptureSession;

/// Platform backend that enumerates and opens capture endpoints.
///
/// Implemented by:
/// - `WasapiProvider` (Windows)
pub trait CaptureProvider {
    type Session: CaptureSession;

    /// Active capture endpoints.
    fn list_devices(&self) -> Result<Vec<AudioSource>, CaptureError>;

    /// Open the endpoint picked by `selector`.
    ///
    /// Fails with `DeviceNotFound` when nothing matches.
    fn open(&self, selector: &DeviceSelector) -> Result<Self::Session, CaptureError>;
}

use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use muxic_core::models::error::CaptureError;

/// Keeps COM initialized on the creating thread until dropped.
///
/// Shared through `Rc` by the provider and every session it opens, so COM
/// outlives the last interface pointer. `Rc` also keeps it on one thread.
pub(crate) struct ComGuard;

impl ComGuard {
    pub(crate) fn init() -> Result<Self, CaptureError> {
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(|e| CaptureError::Unknown(format!("CoInitializeEx failed: {}", e)))?;
        }
        log::debug!("COM initialized (MTA)");
        Ok(Self)
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}

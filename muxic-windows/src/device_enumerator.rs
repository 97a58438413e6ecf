//! Capture endpoint enumeration via the MMDevice API.

use windows::core::PWSTR;
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eCapture, eConsole, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator, DEVICE_STATE_ACTIVE,
};
use windows::Win32::System::Com::{CoCreateInstance, CoTaskMemFree, CLSCTX_ALL, STGM_READ};

use muxic_core::models::audio_models::{AudioSource, DeviceSelector};
use muxic_core::models::error::CaptureError;

/// Lists active capture endpoints with their friendly names.
///
/// Requires COM to be initialized on the calling thread.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    pub fn new() -> Result<Self, CaptureError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator = CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                .map_err(|e| CaptureError::Unknown(format!("failed to create enumerator: {}", e)))?;
            Ok(Self { enumerator })
        }
    }

    /// Active capture endpoints in enumeration order.
    pub fn list_capture_devices(&self) -> Result<Vec<AudioSource>, CaptureError> {
        Ok(self.active_endpoints()?.into_iter().map(|(_, source)| source).collect())
    }

    /// The first endpoint `selector` accepts.
    pub fn find(&self, selector: &DeviceSelector) -> Result<(IMMDevice, AudioSource), CaptureError> {
        let endpoints = self.active_endpoints()?;
        if endpoints.is_empty() {
            return Err(CaptureError::DeviceNotFound("no active capture devices".into()));
        }
        endpoints
            .into_iter()
            .find(|(_, source)| selector.matches(source))
            .ok_or_else(|| match selector {
                DeviceSelector::Named(name) => CaptureError::DeviceNotFound(name.clone()),
                DeviceSelector::Default => CaptureError::DeviceNotFound("default capture device".into()),
            })
    }

    fn active_endpoints(&self) -> Result<Vec<(IMMDevice, AudioSource)>, CaptureError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eCapture, DEVICE_STATE_ACTIVE)
                .map_err(|e| CaptureError::Unknown(format!("EnumAudioEndpoints failed: {}", e)))?;

            let count = collection
                .GetCount()
                .map_err(|e| CaptureError::Unknown(format!("GetCount failed: {}", e)))?;

            let default_id = self
                .enumerator
                .GetDefaultAudioEndpoint(eCapture, eConsole)
                .ok()
                .and_then(|d| device_id(&d));

            let mut endpoints = Vec::with_capacity(count as usize);
            for i in 0..count {
                let device = match collection.Item(i) {
                    Ok(d) => d,
                    Err(e) => {
                        log::debug!("Skipping capture endpoint {}: {}", i, e);
                        continue;
                    }
                };
                let Some(id) = device_id(&device) else {
                    continue;
                };
                let name = friendly_name(&device).unwrap_or_else(|| format!("Device {}", i));
                let is_default = default_id.as_deref() == Some(id.as_str());
                endpoints.push((device, AudioSource { id, name, is_default }));
            }
            log::debug!("Found {} active capture endpoints", endpoints.len());
            Ok(endpoints)
        }
    }
}

fn device_id(device: &IMMDevice) -> Option<String> {
    unsafe {
        let raw: PWSTR = device.GetId().ok()?;
        let id = raw.to_string().ok();
        CoTaskMemFree(Some(raw.0 as *const _));
        id
    }
}

/// `PKEY_Device_FriendlyName`, e.g. "Microphone (USB Audio Device)".
fn friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let store = device.OpenPropertyStore(STGM_READ).ok()?;
        let value = store.GetValue(&PKEY_Device_FriendlyName).ok()?;
        let name = value.to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

//! WASAPI shared-mode capture session.
//!
//! Opens a capture endpoint with the device mix format and exposes the
//! `GetBuffer` / `ReleaseBuffer` pair as a non-blocking [`CaptureSession`].
//! No thread is spawned here; the session is driven by whoever owns it.

use std::rc::Rc;

use windows::Win32::Foundation::E_ACCESSDENIED;
use windows::Win32::Media::Audio::{
    IAudioCaptureClient, IAudioClient, AUDCLNT_BUFFERFLAGS_SILENT, AUDCLNT_SHAREMODE_SHARED,
    WAVEFORMATEX,
};
use windows::Win32::System::Com::{CoTaskMemFree, CLSCTX_ALL};

use muxic_core::models::audio_models::{AudioSource, DeviceSelector};
use muxic_core::models::error::CaptureError;
use muxic_core::models::format::{AudioFormatDescriptor, FormatExtension, FormatTag, EXTENSION_SIZE};
use muxic_core::traits::capture_provider::CaptureProvider;
use muxic_core::traits::capture_session::{BufferPoll, CaptureSession, DeviceBuffer};

use crate::com::ComGuard;
use crate::device_enumerator::DeviceEnumerator;

/// Shared-mode buffer duration in 100-nanosecond units (1 s).
const BUFFER_DURATION_HNS: i64 = 10_000_000;

/// Opens WASAPI capture endpoints on the calling thread.
pub struct WasapiProvider {
    com: Rc<ComGuard>,
}

impl WasapiProvider {
    /// Initialize COM on this thread for the provider and its sessions.
    pub fn new() -> Result<Self, CaptureError> {
        Ok(Self {
            com: Rc::new(ComGuard::init()?),
        })
    }
}

impl CaptureProvider for WasapiProvider {
    type Session = WasapiCaptureSession;

    fn list_devices(&self) -> Result<Vec<AudioSource>, CaptureError> {
        DeviceEnumerator::new()?.list_capture_devices()
    }

    /// Sequence:
    /// 1. Pick the endpoint (exact friendly name, or the first active one)
    /// 2. Activate IAudioClient
    /// 3. Copy the mix format, extension tail included
    /// 4. Initialize in shared mode with the mix format
    /// 5. Get the IAudioCaptureClient service
    fn open(&self, selector: &DeviceSelector) -> Result<WasapiCaptureSession, CaptureError> {
        let (device, source) = DeviceEnumerator::new()?.find(selector)?;
        log::info!("Opening capture device \"{}\"", source.name);

        unsafe {
            let audio_client: IAudioClient = device.Activate(CLSCTX_ALL, None).map_err(|e| {
                if e.code() == E_ACCESSDENIED {
                    CaptureError::PermissionDenied
                } else {
                    CaptureError::ConfigurationFailed(format!("Activate failed: {}", e))
                }
            })?;

            let mix_format_ptr = audio_client
                .GetMixFormat()
                .map_err(|e| CaptureError::ConfigurationFailed(format!("GetMixFormat failed: {}", e)))?;

            let format = descriptor_from_mix_format(mix_format_ptr);
            let initialized = match format {
                Ok(_) => audio_client
                    .Initialize(AUDCLNT_SHAREMODE_SHARED, 0, BUFFER_DURATION_HNS, 0, mix_format_ptr, None)
                    .map_err(|e| {
                        CaptureError::ConfigurationFailed(format!("IAudioClient::Initialize failed: {}", e))
                    }),
                Err(_) => Ok(()),
            };
            CoTaskMemFree(Some(mix_format_ptr as *const _));
            let format = format?;
            initialized?;

            let capture_client: IAudioCaptureClient = audio_client
                .GetService()
                .map_err(|e| CaptureError::ConfigurationFailed(format!("GetService failed: {}", e)))?;

            log::info!("Device mix format: {} ({})", format, format.tag());
            Ok(WasapiCaptureSession {
                audio_client,
                capture_client,
                format,
                source,
                held_frames: None,
                silence: Vec::new(),
                _com: Rc::clone(&self.com),
            })
        }
    }
}

/// An initialized WASAPI capture stream.
pub struct WasapiCaptureSession {
    audio_client: IAudioClient,
    capture_client: IAudioCaptureClient,
    format: AudioFormatDescriptor,
    source: AudioSource,
    /// Frames of the buffer obtained by the last `GetBuffer`, until released.
    held_frames: Option<u32>,
    silence: Vec<u8>,
    // Dropped last, after the interface pointers above.
    _com: Rc<ComGuard>,
}

impl CaptureSession for WasapiCaptureSession {
    fn format(&self) -> &AudioFormatDescriptor {
        &self.format
    }

    fn source(&self) -> &AudioSource {
        &self.source
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        unsafe {
            self.audio_client
                .Start()
                .map_err(|e| CaptureError::DeviceStartFailure(format!("IAudioClient::Start failed: {}", e)))
        }
    }

    fn poll_buffer(&mut self) -> BufferPoll<'_> {
        let mut data: *mut u8 = std::ptr::null_mut();
        let mut frames: u32 = 0;
        let mut flags: u32 = 0;

        unsafe {
            if let Err(e) = self
                .capture_client
                .GetBuffer(&mut data, &mut frames, &mut flags, None, None)
            {
                return BufferPoll::Failed(CaptureError::TransientPollFailure(format!(
                    "GetBuffer failed: {}",
                    e
                )));
            }

            // AUDCLNT_S_BUFFER_EMPTY succeeds with zero frames and holds nothing.
            if frames == 0 {
                return BufferPoll::Empty;
            }
            self.held_frames = Some(frames);

            let len = frames as usize * self.format.block_align() as usize;
            let bytes: &[u8] = if flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0 || data.is_null() {
                self.silence.clear();
                self.silence.resize(len, 0);
                &self.silence
            } else {
                std::slice::from_raw_parts(data, len)
            };
            BufferPoll::Chunk(DeviceBuffer { bytes, frames })
        }
    }

    fn release_buffer(&mut self, frames: u32) -> Result<(), CaptureError> {
        let Some(held) = self.held_frames.take() else {
            return Ok(());
        };
        if held != frames {
            log::debug!("Releasing {} frames, device handed out {}", frames, held);
        }
        unsafe {
            self.capture_client
                .ReleaseBuffer(frames)
                .map_err(|e| CaptureError::TransientPollFailure(format!("ReleaseBuffer failed: {}", e)))
        }
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        unsafe {
            self.audio_client
                .Stop()
                .map_err(|e| CaptureError::Unknown(format!("IAudioClient::Stop failed: {}", e)))
        }
    }
}

/// Copy a device-owned `WAVEFORMATEX` (plus its extensible tail) into a
/// descriptor. The struct is packed, so every field is read unaligned.
unsafe fn descriptor_from_mix_format(ptr: *const WAVEFORMATEX) -> Result<AudioFormatDescriptor, CaptureError> {
    if ptr.is_null() {
        return Err(CaptureError::InvalidFormat("device returned no mix format".into()));
    }
    let header = std::ptr::read_unaligned(ptr);
    let tag = FormatTag::from_raw(header.wFormatTag);

    let extension = if tag == FormatTag::Extensible {
        let cb_size = header.cbSize as usize;
        if cb_size < EXTENSION_SIZE {
            return Err(CaptureError::InvalidFormat(format!(
                "extensible mix format carries {} extension bytes, expected {}",
                cb_size, EXTENSION_SIZE
            )));
        }
        let tail = (ptr as *const u8).add(std::mem::size_of::<WAVEFORMATEX>());
        Some(FormatExtension::from_slice(std::slice::from_raw_parts(tail, EXTENSION_SIZE))?)
    } else {
        None
    };

    AudioFormatDescriptor::from_parts(
        tag,
        header.nChannels,
        header.nSamplesPerSec,
        header.wBitsPerSample,
        header.nBlockAlign,
        header.nAvgBytesPerSec,
        extension,
    )
}

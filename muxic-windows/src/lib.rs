//! # muxic-windows
//!
//! Windows WASAPI backend for muxic.
//!
//! Provides:
//! - `WasapiProvider`: enumerates capture endpoints and opens sessions
//! - `WasapiCaptureSession`: shared-mode capture driven by `GetBuffer` / `ReleaseBuffer`
//! - `DeviceEnumerator`: capture endpoint listing via the MMDevice API
//!
//! The provider initializes COM on the thread that creates it; keep the
//! provider and its sessions on that thread.
//!
//! ## Usage
//! ```ignore
//! use muxic_core::{CaptureLoop, CaptureLoopConfig, CaptureProvider, DeviceSelector, StopSignal};
//! use muxic_windows::WasapiProvider;
//!
//! let provider = WasapiProvider::new()?;
//! let session = provider.open(&DeviceSelector::Default)?;
//! let mut capture = CaptureLoop::new(session, CaptureLoopConfig::default())?;
//! capture.arm(|| Ok(()))?;
//! let outcome = capture.run(&StopSignal::new())?;
//! ```

#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod wasapi_capture;

#[cfg(target_os = "windows")]
pub use device_enumerator::DeviceEnumerator;
#[cfg(target_os = "windows")]
pub use wasapi_capture::{WasapiCaptureSession, WasapiProvider};

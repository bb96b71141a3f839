//! Device-level pieces of the capture boundary: the microphone
//! permission probe and a fallback backend for machines without a
//! recognition capability.

use super::{CaptureFailure, RecognizerBackend};
use std::sync::atomic::AtomicBool;

/// Probe the default audio-input device.
///
/// Opening the default input config is the closest portable equivalent
/// of a microphone-permission check: it fails when no device exists and
/// when the OS denies access. The device is released immediately; the
/// probe never records.
#[cfg(feature = "audio-io")]
pub fn microphone_probe() -> Result<(), CaptureFailure> {
    use cpal::traits::{DeviceTrait, HostTrait};

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(CaptureFailure::NotSupported)?;

    device
        .default_input_config()
        .map(|_| ())
        .map_err(|_| CaptureFailure::PermissionDenied)
}

/// Backend that owns the microphone probe but bundles no recognition
/// engine. A successful probe still ends in `NotSupported`, so the
/// distinction the user sees is between a missing or denied microphone
/// and a missing engine. A speech engine plugs in by replacing this
/// backend.
#[cfg(feature = "audio-io")]
pub struct MicrophoneRecognizer;

#[cfg(feature = "audio-io")]
impl RecognizerBackend for MicrophoneRecognizer {
    fn check_permission(&mut self) -> Result<(), CaptureFailure> {
        microphone_probe()
    }

    fn recognize(
        &mut self,
        _locale_tag: &str,
        _abort: &AtomicBool,
    ) -> Result<String, CaptureFailure> {
        Err(CaptureFailure::NotSupported)
    }
}

/// Backend for devices without any speech-recognition capability.
///
/// Every activation fails with `NotSupported`; the session surfaces the
/// localized capability error and stays usable for photo submissions.
pub struct UnsupportedRecognizer;

impl RecognizerBackend for UnsupportedRecognizer {
    fn check_permission(&mut self) -> Result<(), CaptureFailure> {
        Err(CaptureFailure::NotSupported)
    }

    fn recognize(
        &mut self,
        _locale_tag: &str,
        _abort: &AtomicBool,
    ) -> Result<String, CaptureFailure> {
        Err(CaptureFailure::NotSupported)
    }
}

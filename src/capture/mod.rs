//! Capture controller wrapping the device's speech-to-text capability.
//!
//! Recognition is single-shot: one activation captures one utterance,
//! emits exactly one terminal event and self-terminates. The controller
//! runs the (blocking) device backend on a worker thread and talks to the
//! session orchestrator over bounded channels.

mod device;

#[cfg(feature = "audio-io")]
pub use device::{microphone_probe, MicrophoneRecognizer};
pub use device::UnsupportedRecognizer;

use crate::{Capability, MazraError, Result};
use crate::locale::Locale;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Ways a single capture activation can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureFailure {
    /// Speech recognition is not available on this device.
    NotSupported,
    /// The microphone permission probe failed.
    PermissionDenied,
    /// The activation ended without hearing any speech.
    NoSpeechDetected,
    /// The recognition service could not be reached.
    NetworkError(String),
    /// The activation was stopped before producing a result.
    Aborted,
}

impl From<CaptureFailure> for MazraError {
    fn from(kind: CaptureFailure) -> Self {
        match kind {
            CaptureFailure::NotSupported => {
                MazraError::CapabilityUnsupported(Capability::SpeechRecognition)
            }
            CaptureFailure::PermissionDenied => MazraError::PermissionDenied,
            CaptureFailure::NoSpeechDetected => MazraError::NoInputDetected,
            CaptureFailure::NetworkError(msg) => MazraError::NetworkError(msg),
            CaptureFailure::Aborted => MazraError::Cancelled,
        }
    }
}

/// The speech-to-text device capability, specified only at this boundary.
///
/// Implementations hold the audio-input device exclusively for the
/// duration of `recognize` and release it on every exit path.
pub trait RecognizerBackend: Send {
    /// Capability and microphone-permission probe. Runs before every
    /// activation, independent of the activation itself.
    fn check_permission(&mut self) -> std::result::Result<(), CaptureFailure>;

    /// Capture one utterance using the given recognition grammar tag and
    /// return its final transcript. Must poll `abort` and return
    /// `Err(Aborted)` promptly once it is set.
    fn recognize(
        &mut self,
        locale_tag: &str,
        abort: &AtomicBool,
    ) -> std::result::Result<String, CaptureFailure>;
}

#[derive(Debug)]
enum CaptureCommand {
    Begin {
        locale_tag: &'static str,
        activation: u64,
    },
    Shutdown,
}

/// Terminal events of a capture activation, tagged with the activation
/// number so late arrivals from a superseded activation can be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Transcript { text: String, activation: u64 },
    Failed { kind: CaptureFailure, activation: u64 },
    Cancelled { activation: u64 },
    Shutdown,
}

/// Orchestrator-side handle to the capture worker.
#[derive(Clone)]
pub struct CaptureHandle {
    command_tx: Sender<CaptureCommand>,
    event_rx: Receiver<CaptureEvent>,
    abort: Arc<AtomicBool>,
}

impl CaptureHandle {
    /// Begin a single-shot activation bound to the locale's grammar tag.
    /// Only the worker clears the abort flag, when it dequeues the
    /// command, so a stop aimed at the previous activation stays visible
    /// to it even when the next begin is sent immediately.
    pub fn begin(&self, locale: Locale, activation: u64) -> Result<()> {
        self.command_tx
            .send(CaptureCommand::Begin {
                locale_tag: locale.bcp47(),
                activation,
            })
            .map_err(|e| MazraError::ChannelError(format!("capture command: {}", e)))
    }

    /// Stop the in-flight activation, releasing the input device.
    /// Idempotent; a no-op when nothing is active.
    pub fn end(&self) {
        self.abort.store(true, Ordering::SeqCst);
    }

    pub fn try_recv_event(&self) -> Option<CaptureEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn shutdown(&self) {
        self.abort.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(CaptureCommand::Shutdown);
    }
}

/// Capture controller: owns the backend and its worker thread.
pub struct CaptureController {
    backend: Box<dyn RecognizerBackend>,
    command_rx: Receiver<CaptureCommand>,
    event_tx: Sender<CaptureEvent>,
    handle: CaptureHandle,
}

impl CaptureController {
    pub fn new(backend: Box<dyn RecognizerBackend>) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(16);
        let abort = Arc::new(AtomicBool::new(false));

        let handle = CaptureHandle {
            command_tx,
            event_rx,
            abort,
        };

        Self {
            backend,
            command_rx,
            event_tx,
            handle,
        }
    }

    pub fn handle(&self) -> CaptureHandle {
        self.handle.clone()
    }

    /// Start the worker thread. Consumes the controller; the handle stays
    /// valid for the lifetime of the worker.
    pub fn start_worker(self) -> Result<()> {
        let mut backend = self.backend;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;
        let abort = Arc::clone(&self.handle.abort);

        thread::Builder::new()
            .name("capture".into())
            .spawn(move || {
                info!("capture worker started");

                loop {
                    match command_rx.recv() {
                        Ok(CaptureCommand::Begin {
                            locale_tag,
                            activation,
                        }) => {
                            debug!(activation, locale_tag, "capture activation begins");

                            // The previous recognize has returned by the
                            // time this command is dequeued, so the flag
                            // can no longer be aimed at it.
                            abort.store(false, Ordering::SeqCst);

                            // Permission is probed on every attempt, before
                            // the device is claimed.
                            if let Err(kind) = backend.check_permission() {
                                warn!(activation, ?kind, "microphone probe failed");
                                let _ = event_tx.send(CaptureEvent::Failed { kind, activation });
                                continue;
                            }

                            let event = match backend.recognize(locale_tag, &abort) {
                                Ok(text) => {
                                    debug!(activation, chars = text.len(), "final transcript");
                                    CaptureEvent::Transcript { text, activation }
                                }
                                Err(CaptureFailure::Aborted) => {
                                    debug!(activation, "capture aborted");
                                    CaptureEvent::Cancelled { activation }
                                }
                                Err(kind) => {
                                    warn!(activation, ?kind, "capture failed");
                                    CaptureEvent::Failed { kind, activation }
                                }
                            };
                            let _ = event_tx.send(event);
                        }
                        Ok(CaptureCommand::Shutdown) => {
                            info!("capture worker shutting down");
                            let _ = event_tx.send(CaptureEvent::Shutdown);
                            break;
                        }
                        Err(e) => {
                            warn!("capture command channel closed: {}", e);
                            break;
                        }
                    }
                }

                info!("capture worker stopped");
            })
            .map_err(|e| MazraError::ChannelError(format!("spawn capture worker: {}", e)))?;

        Ok(())
    }
}

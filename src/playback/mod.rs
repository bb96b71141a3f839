//! Playback controller wrapping the device's text-to-speech capability.
//!
//! At most one utterance is audible at a time: a new `speak` interrupts
//! the one in flight instead of queueing behind it, and `cancel` is an
//! idempotent no-op while idle. The blocking device backend runs on a
//! worker thread, mirroring the capture side.

mod voice;

pub use voice::{select_voice, Voice};

use crate::locale::Locale;
use crate::{Capability, MazraError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Ways a single utterance can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackFailure {
    /// Speech synthesis is not available on this device.
    NotSupported,
    /// The utterance was interrupted before finishing.
    Interrupted,
    /// The synthesis engine reported an error mid-utterance.
    Device(String),
}

impl From<PlaybackFailure> for MazraError {
    fn from(kind: PlaybackFailure) -> Self {
        match kind {
            PlaybackFailure::NotSupported => {
                MazraError::CapabilityUnsupported(Capability::SpeechSynthesis)
            }
            PlaybackFailure::Interrupted => MazraError::Cancelled,
            PlaybackFailure::Device(msg) => MazraError::PlaybackFailed(msg),
        }
    }
}

/// The text-to-speech device capability, specified only at this boundary.
pub trait SynthesizerBackend: Send {
    /// Enumerate available voices. The list may be populated
    /// asynchronously by the device and can legitimately be empty on the
    /// first query, so it is re-queried per utterance.
    fn voices(&mut self) -> Vec<Voice>;

    /// Speak one utterance to completion. The utterance always carries
    /// `locale_tag`; `voice` is `None` when the policy fell back to the
    /// device default. Must poll `interrupt` and return
    /// `Err(Interrupted)` promptly once it is set.
    fn speak(
        &mut self,
        text: &str,
        voice: Option<&Voice>,
        locale_tag: &str,
        interrupt: &AtomicBool,
    ) -> std::result::Result<(), PlaybackFailure>;
}

enum PlaybackCommand {
    Speak {
        text: String,
        locale: Locale,
        activation: u64,
    },
    Shutdown,
}

/// Utterance lifecycle events, tagged with the activation number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started { activation: u64 },
    Finished { activation: u64 },
    Cancelled { activation: u64 },
    Failed { kind: PlaybackFailure, activation: u64 },
    Shutdown,
}

/// Orchestrator-side handle to the playback worker.
#[derive(Clone)]
pub struct PlaybackHandle {
    command_tx: Sender<PlaybackCommand>,
    event_rx: Receiver<PlaybackEvent>,
    interrupt: Arc<AtomicBool>,
}

impl PlaybackHandle {
    /// Speak `text` in the given locale. Interrupts any utterance still
    /// in flight; the worker clears the interrupt flag when it picks the
    /// new utterance up.
    pub fn speak(&self, text: String, locale: Locale, activation: u64) -> Result<()> {
        self.interrupt.store(true, Ordering::SeqCst);
        self.command_tx
            .send(PlaybackCommand::Speak {
                text,
                locale,
                activation,
            })
            .map_err(|e| MazraError::ChannelError(format!("playback command: {}", e)))
    }

    /// Cancel the current utterance. Idempotent; a no-op while idle.
    pub fn cancel(&self) {
        self.interrupt.store(true, Ordering::SeqCst);
    }

    pub fn try_recv_event(&self) -> Option<PlaybackEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn shutdown(&self) {
        self.interrupt.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(PlaybackCommand::Shutdown);
    }
}

/// Playback controller: owns the backend and its worker thread.
pub struct PlaybackController {
    backend: Box<dyn SynthesizerBackend>,
    command_rx: Receiver<PlaybackCommand>,
    event_tx: Sender<PlaybackEvent>,
    handle: PlaybackHandle,
}

impl PlaybackController {
    pub fn new(backend: Box<dyn SynthesizerBackend>) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(16);
        let interrupt = Arc::new(AtomicBool::new(false));

        let handle = PlaybackHandle {
            command_tx,
            event_rx,
            interrupt,
        };

        Self {
            backend,
            command_rx,
            event_tx,
            handle,
        }
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle.clone()
    }

    pub fn start_worker(self) -> Result<()> {
        let mut backend = self.backend;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;
        let interrupt = Arc::clone(&self.handle.interrupt);

        thread::Builder::new()
            .name("playback".into())
            .spawn(move || {
                info!("playback worker started");

                loop {
                    match command_rx.recv() {
                        Ok(PlaybackCommand::Speak {
                            text,
                            locale,
                            activation,
                        }) => {
                            // Only the worker clears the flag, so an
                            // interrupt raised against a previous
                            // utterance cannot leak into this one.
                            interrupt.store(false, Ordering::SeqCst);

                            let voices = backend.voices();
                            let voice = select_voice(&voices, locale).cloned();
                            debug!(
                                activation,
                                locale = locale.bcp47(),
                                voice = voice.as_ref().map(|v| v.name.as_str()),
                                "utterance begins"
                            );

                            let _ = event_tx.send(PlaybackEvent::Started { activation });

                            let event = match backend.speak(
                                &text,
                                voice.as_ref(),
                                locale.bcp47(),
                                &interrupt,
                            ) {
                                Ok(()) => PlaybackEvent::Finished { activation },
                                Err(PlaybackFailure::Interrupted) => {
                                    debug!(activation, "utterance interrupted");
                                    PlaybackEvent::Cancelled { activation }
                                }
                                Err(kind) => {
                                    warn!(activation, ?kind, "utterance failed");
                                    PlaybackEvent::Failed { kind, activation }
                                }
                            };
                            let _ = event_tx.send(event);
                        }
                        Ok(PlaybackCommand::Shutdown) => {
                            info!("playback worker shutting down");
                            let _ = event_tx.send(PlaybackEvent::Shutdown);
                            break;
                        }
                        Err(e) => {
                            warn!("playback command channel closed: {}", e);
                            break;
                        }
                    }
                }

                info!("playback worker stopped");
            })
            .map_err(|e| MazraError::ChannelError(format!("spawn playback worker: {}", e)))?;

        Ok(())
    }
}

/// Backend for devices without any speech-synthesis capability.
pub struct UnsupportedSynthesizer;

impl SynthesizerBackend for UnsupportedSynthesizer {
    fn voices(&mut self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(
        &mut self,
        _text: &str,
        _voice: Option<&Voice>,
        _locale_tag: &str,
        _interrupt: &AtomicBool,
    ) -> std::result::Result<(), PlaybackFailure> {
        Err(PlaybackFailure::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct ScriptedSynthesizer {
        voices: Vec<Voice>,
        outcome: std::result::Result<(), PlaybackFailure>,
        spoken: Sender<(String, Option<String>, String)>,
    }

    impl SynthesizerBackend for ScriptedSynthesizer {
        fn voices(&mut self) -> Vec<Voice> {
            self.voices.clone()
        }

        fn speak(
            &mut self,
            text: &str,
            voice: Option<&Voice>,
            locale_tag: &str,
            interrupt: &AtomicBool,
        ) -> std::result::Result<(), PlaybackFailure> {
            if interrupt.load(Ordering::SeqCst) {
                return Err(PlaybackFailure::Interrupted);
            }
            let _ = self.spoken.send((
                text.to_string(),
                voice.map(|v| v.id.clone()),
                locale_tag.to_string(),
            ));
            self.outcome.clone()
        }
    }

    fn recv_event(handle: &PlaybackHandle) -> PlaybackEvent {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(event) = handle.try_recv_event() {
                return event;
            }
            assert!(std::time::Instant::now() < deadline, "no playback event");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_utterance_lifecycle() {
        let (spoken_tx, spoken_rx) = bounded(4);
        let controller = PlaybackController::new(Box::new(ScriptedSynthesizer {
            voices: vec![Voice::new("majed", "Majed", "ar-SA")],
            outcome: Ok(()),
            spoken: spoken_tx,
        }));
        let handle = controller.handle();
        controller.start_worker().unwrap();

        handle
            .speak("مرحبا".to_string(), Locale::Ar, 5)
            .unwrap();

        assert_eq!(recv_event(&handle), PlaybackEvent::Started { activation: 5 });
        assert_eq!(recv_event(&handle), PlaybackEvent::Finished { activation: 5 });

        let (text, voice_id, tag) = spoken_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(text, "مرحبا");
        assert_eq!(voice_id.as_deref(), Some("majed"));
        assert_eq!(tag, "ar-SA");
        handle.shutdown();
    }

    #[test]
    fn test_locale_tag_set_even_without_matching_voice() {
        let (spoken_tx, spoken_rx) = bounded(4);
        let controller = PlaybackController::new(Box::new(ScriptedSynthesizer {
            voices: Vec::new(),
            outcome: Ok(()),
            spoken: spoken_tx,
        }));
        let handle = controller.handle();
        controller.start_worker().unwrap();

        handle.speak("hello".to_string(), Locale::En, 1).unwrap();
        recv_event(&handle);
        recv_event(&handle);

        let (_, voice_id, tag) = spoken_rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(voice_id, None);
        assert_eq!(tag, "en-US");
        handle.shutdown();
    }

    #[test]
    fn test_failure_emits_failed_event() {
        let (spoken_tx, _spoken_rx) = bounded(4);
        let controller = PlaybackController::new(Box::new(ScriptedSynthesizer {
            voices: Vec::new(),
            outcome: Err(PlaybackFailure::Device("engine died".to_string())),
            spoken: spoken_tx,
        }));
        let handle = controller.handle();
        controller.start_worker().unwrap();

        handle.speak("hello".to_string(), Locale::En, 2).unwrap();
        assert_eq!(recv_event(&handle), PlaybackEvent::Started { activation: 2 });
        assert_eq!(
            recv_event(&handle),
            PlaybackEvent::Failed {
                kind: PlaybackFailure::Device("engine died".to_string()),
                activation: 2
            }
        );
        handle.shutdown();
    }

    #[test]
    fn test_failure_kinds_map_to_error_taxonomy() {
        assert_eq!(
            MazraError::from(PlaybackFailure::NotSupported),
            MazraError::CapabilityUnsupported(Capability::SpeechSynthesis)
        );
        assert_eq!(
            MazraError::from(PlaybackFailure::Interrupted),
            MazraError::Cancelled
        );
        // An engine error mid-utterance is not a missing capability.
        assert_eq!(
            MazraError::from(PlaybackFailure::Device("engine died".to_string())),
            MazraError::PlaybackFailed("engine died".to_string())
        );
    }

    #[test]
    fn test_cancel_while_idle_is_noop() {
        let (spoken_tx, spoken_rx) = bounded(4);
        let controller = PlaybackController::new(Box::new(ScriptedSynthesizer {
            voices: Vec::new(),
            outcome: Ok(()),
            spoken: spoken_tx,
        }));
        let handle = controller.handle();
        controller.start_worker().unwrap();

        // Cancelling with nothing in flight produces no event and does
        // not poison the next utterance.
        handle.cancel();
        handle.cancel();
        handle.speak("still works".to_string(), Locale::En, 9).unwrap();

        assert_eq!(recv_event(&handle), PlaybackEvent::Started { activation: 9 });
        assert_eq!(recv_event(&handle), PlaybackEvent::Finished { activation: 9 });
        assert!(spoken_rx.recv_timeout(Duration::from_secs(1)).is_ok());
        handle.shutdown();
    }
}

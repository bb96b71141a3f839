//! The session orchestrator: one state machine mediating capture,
//! completion and playback so they never overlap or race.
//!
//! The orchestrator runs on the UI thread. `poll_events` drains the
//! controller event channels once per frame and applies the transition
//! table; every outbound operation is stamped with an activation (or
//! request) number, and inbound events that do not match the current
//! outstanding one are dropped as stale.

use crate::capture::{CaptureEvent, CaptureHandle};
use crate::completion::{CompletionEvent, CompletionHandle};
use crate::locale::Locale;
use crate::playback::{PlaybackEvent, PlaybackHandle};
use crate::session::state::{PrimaryAction, SessionState};
use crate::transcript::{Transcript, Turn};
use crate::MazraError;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct Session {
    capture: CaptureHandle,
    completion: CompletionHandle,
    playback: PlaybackHandle,

    transcript: Transcript,
    state: SessionState,

    /// Active locale; applied to the next capture/speak cycle.
    locale: Locale,
    /// A toggle requested while busy, applied on the next return to Idle.
    pending_locale: Option<Locale>,

    /// The single current error. User-initiated cancellations never land
    /// here; a new successful action clears it.
    last_error: Option<MazraError>,

    /// Sequence number shared by capture and playback activations.
    /// Bumped on every begin/speak and on user stop, so late events from
    /// a superseded activation identify themselves.
    activation: u64,

    /// The outstanding completion request, if any.
    pending_request: Option<Uuid>,
}

impl Session {
    pub fn new(
        capture: CaptureHandle,
        completion: CompletionHandle,
        playback: PlaybackHandle,
        locale: Locale,
    ) -> Self {
        Self {
            capture,
            completion,
            playback,
            transcript: Transcript::new(),
            state: SessionState::Idle,
            locale,
            pending_locale: None,
            last_error: None,
            activation: 0,
            pending_request: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn last_error(&self) -> Option<&MazraError> {
        self.last_error.as_ref()
    }

    /// The current error rendered in the active locale, if one should be
    /// shown at all.
    pub fn error_message(&self) -> Option<String> {
        self.last_error
            .as_ref()
            .map(|e| e.localized_message(self.locale))
    }

    pub fn primary_action(&self) -> PrimaryAction {
        self.state.primary_action()
    }

    /// Apply whatever the single physical control means right now.
    pub fn trigger_primary_action(&mut self) {
        match self.primary_action() {
            PrimaryAction::StartCapture => self.start_capture(),
            PrimaryAction::StopCapture => self.stop_capture(),
            PrimaryAction::CancelPlayback => self.cancel_playback(),
            PrimaryAction::Disabled => {}
        }
    }

    /// Idle -> Listening.
    pub fn start_capture(&mut self) {
        if !self.state.is_idle() {
            warn!(state = ?self.state, "capture requested while busy; ignored");
            return;
        }

        self.last_error = None;
        self.activation += 1;
        match self.capture.begin(self.locale, self.activation) {
            Ok(()) => {
                info!(activation = self.activation, locale = self.locale.bcp47(), "listening");
                self.state = SessionState::Listening;
            }
            Err(e) => self.surface_error(e),
        }
    }

    /// Listening -> Idle, user-initiated. No turn, no error.
    pub fn stop_capture(&mut self) {
        if self.state != SessionState::Listening {
            return;
        }

        self.capture.end();
        // Whatever terminal event the device still emits for this
        // activation is stale from here on.
        self.activation += 1;
        self.to_idle();
        info!("capture stopped by user");
    }

    /// Speaking -> Idle, user-initiated.
    pub fn cancel_playback(&mut self) {
        if self.state != SessionState::Speaking {
            return;
        }

        self.playback.cancel();
        self.activation += 1;
        self.to_idle();
        info!("playback cancelled by user");
    }

    /// Binary locale toggle. Immediate while Idle, otherwise queued and
    /// applied on the next return to Idle so an in-flight cycle is never
    /// switched under.
    pub fn toggle_locale(&mut self) {
        if self.state.is_idle() {
            self.locale = self.locale.toggled();
            self.pending_locale = None;
            info!(locale = self.locale.bcp47(), "locale switched");
        } else {
            let next = self.pending_locale.unwrap_or(self.locale).toggled();
            self.pending_locale = if next == self.locale { None } else { Some(next) };
            debug!(pending = ?self.pending_locale, "locale toggle deferred until idle");
        }
    }

    /// A photo from the image-capture collaborator, submitted with the
    /// fixed per-locale analysis prompt. Enters Processing directly.
    pub fn submit_image(&mut self, image_data_uri: String) {
        if !self.state.is_idle() {
            warn!(state = ?self.state, "image submitted while busy; ignored");
            return;
        }

        self.last_error = None;
        let prompt = self.locale.image_prompt().to_string();
        self.transcript
            .append(Turn::user_with_image(prompt.clone(), image_data_uri.clone()));
        self.request_completion(prompt, Some(image_data_uri));
    }

    /// Drain controller events and drive the transition table. Called
    /// once per UI frame.
    pub fn poll_events(&mut self) {
        while let Some(event) = self.capture.try_recv_event() {
            self.on_capture_event(event);
        }
        while let Some(event) = self.completion.try_recv_event() {
            self.on_completion_event(event);
        }
        while let Some(event) = self.playback.try_recv_event() {
            self.on_playback_event(event);
        }
    }

    pub fn shutdown(&self) {
        self.capture.shutdown();
        self.completion.shutdown();
        self.playback.shutdown();
    }

    fn on_capture_event(&mut self, event: CaptureEvent) {
        let listening = self.state == SessionState::Listening;
        let current = self.activation;

        match event {
            CaptureEvent::Transcript { text, activation }
                if listening && activation == current =>
            {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    // Nothing was said; discard silently.
                    debug!(activation, "blank transcript discarded");
                    self.to_idle();
                    return;
                }

                self.transcript.append(Turn::user(trimmed));
                self.request_completion(trimmed.to_string(), None);
            }
            CaptureEvent::Failed { kind, activation }
                if listening && activation == current =>
            {
                // An unexpected abort from the device is a cancellation,
                // not an error the user needs to see.
                let error = MazraError::from(kind);
                self.surface_error(error);
                self.to_idle();
            }
            CaptureEvent::Cancelled { activation }
                if listening && activation == current =>
            {
                self.to_idle();
            }
            CaptureEvent::Shutdown => debug!("capture worker shut down"),
            stale => debug!(?stale, "stale capture event dropped"),
        }
    }

    fn on_completion_event(&mut self, event: CompletionEvent) {
        let processing = self.state == SessionState::Processing;
        let pending = self.pending_request;

        match event {
            CompletionEvent::Response { text, request_id }
                if processing && pending == Some(request_id) =>
            {
                self.pending_request = None;
                self.last_error = None;

                let reply = text.trim().to_string();
                if reply.is_empty() {
                    // The remote answered with nothing usable. No turn is
                    // appended; a gentle notice replaces the spoken reply.
                    self.surface_error(MazraError::EmptyResult);
                    self.to_idle();
                    return;
                }

                self.transcript.append(Turn::assistant(reply.clone()));
                self.activation += 1;
                match self.playback.speak(reply, self.locale, self.activation) {
                    Ok(()) => self.state = SessionState::Speaking,
                    Err(e) => {
                        self.surface_error(e);
                        self.to_idle();
                    }
                }
            }
            CompletionEvent::Failed { error, request_id }
                if processing && pending == Some(request_id) =>
            {
                // The user turn stays in the transcript, unanswered.
                self.pending_request = None;
                self.surface_error(error.into());
                self.to_idle();
            }
            CompletionEvent::Shutdown => debug!("completion worker shut down"),
            stale => debug!(?stale, "stale completion event dropped"),
        }
    }

    fn on_playback_event(&mut self, event: PlaybackEvent) {
        let speaking = self.state == SessionState::Speaking;
        let current = self.activation;

        match event {
            PlaybackEvent::Started { activation }
                if speaking && activation == current =>
            {
                debug!(activation, "utterance started");
                self.last_error = None;
            }
            PlaybackEvent::Finished { activation }
                if speaking && activation == current =>
            {
                self.to_idle();
            }
            PlaybackEvent::Cancelled { activation }
                if speaking && activation == current =>
            {
                self.to_idle();
            }
            PlaybackEvent::Failed { kind, activation }
                if speaking && activation == current =>
            {
                self.surface_error(kind.into());
                self.to_idle();
            }
            PlaybackEvent::Shutdown => debug!("playback worker shut down"),
            stale => debug!(?stale, "stale playback event dropped"),
        }
    }

    /// Listening/Idle -> Processing.
    fn request_completion(&mut self, prompt: String, image_data_uri: Option<String>) {
        let request_id = Uuid::new_v4();
        match self
            .completion
            .complete(prompt, self.locale, image_data_uri, request_id)
        {
            Ok(()) => {
                self.pending_request = Some(request_id);
                self.state = SessionState::Processing;
            }
            Err(e) => {
                self.surface_error(e);
                self.to_idle();
            }
        }
    }

    /// Every path back to rest goes through here, which is also the only
    /// point where a deferred locale toggle takes effect.
    fn to_idle(&mut self) {
        self.state = SessionState::Idle;
        self.pending_request = None;
        if let Some(locale) = self.pending_locale.take() {
            self.locale = locale;
            info!(locale = self.locale.bcp47(), "deferred locale switch applied");
        }
    }

    fn surface_error(&mut self, error: MazraError) {
        if error.is_user_visible() {
            self.last_error = Some(error);
        } else {
            debug!(?error, "non-reportable failure");
        }
    }
}

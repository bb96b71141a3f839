//! End-to-end exercises of the session pipeline over real worker
//! threads, with scripted device and remote backends.

use crossbeam_channel::{bounded, Receiver, Sender};
use mazra::capture::{CaptureController, CaptureFailure, RecognizerBackend};
use mazra::completion::{CompletionBackend, CompletionClient, CompletionFailure};
use mazra::locale::Locale;
use mazra::playback::{PlaybackController, PlaybackFailure, SynthesizerBackend, Voice};
use mazra::session::{Session, SessionState};
use mazra::transcript::Speaker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

struct ScriptedRecognizer {
    outcomes: Receiver<Result<String, CaptureFailure>>,
}

impl RecognizerBackend for ScriptedRecognizer {
    fn check_permission(&mut self) -> Result<(), CaptureFailure> {
        Ok(())
    }

    fn recognize(
        &mut self,
        _locale_tag: &str,
        abort: &AtomicBool,
    ) -> Result<String, CaptureFailure> {
        loop {
            if abort.load(Ordering::SeqCst) {
                return Err(CaptureFailure::Aborted);
            }
            if let Ok(outcome) = self.outcomes.recv_timeout(Duration::from_millis(2)) {
                return outcome;
            }
        }
    }
}

struct ScriptedCompletion {
    outcomes: Receiver<Result<String, CompletionFailure>>,
}

impl CompletionBackend for ScriptedCompletion {
    fn complete(
        &mut self,
        _prompt: &str,
        _locale: Locale,
        _image_data_uri: Option<String>,
    ) -> Result<String, CompletionFailure> {
        self.outcomes
            .recv_timeout(Duration::from_secs(2))
            .unwrap_or_else(|_| Err(CompletionFailure::TransportError("no script".into())))
    }
}

struct ScriptedSynthesizer {
    finish: Receiver<Result<(), PlaybackFailure>>,
    spoken: Sender<(String, Option<String>, String)>,
}

impl SynthesizerBackend for ScriptedSynthesizer {
    fn voices(&mut self) -> Vec<Voice> {
        vec![
            Voice::new("samantha", "Samantha", "en-US"),
            Voice::new("majed", "Majed", "ar-SA"),
        ]
    }

    fn speak(
        &mut self,
        text: &str,
        voice: Option<&Voice>,
        locale_tag: &str,
        interrupt: &AtomicBool,
    ) -> Result<(), PlaybackFailure> {
        let _ = self.spoken.send((
            text.to_string(),
            voice.map(|v| v.id.clone()),
            locale_tag.to_string(),
        ));
        loop {
            if interrupt.load(Ordering::SeqCst) {
                return Err(PlaybackFailure::Interrupted);
            }
            if let Ok(outcome) = self.finish.recv_timeout(Duration::from_millis(2)) {
                return outcome;
            }
        }
    }
}

struct Pipeline {
    session: Session,
    transcripts: Sender<Result<String, CaptureFailure>>,
    replies: Sender<Result<String, CompletionFailure>>,
    finish: Sender<Result<(), PlaybackFailure>>,
    spoken: Receiver<(String, Option<String>, String)>,
}

fn pipeline() -> Pipeline {
    let (transcripts, transcripts_rx) = bounded(8);
    let capture = CaptureController::new(Box::new(ScriptedRecognizer {
        outcomes: transcripts_rx,
    }));

    let (replies, replies_rx) = bounded(8);
    let completion = CompletionClient::with_backend(Box::new(ScriptedCompletion {
        outcomes: replies_rx,
    }));

    let (finish, finish_rx) = bounded(8);
    let (spoken_tx, spoken) = bounded(8);
    let playback = PlaybackController::new(Box::new(ScriptedSynthesizer {
        finish: finish_rx,
        spoken: spoken_tx,
    }));

    let session = Session::new(
        capture.handle(),
        completion.handle(),
        playback.handle(),
        Locale::En,
    );

    capture.start_worker().unwrap();
    completion.start_worker().unwrap();
    playback.start_worker().unwrap();

    Pipeline {
        session,
        transcripts,
        replies,
        finish,
        spoken,
    }
}

fn wait_for(session: &mut Session, state: SessionState) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while session.state() != state {
        session.poll_events();
        assert!(
            Instant::now() < deadline,
            "session stuck in {:?}, wanted {:?}",
            session.state(),
            state
        );
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_full_exchange_in_arabic() {
    let mut p = pipeline();

    p.session.toggle_locale();
    assert_eq!(p.session.locale(), Locale::Ar);

    p.session.trigger_primary_action();
    wait_for(&mut p.session, SessionState::Listening);

    p.transcripts
        .send(Ok("ما المحاصيل المناسبة للتربة الرملية؟".to_string()))
        .unwrap();
    wait_for(&mut p.session, SessionState::Processing);

    p.replies
        .send(Ok("النخيل والطماطم تنمو جيدا في التربة الرملية.".to_string()))
        .unwrap();
    wait_for(&mut p.session, SessionState::Speaking);

    let (text, voice_id, tag) = p.spoken.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(text, "النخيل والطماطم تنمو جيدا في التربة الرملية.");
    assert_eq!(voice_id.as_deref(), Some("majed"));
    assert_eq!(tag, "ar-SA");

    p.finish.send(Ok(())).unwrap();
    wait_for(&mut p.session, SessionState::Idle);

    let turns = p.session.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].speaker, Speaker::User);
    assert_eq!(turns[1].speaker, Speaker::Assistant);
    assert!(p.session.error_message().is_none());
}

#[test]
fn test_cancel_speaking_then_ask_again() {
    let mut p = pipeline();

    p.session.trigger_primary_action();
    wait_for(&mut p.session, SessionState::Listening);
    p.transcripts.send(Ok("first question".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Processing);
    p.replies.send(Ok("First answer.".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Speaking);
    p.spoken.recv_timeout(Duration::from_secs(2)).unwrap();

    // Cut the utterance off; the session returns to rest immediately
    // and the worker's Cancelled event arrives stale.
    p.session.trigger_primary_action();
    assert_eq!(p.session.state(), SessionState::Idle);
    assert!(p.session.error_message().is_none());

    // A fresh exchange still works end to end.
    p.session.trigger_primary_action();
    wait_for(&mut p.session, SessionState::Listening);
    p.transcripts.send(Ok("second question".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Processing);
    p.replies.send(Ok("Second answer.".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Speaking);

    let (text, _, _) = p.spoken.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(text, "Second answer.");

    p.finish.send(Ok(())).unwrap();
    wait_for(&mut p.session, SessionState::Idle);
    assert_eq!(p.session.transcript().len(), 4);
}

#[test]
fn test_transport_failure_then_retry_succeeds() {
    let mut p = pipeline();

    p.session.trigger_primary_action();
    wait_for(&mut p.session, SessionState::Listening);
    p.transcripts.send(Ok("will this fail?".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Processing);

    p.replies
        .send(Err(CompletionFailure::TransportError(
            "connection refused".to_string(),
        )))
        .unwrap();
    wait_for(&mut p.session, SessionState::Idle);

    // The question stays in the transcript, unanswered, with the error
    // shown.
    assert_eq!(p.session.transcript().len(), 1);
    assert!(p.session.error_message().is_some());

    // Retrying clears the error and completes normally.
    p.session.trigger_primary_action();
    assert!(p.session.error_message().is_none());
    wait_for(&mut p.session, SessionState::Listening);
    p.transcripts.send(Ok("will this fail?".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Processing);
    p.replies.send(Ok("No, it works now.".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Speaking);
    p.finish.send(Ok(())).unwrap();
    wait_for(&mut p.session, SessionState::Idle);

    assert_eq!(p.session.transcript().len(), 3);
}

#[test]
fn test_image_then_voice_exchange_preserves_order() {
    let mut p = pipeline();

    p.session
        .submit_image("data:image/jpeg;base64,AAAA".to_string());
    assert_eq!(p.session.state(), SessionState::Processing);
    p.replies
        .send(Ok("The soil looks too dry.".to_string()))
        .unwrap();
    wait_for(&mut p.session, SessionState::Speaking);
    p.spoken.recv_timeout(Duration::from_secs(2)).unwrap();
    p.finish.send(Ok(())).unwrap();
    wait_for(&mut p.session, SessionState::Idle);

    p.session.trigger_primary_action();
    wait_for(&mut p.session, SessionState::Listening);
    p.transcripts
        .send(Ok("how often should I water?".to_string()))
        .unwrap();
    wait_for(&mut p.session, SessionState::Processing);
    p.replies.send(Ok("Twice a day in summer.".to_string())).unwrap();
    wait_for(&mut p.session, SessionState::Speaking);
    p.finish.send(Ok(())).unwrap();
    wait_for(&mut p.session, SessionState::Idle);

    let turns = p.session.transcript().turns();
    assert_eq!(turns.len(), 4);
    assert!(turns[0].has_image());
    assert_eq!(turns[1].speaker, Speaker::Assistant);
    assert_eq!(turns[2].text, "how often should I water?");
    assert!(!turns[2].has_image());
}

#[test]
fn test_permission_denied_surfaces_localized_message() {
    struct DeniedRecognizer;

    impl RecognizerBackend for DeniedRecognizer {
        fn check_permission(&mut self) -> Result<(), CaptureFailure> {
            Err(CaptureFailure::PermissionDenied)
        }

        fn recognize(
            &mut self,
            _locale_tag: &str,
            _abort: &AtomicBool,
        ) -> Result<String, CaptureFailure> {
            unreachable!("permission check fails first")
        }
    }

    let capture = CaptureController::new(Box::new(DeniedRecognizer));
    let (_, replies_rx) = bounded(1);
    let completion = CompletionClient::with_backend(Box::new(ScriptedCompletion {
        outcomes: replies_rx,
    }));
    let (_, finish_rx) = bounded(1);
    let (spoken_tx, _spoken) = bounded(1);
    let playback = PlaybackController::new(Box::new(ScriptedSynthesizer {
        finish: finish_rx,
        spoken: spoken_tx,
    }));

    let mut session = Session::new(
        capture.handle(),
        completion.handle(),
        playback.handle(),
        Locale::Ar,
    );
    capture.start_worker().unwrap();
    completion.start_worker().unwrap();
    playback.start_worker().unwrap();

    session.trigger_primary_action();
    wait_for(&mut session, SessionState::Idle);

    assert!(session.transcript().is_empty());
    let message = session.error_message().expect("error shown");
    assert!(message.contains("الميكروفون"));
}

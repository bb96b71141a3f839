use anyhow::Result;
use mazra::capture::CaptureController;
use mazra::completion::{CompletionClient, CompletionConfig};
use mazra::locale::Locale;
use mazra::playback::{PlaybackController, UnsupportedSynthesizer};
use mazra::session::Session;
use mazra::ui::MazraApp;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mazra=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting mazra farming assistant");

    let config = CompletionConfig::from_env();
    if !config.has_credential() {
        // Startup proceeds; every completion attempt will surface the
        // missing-credential error to the user instead.
        info!("no completion credential configured");
    }

    #[cfg(feature = "audio-io")]
    let capture = CaptureController::new(Box::new(mazra::capture::MicrophoneRecognizer));
    #[cfg(not(feature = "audio-io"))]
    let capture = CaptureController::new(Box::new(mazra::capture::UnsupportedRecognizer));

    let completion = CompletionClient::new(config)?;
    let playback = PlaybackController::new(Box::new(UnsupportedSynthesizer));

    let session = Session::new(
        capture.handle(),
        completion.handle(),
        playback.handle(),
        Locale::En,
    );

    capture.start_worker()?;
    completion.start_worker()?;
    playback.start_worker()?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 560.0])
            .with_title("Mazra"),
        ..Default::default()
    };

    eframe::run_native(
        "Mazra",
        native_options,
        Box::new(|cc| Ok(Box::new(MazraApp::new(cc, session)))),
    )
    .map_err(|e| anyhow::anyhow!("ui loop failed: {e}"))?;

    info!("mazra shut down");
    Ok(())
}

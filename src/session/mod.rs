//! Session orchestration: the state machine that owns the transcript
//! and sequences capture, completion and playback.

mod orchestrator;
mod state;

pub use orchestrator::Session;
pub use state::{PrimaryAction, SessionState};

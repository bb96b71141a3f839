//! Session states and the overloaded primary-action control.

/// The single source of truth for what the session is doing.
///
/// Exactly one state holds at any instant; `Listening`, `Processing`
/// and `Speaking` are mutually exclusive by construction since every
/// transition goes through the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening,
    Processing,
    Speaking,
}

/// What the single physical control means in each state. Kept here,
/// next to the state machine, rather than as conditionals at call
/// sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    StartCapture,
    StopCapture,
    /// Nothing to interrupt while the remote call is in flight.
    Disabled,
    CancelPlayback,
}

impl SessionState {
    pub fn primary_action(self) -> PrimaryAction {
        match self {
            SessionState::Idle => PrimaryAction::StartCapture,
            SessionState::Listening => PrimaryAction::StopCapture,
            SessionState::Processing => PrimaryAction::Disabled,
            SessionState::Speaking => PrimaryAction::CancelPlayback,
        }
    }

    pub fn is_idle(self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

use std::fmt;

/// Where the run controller currently is in its per-identity cycle.
///
/// `Idle -> RotatingIdentity -> SessionOpen -> Extracting -> Capturing -> SessionClosing
/// -> (RecordCommitted | RecordFailed)`, repeated per identity, then `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    RotatingIdentity,
    SessionOpen,
    Extracting,
    Capturing,
    SessionClosing,
    RecordCommitted,
    RecordFailed,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "Idle",
            RunState::RotatingIdentity => "RotatingIdentity",
            RunState::SessionOpen => "SessionOpen",
            RunState::Extracting => "Extracting",
            RunState::Capturing => "Capturing",
            RunState::SessionClosing => "SessionClosing",
            RunState::RecordCommitted => "RecordCommitted",
            RunState::RecordFailed => "RecordFailed",
            RunState::Done => "Done",
        };
        f.write_str(name)
    }
}

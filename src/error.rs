use crate::event::{ParamKind, SubsystemId};
use thiserror::Error;

/// Errors surfaced by the simulator's command and configuration entry points.
///
/// None of these are fatal to the host process. Timeline failures end the
/// current run only; the engine can always be restarted from idle.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid scenario identifier {0}")]
    InvalidScenario(u16),

    #[error("Start playback rejected because not in ground contact")]
    PlaybackRejected,

    #[error("Invalid JSON command identifier {0}")]
    InvalidJsonCommand(u8),

    #[error("Command of {0} bytes exceeds the command buffer")]
    CommandTooLarge(usize),

    #[error("Event cmd buffer overflow while loading {subsystem:?} cmd {id}")]
    TimelineOverflow { subsystem: SubsystemId, id: u8 },

    #[error("Failed to insert runtime {subsystem:?} cmd {id} at index {index}")]
    TimelineInsert {
        subsystem: SubsystemId,
        id: u8,
        index: u16,
    },

    #[error("Parameter '{text}' does not match {kind:?}")]
    MalformedParam { kind: ParamKind, text: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;

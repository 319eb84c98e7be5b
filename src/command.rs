use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

pub const MAX_COMMAND_SIZE: usize = 512;

/// Operator commands accepted by the engine.
///
/// Wire form is tagged JSON, e.g. `{"command":"start_sim","scenario":1}`.
/// The single-field form `{"id":3}` is also accepted and maps to [`SimCommand::Json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SimCommand {
    StartSim { scenario: u16 },
    StopSim,
    StartPlayback,
    StopPlayback,
    Json { id: u8 },
}

/// Ids of the single-field JSON command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonCmdId {
    StartSim1 = 1,
    StartSim2 = 2,
    StopSim = 3,
    StartEvtPlbk = 4,
    StopEvtPlbk = 5,
}

impl JsonCmdId {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::StartSim1),
            2 => Some(Self::StartSim2),
            3 => Some(Self::StopSim),
            4 => Some(Self::StartEvtPlbk),
            5 => Some(Self::StopEvtPlbk),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct JsonCmdPayload {
    id: u8,
}

pub fn parse_command(line: &str) -> SimResult<SimCommand> {
    if line.len() > MAX_COMMAND_SIZE {
        return Err(SimError::CommandTooLarge(line.len()));
    }

    match serde_json::from_str::<SimCommand>(line) {
        Ok(command) => Ok(command),
        Err(err) => serde_json::from_str::<JsonCmdPayload>(line)
            .map(|payload| SimCommand::Json { id: payload.id })
            .map_err(|_| err.into()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Acknowledged,
    NegativeAck,
    InvalidCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: ResponseStatus,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ack(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Acknowledged,
            message: Some(message.into()),
        }
    }

    pub fn nack(reason: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::NegativeAck,
            message: Some(reason.into()),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::InvalidCommand,
            message: Some(reason.into()),
        }
    }

    pub fn is_ack(&self) -> bool {
        self.status == ResponseStatus::Acknowledged
    }
}

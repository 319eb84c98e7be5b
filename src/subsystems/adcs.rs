use super::{DispatchCtx, ExecEnv, Model};
use crate::eid::{ADCS_CHANGE_MODE_EID, ADCS_ENTER_ECLIPSE_EID, ADCS_EXIT_ECLIPSE_EID};
use crate::event::{EventCmd, EventCmdParam, SubsystemId};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcsEvent {
    SetMode = 1,
    EnterEclipse = 2,
    ExitEclipse = 3,
    SetAttitude = 4,
    SetOrbit = 5,
}

impl AdcsEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::SetMode),
            2 => Some(Self::EnterEclipse),
            3 => Some(Self::ExitEclipse),
            4 => Some(Self::SetAttitude),
            5 => Some(Self::SetOrbit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdcsMode {
    Undef = 0,
    Safehold = 1,
    SunPoint = 2,
    Inertial = 3,
    Slew = 4,
}

impl AdcsMode {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Undef),
            1 => Some(Self::Safehold),
            2 => Some(Self::SunPoint),
            3 => Some(Self::Inertial),
            4 => Some(Self::Slew),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Undef => "UNDEF",
            Self::Safehold => "SAFEHOLD",
            Self::SunPoint => "SUN_POINT",
            Self::Inertial => "INERTIAL",
            Self::Slew => "SLEW",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdcsState {
    pub eclipse: bool,
    pub mode: AdcsMode,
}

#[derive(Debug)]
pub struct AdcsModel {
    state: AdcsState,
    last_event_cmd: EventCmd,
}

impl Default for AdcsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcsModel {
    pub fn new() -> Self {
        // Spacecraft starts in eclipse with no control mode selected
        Self {
            state: AdcsState {
                eclipse: true,
                mode: AdcsMode::Undef,
            },
            last_event_cmd: EventCmd::idle(SubsystemId::Adcs),
        }
    }

    pub fn eclipse(&self) -> bool {
        self.state.eclipse
    }
}

impl Model for AdcsModel {
    type State = AdcsState;

    const SUBSYSTEM: SubsystemId = SubsystemId::Adcs;

    fn init(&mut self) {
        *self = Self::new();
    }

    fn execute(&mut self, _env: &mut ExecEnv) {}

    fn process_event_cmd(
        &mut self,
        cmd: &EventCmd,
        param: &EventCmdParam,
        _ctx: &mut DispatchCtx,
    ) -> bool {
        let recognized = match AdcsEvent::from_id(cmd.id) {
            Some(AdcsEvent::SetMode) => {
                match AdcsMode::from_value(param.one_int) {
                    Some(mode) => {
                        info!(
                            eid = ADCS_CHANGE_MODE_EID,
                            "ADCS: Control mode changed from {} to {}",
                            self.state.mode.name(),
                            mode.name()
                        );
                        self.state.mode = mode;
                    }
                    None => warn!(
                        eid = ADCS_CHANGE_MODE_EID,
                        "ADCS: Ignoring invalid control mode {}", param.one_int
                    ),
                }
                true
            }
            Some(AdcsEvent::EnterEclipse) => {
                self.state.eclipse = true;
                info!(eid = ADCS_ENTER_ECLIPSE_EID, "ADCS: Enter eclipse");
                true
            }
            Some(AdcsEvent::ExitEclipse) => {
                self.state.eclipse = false;
                info!(eid = ADCS_EXIT_ECLIPSE_EID, "ADCS: Exit eclipse");
                true
            }
            // Attitude and orbit events are reserved
            Some(AdcsEvent::SetAttitude | AdcsEvent::SetOrbit) | None => false,
        };

        self.last_event_cmd = *cmd;
        recognized
    }

    fn last_event_cmd(&self) -> &EventCmd {
        &self.last_event_cmd
    }

    fn state(&self) -> AdcsState {
        self.state
    }
}

use super::{DispatchCtx, ExecEnv, Model};
use crate::event::{EventCmd, EventCmdParam, SubsystemId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermEvent {
    EnaHeater1 = 1,
    EnaHeater2 = 2,
}

impl ThermEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::EnaHeater1),
            2 => Some(Self::EnaHeater2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ThermState {
    pub heater1_ena: bool,
    pub heater2_ena: bool,
}

#[derive(Debug)]
pub struct ThermModel {
    state: ThermState,
    last_event_cmd: EventCmd,
}

impl Default for ThermModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ThermModel {
    pub fn new() -> Self {
        Self {
            state: ThermState {
                heater1_ena: false,
                heater2_ena: false,
            },
            last_event_cmd: EventCmd::idle(SubsystemId::Therm),
        }
    }
}

impl Model for ThermModel {
    type State = ThermState;

    const SUBSYSTEM: SubsystemId = SubsystemId::Therm;

    fn init(&mut self) {
        *self = Self::new();
    }

    /// Heaters follow the eclipse flag every second, overriding heater events.
    fn execute(&mut self, env: &mut ExecEnv) {
        self.state.heater1_ena = env.eclipse;
        self.state.heater2_ena = env.eclipse;
    }

    fn process_event_cmd(
        &mut self,
        cmd: &EventCmd,
        param: &EventCmdParam,
        _ctx: &mut DispatchCtx,
    ) -> bool {
        let recognized = match ThermEvent::from_id(cmd.id) {
            Some(ThermEvent::EnaHeater1) => {
                self.state.heater1_ena = param.one_int != 0;
                true
            }
            Some(ThermEvent::EnaHeater2) => {
                self.state.heater2_ena = param.one_int != 0;
                true
            }
            None => false,
        };

        self.last_event_cmd = *cmd;
        recognized
    }

    fn last_event_cmd(&self) -> &EventCmd {
        &self.last_event_cmd
    }

    fn state(&self) -> ThermState {
        self.state
    }
}

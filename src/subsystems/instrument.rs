use super::{DispatchCtx, ExecEnv, Model};
use crate::eid::INSTR_DIS_POWER_EID;
use crate::event::{EventCmd, EventCmdParam, SubsystemId};
use serde::Serialize;
use tracing::info;

/// Seconds of science collection that fill one recorder file.
pub const INSTR_CYCLES_PER_FILE: i16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrEvent {
    EnaPower = 1,
    DisPower = 2,
    EnaScience = 3,
    DisScience = 4,
}

impl InstrEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::EnaPower),
            2 => Some(Self::DisPower),
            3 => Some(Self::EnaScience),
            4 => Some(Self::DisScience),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct InstrState {
    pub pwr_ena: bool,
    pub sci_ena: bool,
    pub file_cnt: i16,
    pub file_cyc_cnt: i16,
}

#[derive(Debug)]
pub struct InstrModel {
    state: InstrState,
    last_event_cmd: EventCmd,
}

impl Default for InstrModel {
    fn default() -> Self {
        Self::new()
    }
}

impl InstrModel {
    pub fn new() -> Self {
        Self {
            state: InstrState {
                pwr_ena: false,
                sci_ena: false,
                file_cnt: 0,
                file_cyc_cnt: 0,
            },
            last_event_cmd: EventCmd::idle(SubsystemId::Instr),
        }
    }
}

impl Model for InstrModel {
    type State = InstrState;

    const SUBSYSTEM: SubsystemId = SubsystemId::Instr;

    fn init(&mut self) {
        *self = Self::new();
    }

    /// Files are handed to the recorder through `env.new_files`.
    fn execute(&mut self, env: &mut ExecEnv) {
        if self.state.pwr_ena && self.state.sci_ena {
            self.state.file_cyc_cnt += 1;
            if self.state.file_cyc_cnt >= INSTR_CYCLES_PER_FILE {
                env.new_files = env.new_files.wrapping_add(1);
                self.state.file_cnt = self.state.file_cnt.wrapping_add(1);
                self.state.file_cyc_cnt = 0;
            }
        } else {
            self.state.file_cyc_cnt = 0;
        }

        debug_assert!(
            self.state.file_cyc_cnt < INSTR_CYCLES_PER_FILE,
            "File cycle count {} reached threshold without rollover",
            self.state.file_cyc_cnt
        );
    }

    fn process_event_cmd(
        &mut self,
        cmd: &EventCmd,
        _param: &EventCmdParam,
        _ctx: &mut DispatchCtx,
    ) -> bool {
        let recognized = match InstrEvent::from_id(cmd.id) {
            Some(InstrEvent::EnaPower) => {
                self.state.pwr_ena = true;
                true
            }
            Some(InstrEvent::DisPower) => {
                info!(eid = INSTR_DIS_POWER_EID, "INSTR: Science instrument powered off");
                self.state.pwr_ena = false;
                true
            }
            Some(InstrEvent::EnaScience) => {
                self.state.sci_ena = true;
                true
            }
            Some(InstrEvent::DisScience) => {
                self.state.sci_ena = false;
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

    fn state(&self) -> InstrState {
        self.state
    }
}

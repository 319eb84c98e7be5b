use super::{DispatchCtx, ExecEnv, Model, Notice};
use crate::event::{EventCmd, EventCmdParam, SubsystemId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FswEvent {
    SetRecFileCnt = 1,
    SetRecPctUsed = 2,
    StartRecPlbk = 3,
    StopRecPlbk = 4,
    ClrEvtLog = 5,
}

impl FswEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::SetRecFileCnt),
            2 => Some(Self::SetRecPctUsed),
            3 => Some(Self::StartRecPlbk),
            4 => Some(Self::StopRecPlbk),
            5 => Some(Self::ClrEvtLog),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FswState {
    pub pct_used: f32,
    pub file_cnt: u16,
    pub playback_ena: bool,
}

/// Flight software recorder. Playback drains one file per second.
#[derive(Debug)]
pub struct FswModel {
    state: FswState,
    last_event_cmd: EventCmd,
}

impl Default for FswModel {
    fn default() -> Self {
        Self::new()
    }
}

impl FswModel {
    pub fn new() -> Self {
        Self {
            state: FswState {
                pct_used: 0.0,
                file_cnt: 0,
                playback_ena: false,
            },
            last_event_cmd: EventCmd::idle(SubsystemId::Fsw),
        }
    }

    pub fn set_playback(&mut self, enabled: bool) {
        self.state.playback_ena = enabled;
    }

    pub fn add_files(&mut self, count: u16) {
        self.state.file_cnt = self.state.file_cnt.wrapping_add(count);
    }
}

impl Model for FswModel {
    type State = FswState;

    const SUBSYSTEM: SubsystemId = SubsystemId::Fsw;

    fn init(&mut self) {
        *self = Self::new();
    }

    fn execute(&mut self, _env: &mut ExecEnv) {
        if self.state.playback_ena {
            if self.state.file_cnt == 0 {
                self.state.playback_ena = false;
            } else {
                self.state.file_cnt -= 1;
            }
        }
    }

    fn process_event_cmd(
        &mut self,
        cmd: &EventCmd,
        param: &EventCmdParam,
        ctx: &mut DispatchCtx,
    ) -> bool {
        let recognized = match FswEvent::from_id(cmd.id) {
            Some(FswEvent::SetRecFileCnt) => {
                self.state.file_cnt = param.one_int as u16;
                true
            }
            Some(FswEvent::SetRecPctUsed) => {
                self.state.pct_used = param.one_flt;
                true
            }
            Some(FswEvent::StartRecPlbk) => {
                self.state.playback_ena = true;
                true
            }
            Some(FswEvent::StopRecPlbk) => {
                self.state.playback_ena = false;
                true
            }
            Some(FswEvent::ClrEvtLog) => {
                ctx.notify(Notice::ClearEventLog);
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

    fn state(&self) -> FswState {
        self.state
    }
}

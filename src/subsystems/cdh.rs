use super::{DispatchCtx, ExecEnv, Model};
use crate::eid::{CDH_HW_CMD_EID, CDH_WATCHDOG_RESET_EID};
use crate::event::{EventCmd, EventCmdParam, SubsystemId};
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdhEvent {
    WatchdogRst = 1,
    SendHwCmd = 2,
}

impl CdhEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::WatchdogRst),
            2 => Some(Self::SendHwCmd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HardwareCmd {
    Undef = 0,
    RstSbc = 1,
    PwrCycSbc = 2,
    SelBootA = 3,
    SelBootB = 4,
}

impl HardwareCmd {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::RstSbc),
            2 => Some(Self::PwrCycSbc),
            3 => Some(Self::SelBootA),
            4 => Some(Self::SelBootB),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Undef => "UNDEF",
            Self::RstSbc => "RST_SBC",
            Self::PwrCycSbc => "PWR_CYC_SBC",
            Self::SelBootA => "SEL_BOOT_A",
            Self::SelBootB => "SEL_BOOT_B",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CdhState {
    /// Resets from either the watchdog or a reset hardware command.
    pub sbc_rst_cnt: u16,
    pub hw_cmd_cnt: u16,
    pub last_hw_cmd: HardwareCmd,
}

/// Command and data handling: counts processor resets and hardware commands.
#[derive(Debug)]
pub struct CdhModel {
    state: CdhState,
    last_event_cmd: EventCmd,
}

impl Default for CdhModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CdhModel {
    pub fn new() -> Self {
        Self {
            state: CdhState {
                sbc_rst_cnt: 0,
                hw_cmd_cnt: 0,
                last_hw_cmd: HardwareCmd::Undef,
            },
            last_event_cmd: EventCmd::idle(SubsystemId::Cdh),
        }
    }
}

impl Model for CdhModel {
    type State = CdhState;

    const SUBSYSTEM: SubsystemId = SubsystemId::Cdh;

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
        let recognized = match CdhEvent::from_id(cmd.id) {
            Some(CdhEvent::WatchdogRst) => {
                error!(eid = CDH_WATCHDOG_RESET_EID, "C&DH: Watchdog reset");
                self.state.sbc_rst_cnt = self.state.sbc_rst_cnt.wrapping_add(1);
                true
            }
            Some(CdhEvent::SendHwCmd) => {
                self.state.hw_cmd_cnt = self.state.hw_cmd_cnt.wrapping_add(1);
                let hw_cmd = HardwareCmd::from_value(param.one_int);
                self.state.last_hw_cmd = hw_cmd.unwrap_or(HardwareCmd::Undef);
                if hw_cmd == Some(HardwareCmd::RstSbc) {
                    self.state.sbc_rst_cnt = self.state.sbc_rst_cnt.wrapping_add(1);
                }
                info!(
                    eid = CDH_HW_CMD_EID,
                    "CDH: Received hardware command {}",
                    self.state.last_hw_cmd.name()
                );
                hw_cmd.is_some()
            }
            None => false,
        };

        self.last_event_cmd = *cmd;
        recognized
    }

    fn last_event_cmd(&self) -> &EventCmd {
        &self.last_event_cmd
    }

    fn state(&self) -> CdhState {
        self.state
    }
}

use super::{DispatchCtx, ExecEnv, Model};
use crate::event::{EventCmd, EventCmdParam, SubsystemId};
use serde::Serialize;

const MAX_SOC: f32 = 100.0;
const MIN_SOC: f32 = 0.0;
/// One percent of charge per simulated minute.
const SOC_DELTA_PER_SEC: f32 = 1.0 / 50.0;
const SUNLIT_SA_CURRENT: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerEvent {
    SetBattSoc = 1,
    SetSaCurrent = 2,
}

impl PowerEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::SetBattSoc),
            2 => Some(Self::SetSaCurrent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PowerState {
    pub batt_soc: f32,
    pub sa_current: f32,
}

/// Linear charge model driven by the eclipse flag.
#[derive(Debug)]
pub struct PowerModel {
    state: PowerState,
    last_event_cmd: EventCmd,
}

impl Default for PowerModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerModel {
    pub fn new() -> Self {
        Self {
            state: PowerState {
                batt_soc: 0.0,
                sa_current: 0.0,
            },
            last_event_cmd: EventCmd::idle(SubsystemId::Power),
        }
    }
}

impl Model for PowerModel {
    type State = PowerState;

    const SUBSYSTEM: SubsystemId = SubsystemId::Power;

    fn init(&mut self) {
        *self = Self::new();
    }

    fn execute(&mut self, env: &mut ExecEnv) {
        if env.eclipse {
            self.state.sa_current = 0.0;
            // Discharge has no floor
            self.state.batt_soc -= SOC_DELTA_PER_SEC;
            if self.state.batt_soc > MAX_SOC {
                self.state.batt_soc = MAX_SOC;
            }
        } else {
            self.state.sa_current = SUNLIT_SA_CURRENT;
            self.state.batt_soc = (self.state.batt_soc + SOC_DELTA_PER_SEC).clamp(MIN_SOC, MAX_SOC);

            debug_assert!(
                self.state.batt_soc <= MAX_SOC,
                "Battery SOC {} exceeds maximum {}",
                self.state.batt_soc,
                MAX_SOC
            );
        }
    }

    fn process_event_cmd(
        &mut self,
        cmd: &EventCmd,
        param: &EventCmdParam,
        _ctx: &mut DispatchCtx,
    ) -> bool {
        let recognized = match PowerEvent::from_id(cmd.id) {
            Some(PowerEvent::SetBattSoc) => {
                self.state.batt_soc = param.one_flt;
                true
            }
            Some(PowerEvent::SetSaCurrent) => {
                self.state.sa_current = param.one_flt;
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

    fn state(&self) -> PowerState {
        self.state
    }
}

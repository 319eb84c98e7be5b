//! Canned scenarios selectable by the start command.
//!
//! Each table is time sorted and padded with end markers. Activation relinks
//! the entries, so the link fields written here are placeholders.

use crate::error::{SimError, SimResult};
use crate::event::{EventCmd, ParamKind, SimEvent, SubsystemId, INIT_TIME, REALTIME_EPOCH};
use crate::subsystems::{AdcsEvent, CdhEvent, CommEvent, FswEvent, InstrEvent, PowerEvent, ThermEvent};
use crate::timeline::{ScenarioTable, END_MARKER};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    /// Single ground contact with a time-lapse eclipse exit.
    GndContact1 = 1,
    /// Same contact preceded by a processor reset and instrument shutdown.
    GndContact2 = 2,
}

impl ScenarioId {
    pub fn table(self) -> &'static ScenarioTable {
        match self {
            ScenarioId::GndContact1 => &GND_CONTACT_1,
            ScenarioId::GndContact2 => &GND_CONTACT_2,
        }
    }
}

impl TryFrom<u16> for ScenarioId {
    type Error = SimError;

    fn try_from(value: u16) -> SimResult<Self> {
        match value {
            1 => Ok(ScenarioId::GndContact1),
            2 => Ok(ScenarioId::GndContact2),
            _ => Err(SimError::InvalidScenario(value)),
        }
    }
}

const fn cmd(time: i32, subsystem: SubsystemId, id: u8, kind: ParamKind, param: &'static str) -> EventCmd {
    EventCmd::new(time, subsystem, id, kind, Some(param))
}

const fn bare(time: i32, subsystem: SubsystemId, id: u8) -> EventCmd {
    EventCmd::new(time, subsystem, id, ParamKind::None, None)
}

use ParamKind::{OneFlt, OneInt, ThreeInt};
use SubsystemId::{Adcs, Cdh, Comm, Fsw, Instr, Power, Sim, Therm};

static GND_CONTACT_1: ScenarioTable = [
    // Model initialisation
    cmd(INIT_TIME, Adcs, AdcsEvent::SetMode as u8, OneInt, "3"),
    bare(INIT_TIME, Adcs, AdcsEvent::EnterEclipse as u8),
    cmd(INIT_TIME, Fsw, FswEvent::SetRecFileCnt as u8, OneInt, "10"),
    cmd(INIT_TIME, Fsw, FswEvent::SetRecPctUsed as u8, OneFlt, "5"),
    cmd(INIT_TIME, Comm, CommEvent::SetDataRate as u8, OneInt, "1024"),
    cmd(INIT_TIME, Comm, CommEvent::SetTdrsId as u8, OneInt, "1"),
    bare(INIT_TIME, Instr, InstrEvent::EnaPower as u8),
    bare(INIT_TIME, Instr, InstrEvent::EnaScience as u8),
    cmd(INIT_TIME, Power, PowerEvent::SetBattSoc as u8, OneFlt, "50"),
    cmd(INIT_TIME, Power, PowerEvent::SetSaCurrent as u8, OneFlt, "0"),
    cmd(INIT_TIME, Therm, ThermEvent::EnaHeater1 as u8, OneInt, "1"),
    cmd(INIT_TIME, Therm, ThermEvent::EnaHeater2 as u8, OneInt, "1"),
    // Time lapse
    bare(REALTIME_EPOCH - 3500, Fsw, FswEvent::ClrEvtLog as u8),
    bare(REALTIME_EPOCH - 2400, Adcs, AdcsEvent::ExitEclipse as u8),
    // Realtime
    cmd(REALTIME_EPOCH, Comm, CommEvent::SchAos as u8, ThreeInt, "30 240 1"),
    cmd(REALTIME_EPOCH, Comm, CommEvent::SetTdrsId as u8, OneInt, "1"),
    bare(REALTIME_EPOCH + 120, Adcs, AdcsEvent::EnterEclipse as u8),
    bare(REALTIME_EPOCH + 300, Sim, SimEvent::StopSim as u8),
    END_MARKER,
    END_MARKER,
    END_MARKER,
    END_MARKER,
    END_MARKER,
    END_MARKER,
    END_MARKER,
];

static GND_CONTACT_2: ScenarioTable = [
    // Model initialisation
    cmd(INIT_TIME, Adcs, AdcsEvent::SetMode as u8, OneInt, "3"),
    bare(INIT_TIME, Adcs, AdcsEvent::EnterEclipse as u8),
    cmd(INIT_TIME, Fsw, FswEvent::SetRecFileCnt as u8, OneInt, "10"),
    cmd(INIT_TIME, Fsw, FswEvent::SetRecPctUsed as u8, OneFlt, "5"),
    cmd(INIT_TIME, Comm, CommEvent::SetDataRate as u8, OneInt, "1024"),
    cmd(INIT_TIME, Comm, CommEvent::SetTdrsId as u8, OneInt, "2"),
    bare(INIT_TIME, Instr, InstrEvent::EnaPower as u8),
    bare(INIT_TIME, Instr, InstrEvent::EnaScience as u8),
    cmd(INIT_TIME, Power, PowerEvent::SetBattSoc as u8, OneFlt, "50"),
    cmd(INIT_TIME, Power, PowerEvent::SetSaCurrent as u8, OneFlt, "0"),
    cmd(INIT_TIME, Therm, ThermEvent::EnaHeater1 as u8, OneInt, "1"),
    cmd(INIT_TIME, Therm, ThermEvent::EnaHeater2 as u8, OneInt, "1"),
    // Time lapse
    bare(REALTIME_EPOCH - 3500, Fsw, FswEvent::ClrEvtLog as u8),
    bare(REALTIME_EPOCH - 2400, Adcs, AdcsEvent::ExitEclipse as u8),
    bare(REALTIME_EPOCH - 1400, Cdh, CdhEvent::WatchdogRst as u8),
    cmd(REALTIME_EPOCH - 1398, Adcs, AdcsEvent::SetMode as u8, OneInt, "1"),
    bare(REALTIME_EPOCH - 1396, Instr, InstrEvent::DisPower as u8),
    bare(REALTIME_EPOCH - 1394, Instr, InstrEvent::DisScience as u8),
    // Realtime
    cmd(REALTIME_EPOCH, Comm, CommEvent::SchAos as u8, ThreeInt, "30 240 1"),
    cmd(REALTIME_EPOCH, Comm, CommEvent::SetTdrsId as u8, OneInt, "1"),
    bare(REALTIME_EPOCH + 120, Adcs, AdcsEvent::EnterEclipse as u8),
    bare(REALTIME_EPOCH + 300, Sim, SimEvent::StopSim as u8),
    END_MARKER,
    END_MARKER,
    END_MARKER,
];

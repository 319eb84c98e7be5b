//! Event identifiers attached to log records as the `eid` field.
//!
//! Ground tools filter on these numbers, so they stay stable across releases.

pub const SIM_BASE_EID: u16 = 10;

pub const START_SIM_EID: u16 = SIM_BASE_EID;
pub const START_SIM_ERR_EID: u16 = SIM_BASE_EID + 1;
pub const STOP_SIM_EID: u16 = SIM_BASE_EID + 2;
pub const LOAD_CFG_EID: u16 = SIM_BASE_EID + 3;
pub const START_REC_PLBK_EID: u16 = SIM_BASE_EID + 5;
pub const STOP_REC_PLBK_EID: u16 = SIM_BASE_EID + 6;
pub const ADD_EVENT_EID: u16 = SIM_BASE_EID + 7;
pub const EXECUTE_EVENT_EID: u16 = SIM_BASE_EID + 8;
pub const EVENT_ERR_EID: u16 = SIM_BASE_EID + 9;
pub const EXECUTE_EID: u16 = SIM_BASE_EID + 10;
pub const PROCESS_JSON_CMD_EID: u16 = SIM_BASE_EID + 12;

pub const ADCS_ENTER_ECLIPSE_EID: u16 = SIM_BASE_EID + 20;
pub const ADCS_EXIT_ECLIPSE_EID: u16 = SIM_BASE_EID + 21;
pub const ADCS_CHANGE_MODE_EID: u16 = SIM_BASE_EID + 22;

pub const CDH_WATCHDOG_RESET_EID: u16 = SIM_BASE_EID + 30;
pub const CDH_HW_CMD_EID: u16 = SIM_BASE_EID + 31;

pub const COMM_START_CONTACT_EID: u16 = SIM_BASE_EID + 40;
pub const COMM_PROCESS_EVENT_EID: u16 = SIM_BASE_EID + 41;

pub const INSTR_DIS_POWER_EID: u16 = SIM_BASE_EID + 60;

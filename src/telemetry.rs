use crate::event::EventCmd;
use crate::subsystems::{Model, ModelSet};
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Time and id of the last event a model processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEventTlm {
    pub time: i32,
    pub id: u8,
}

impl From<&EventCmd> for LastEventTlm {
    fn from(cmd: &EventCmd) -> Self {
        Self {
            time: cmd.time,
            id: cmd.id,
        }
    }
}

/// Simulation management snapshot, published every engine cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MgmtTlm {
    pub sequence: u32,
    pub sim_time: u32,
    pub sim_active: bool,
    pub sim_phase: u8,
    pub contact_time_pending: i16,
    pub contact_length: u16,
    pub contact_time_consumed: u16,
    pub contact_time_remaining: u16,
    pub last_event_subsys: u8,
    pub last_event_id: u8,
    pub next_event_subsys: u8,
    pub next_event_id: u8,
    pub adcs_last_event: LastEventTlm,
    pub cdh_last_event: LastEventTlm,
    pub comm_last_event: LastEventTlm,
    pub fsw_last_event: LastEventTlm,
    pub instr_last_event: LastEventTlm,
    pub power_last_event: LastEventTlm,
    pub therm_last_event: LastEventTlm,
}

impl MgmtTlm {
    pub fn build(
        sequence: u32,
        sim_time: u32,
        active: bool,
        phase: u8,
        timeline: &Timeline,
        models: &ModelSet,
    ) -> Self {
        let contact = models.comm.contact();
        let last = timeline.last_cmd();
        let next = timeline.next_cmd();

        Self {
            sequence,
            sim_time,
            sim_active: active,
            sim_phase: phase,
            contact_time_pending: contact.time_pending,
            contact_length: contact.length,
            contact_time_consumed: contact.time_consumed,
            contact_time_remaining: contact.time_remaining,
            last_event_subsys: last.subsystem as u8,
            last_event_id: last.id,
            next_event_subsys: next.subsystem as u8,
            next_event_id: next.id,
            adcs_last_event: models.adcs.last_event_cmd().into(),
            cdh_last_event: models.cdh.last_event_cmd().into(),
            comm_last_event: models.comm.last_event_cmd().into(),
            fsw_last_event: models.fsw.last_event_cmd().into(),
            instr_last_event: models.instr.last_event_cmd().into(),
            power_last_event: models.power.last_event_cmd().into(),
            therm_last_event: models.therm.last_event_cmd().into(),
        }
    }
}

/// Model state snapshot. Published only during ground contact unless the
/// always-publish override is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTlm {
    pub sequence: u32,
    pub adcs_eclipse: bool,
    pub adcs_mode: u8,
    pub cdh_sbc_rst_cnt: u16,
    pub cdh_hw_cmd_cnt: u16,
    pub cdh_last_hw_cmd: u8,
    pub comm_in_contact: bool,
    pub comm_contact_time_pending: i16,
    pub comm_contact_time_consumed: u16,
    pub comm_contact_time_remaining: u16,
    pub comm_contact_link: u8,
    pub comm_contact_tdrs_id: u16,
    pub comm_contact_data_rate: u16,
    pub fsw_rec_pct_used: f32,
    pub fsw_rec_file_cnt: u16,
    pub fsw_rec_playback_ena: bool,
    pub instr_pwr_ena: bool,
    pub instr_sci_ena: bool,
    pub instr_file_cnt: i16,
    pub instr_file_cyc_cnt: i16,
    pub power_batt_soc: f32,
    pub power_sa_current: f32,
    pub therm_heater1_ena: bool,
    pub therm_heater2_ena: bool,
}

impl ModelTlm {
    pub fn build(sequence: u32, models: &ModelSet) -> Self {
        let adcs = models.adcs.state();
        let cdh = models.cdh.state();
        let comm = models.comm.state();
        let fsw = models.fsw.state();
        let instr = models.instr.state();
        let power = models.power.state();
        let therm = models.therm.state();

        Self {
            sequence,
            adcs_eclipse: adcs.eclipse,
            adcs_mode: adcs.mode as u8,
            cdh_sbc_rst_cnt: cdh.sbc_rst_cnt,
            cdh_hw_cmd_cnt: cdh.hw_cmd_cnt,
            cdh_last_hw_cmd: cdh.last_hw_cmd as u8,
            comm_in_contact: comm.in_contact,
            comm_contact_time_pending: comm.contact.time_pending,
            comm_contact_time_consumed: comm.contact.time_consumed,
            comm_contact_time_remaining: comm.contact.time_remaining,
            comm_contact_link: comm.contact.link as u8,
            comm_contact_tdrs_id: comm.contact.tdrs_id,
            comm_contact_data_rate: comm.contact.data_rate,
            fsw_rec_pct_used: fsw.pct_used,
            fsw_rec_file_cnt: fsw.file_cnt,
            fsw_rec_playback_ena: fsw.playback_ena,
            instr_pwr_ena: instr.pwr_ena,
            instr_sci_ena: instr.sci_ena,
            instr_file_cnt: instr.file_cnt,
            instr_file_cyc_cnt: instr.file_cyc_cnt,
            power_batt_soc: power.batt_soc,
            power_sa_current: power.sa_current,
            therm_heater1_ena: therm.heater1_ena,
            therm_heater2_ena: therm.heater2_ena,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_mgmt_snapshot() {
        let timeline = Timeline::new();
        let models = ModelSet::new();
        let tlm = MgmtTlm::build(1, 0, false, 0, &timeline, &models);

        assert_eq!(tlm.contact_time_pending, -1);
        // Idle placeholder is the SIM idle event
        assert_eq!(tlm.next_event_subsys, 1);
        assert_eq!(tlm.next_event_id, 1);
        assert_eq!(tlm.adcs_last_event, LastEventTlm { time: 0, id: 0 });
    }

    #[test]
    fn test_model_snapshot_field_names() {
        let models = ModelSet::new();
        let json = serde_json::to_value(ModelTlm::build(7, &models)).unwrap();

        assert_eq!(json["adcs_eclipse"], true);
        assert_eq!(json["comm_contact_time_pending"], -1);
        assert_eq!(json["fsw_rec_file_cnt"], 0);
        assert!(json.get("therm_heater2_ena").is_some());
    }
}

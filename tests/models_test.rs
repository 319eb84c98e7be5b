use scsim::event::{EventCmd, EventCmdParam, ParamKind, SubsystemId};
use scsim::subsystems::{
    AdcsEvent, AdcsMode, AdcsModel, CdhEvent, CdhModel, CommEvent, CommLink, CommModel, DispatchCtx,
    ExecEnv, FswEvent, FswModel, HardwareCmd, InstrEvent, InstrModel, Model, ModelSet, Notice,
    PowerEvent, PowerModel, ThermEvent, ThermModel,
};

fn event(time: i32, subsystem: SubsystemId, id: u8, kind: ParamKind, param: Option<&'static str>) -> EventCmd {
    EventCmd::new(time, subsystem, id, kind, param)
}

/// Decode the event parameters and hand the event to `model`.
fn apply<M: Model>(model: &mut M, cmd: EventCmd) -> (bool, DispatchCtx) {
    let mut param = EventCmdParam::default();
    param.load(cmd.kind, cmd.param);
    let mut ctx = DispatchCtx::new();
    let recognized = model.process_event_cmd(&cmd, &param, &mut ctx);
    (recognized, ctx)
}

#[cfg(test)]
mod adcs_tests {
    use super::*;

    #[test]
    fn test_adcs_baseline() {
        let adcs = AdcsModel::new();
        let state = adcs.state();
        assert!(state.eclipse);
        assert_eq!(state.mode, AdcsMode::Undef);
        assert_eq!(adcs.last_event_cmd().time, 0);
    }

    #[test]
    fn test_adcs_mode_and_eclipse_events() {
        let mut adcs = AdcsModel::new();

        let (ok, _) = apply(&mut adcs, event(1, SubsystemId::Adcs, AdcsEvent::SetMode as u8, ParamKind::OneInt, Some("2")));
        assert!(ok);
        assert_eq!(adcs.state().mode, AdcsMode::SunPoint);

        let (ok, _) = apply(&mut adcs, event(5, SubsystemId::Adcs, AdcsEvent::ExitEclipse as u8, ParamKind::None, None));
        assert!(ok);
        assert!(!adcs.eclipse());
    }

    #[test]
    fn test_adcs_invalid_mode_keeps_current_mode() {
        let mut adcs = AdcsModel::new();
        apply(&mut adcs, event(1, SubsystemId::Adcs, AdcsEvent::SetMode as u8, ParamKind::OneInt, Some("3")));

        apply(&mut adcs, event(2, SubsystemId::Adcs, AdcsEvent::SetMode as u8, ParamKind::OneInt, Some("7")));
        assert_eq!(adcs.state().mode, AdcsMode::Inertial);
        assert_eq!(adcs.last_event_cmd().time, 2);
    }

    #[test]
    fn test_adcs_reserved_events_still_recorded() {
        let mut adcs = AdcsModel::new();
        let (ok, _) = apply(&mut adcs, event(9, SubsystemId::Adcs, AdcsEvent::SetAttitude as u8, ParamKind::None, None));

        assert!(!ok);
        assert_eq!(adcs.last_event_cmd().id, AdcsEvent::SetAttitude as u8);
        assert_eq!(adcs.last_event_cmd().time, 9);
    }
}

#[cfg(test)]
mod cdh_tests {
    use super::*;

    #[test]
    fn test_cdh_watchdog_counts_reset() {
        let mut cdh = CdhModel::new();
        let (ok, _) = apply(&mut cdh, event(1, SubsystemId::Cdh, CdhEvent::WatchdogRst as u8, ParamKind::None, None));

        assert!(ok);
        assert_eq!(cdh.state().sbc_rst_cnt, 1);
        assert_eq!(cdh.state().hw_cmd_cnt, 0);
    }

    #[test]
    fn test_cdh_hardware_commands() {
        let mut cdh = CdhModel::new();

        apply(&mut cdh, event(1, SubsystemId::Cdh, CdhEvent::SendHwCmd as u8, ParamKind::OneInt, Some("3")));
        assert_eq!(cdh.state().last_hw_cmd, HardwareCmd::SelBootA);
        assert_eq!(cdh.state().sbc_rst_cnt, 0);

        // Reset command also counts as a processor reset
        apply(&mut cdh, event(2, SubsystemId::Cdh, CdhEvent::SendHwCmd as u8, ParamKind::OneInt, Some("1")));
        assert_eq!(cdh.state().last_hw_cmd, HardwareCmd::RstSbc);
        assert_eq!(cdh.state().sbc_rst_cnt, 1);

        let (ok, _) = apply(&mut cdh, event(3, SubsystemId::Cdh, CdhEvent::SendHwCmd as u8, ParamKind::OneInt, Some("9")));
        assert!(!ok);
        assert_eq!(cdh.state().last_hw_cmd, HardwareCmd::Undef);
        assert_eq!(cdh.state().hw_cmd_cnt, 3);
    }
}

#[cfg(test)]
mod comm_tests {
    use super::*;

    fn aos_at(time: i32) -> EventCmd {
        event(time, SubsystemId::Comm, CommEvent::SchAos as u8, ParamKind::ThreeInt, Some("30 240 1"))
    }

    #[test]
    fn test_schedule_aos_spawns_los() {
        let mut comm = CommModel::new();
        let (ok, ctx) = apply(&mut comm, aos_at(10_000));

        assert!(ok);
        assert_eq!(ctx.spawned.len(), 1);
        let los = ctx.spawned[0];
        assert_eq!(los.time, 10_240);
        assert_eq!(los.subsystem, SubsystemId::Comm);
        assert_eq!(los.id, CommEvent::Los as u8);

        let contact = comm.contact();
        assert_eq!(contact.time_pending, 30);
        assert_eq!(contact.length, 240);
        assert_eq!(contact.link, CommLink::Duplex);
        assert!(!comm.in_contact());
    }

    #[test]
    fn test_contact_countdown_and_expiry() {
        let mut comm = CommModel::new();
        let mut env = ExecEnv::default();
        apply(&mut comm, event(1, SubsystemId::Comm, CommEvent::SchAos as u8, ParamKind::ThreeInt, Some("3 2 2")));

        comm.execute(&mut env);
        comm.execute(&mut env);
        assert!(!comm.in_contact());

        comm.execute(&mut env);
        assert!(comm.in_contact());
        assert_eq!(comm.contact().time_remaining, 2);
        assert_eq!(comm.contact().time_pending, 0);

        comm.execute(&mut env);
        assert_eq!(comm.contact().time_consumed, 1);
        assert_eq!(comm.contact().time_remaining, 1);

        comm.execute(&mut env);
        assert!(!comm.in_contact());
        assert_eq!(comm.contact().time_pending, -1);
    }

    #[test]
    fn test_los_ends_contact() {
        let mut comm = CommModel::new();
        let mut env = ExecEnv::default();
        apply(&mut comm, event(1, SubsystemId::Comm, CommEvent::SchAos as u8, ParamKind::ThreeInt, Some("1 100 1")));
        comm.execute(&mut env);
        assert!(comm.in_contact());

        apply(&mut comm, event(20, SubsystemId::Comm, CommEvent::Los as u8, ParamKind::None, None));
        assert!(!comm.in_contact());
        assert_eq!(comm.contact().length, 0);
        assert_eq!(comm.contact().link, CommLink::Undef);
    }

    #[test]
    fn test_link_settings() {
        let mut comm = CommModel::new();
        apply(&mut comm, event(1, SubsystemId::Comm, CommEvent::SetDataRate as u8, ParamKind::OneInt, Some("2048")));
        apply(&mut comm, event(1, SubsystemId::Comm, CommEvent::SetTdrsId as u8, ParamKind::OneInt, Some("0x2")));

        assert_eq!(comm.contact().data_rate, 2048);
        assert_eq!(comm.contact().tdrs_id, 2);
    }
}

#[cfg(test)]
mod fsw_tests {
    use super::*;

    #[test]
    fn test_playback_drains_files_then_stops() {
        let mut fsw = FswModel::new();
        let mut env = ExecEnv::default();
        apply(&mut fsw, event(1, SubsystemId::Fsw, FswEvent::SetRecFileCnt as u8, ParamKind::OneInt, Some("2")));
        fsw.set_playback(true);

        fsw.execute(&mut env);
        assert_eq!(fsw.state().file_cnt, 1);
        fsw.execute(&mut env);
        assert_eq!(fsw.state().file_cnt, 0);
        assert!(fsw.state().playback_ena);

        fsw.execute(&mut env);
        assert!(!fsw.state().playback_ena);
    }

    #[test]
    fn test_clear_event_log_notice() {
        let mut fsw = FswModel::new();
        let (ok, ctx) = apply(&mut fsw, event(1, SubsystemId::Fsw, FswEvent::ClrEvtLog as u8, ParamKind::None, None));

        assert!(ok);
        assert_eq!(ctx.notices.as_slice(), &[Notice::ClearEventLog]);
    }

    #[test]
    fn test_pct_used_event() {
        let mut fsw = FswModel::new();
        apply(&mut fsw, event(1, SubsystemId::Fsw, FswEvent::SetRecPctUsed as u8, ParamKind::OneFlt, Some("12.5")));
        assert!((fsw.state().pct_used - 12.5).abs() < f32::EPSILON);
    }
}

#[cfg(test)]
mod instrument_tests {
    use super::*;

    fn powered_instrument() -> InstrModel {
        let mut instr = InstrModel::new();
        apply(&mut instr, event(1, SubsystemId::Instr, InstrEvent::EnaPower as u8, ParamKind::None, None));
        apply(&mut instr, event(1, SubsystemId::Instr, InstrEvent::EnaScience as u8, ParamKind::None, None));
        instr
    }

    #[test]
    fn test_file_produced_every_thirty_seconds() {
        let mut instr = powered_instrument();
        let mut env = ExecEnv::default();

        for _ in 0..29 {
            instr.execute(&mut env);
        }
        assert_eq!(env.new_files, 0);
        assert_eq!(instr.state().file_cyc_cnt, 29);

        instr.execute(&mut env);
        assert_eq!(env.new_files, 1);
        assert_eq!(instr.state().file_cnt, 1);
        assert_eq!(instr.state().file_cyc_cnt, 0);
    }

    #[test]
    fn test_science_off_resets_cycle() {
        let mut instr = powered_instrument();
        let mut env = ExecEnv::default();
        for _ in 0..10 {
            instr.execute(&mut env);
        }

        apply(&mut instr, event(2, SubsystemId::Instr, InstrEvent::DisScience as u8, ParamKind::None, None));
        instr.execute(&mut env);
        assert_eq!(instr.state().file_cyc_cnt, 0);
        assert_eq!(env.new_files, 0);
    }

    #[test]
    fn test_model_set_moves_files_to_recorder() {
        let mut models = ModelSet::new();
        let param = EventCmdParam::default();
        let mut ctx = DispatchCtx::new();
        for id in [InstrEvent::EnaPower, InstrEvent::EnaScience] {
            let cmd = event(1, SubsystemId::Instr, id as u8, ParamKind::None, None);
            assert_eq!(models.dispatch(&cmd, &param, &mut ctx), Some(true));
        }

        for _ in 0..60 {
            models.execute();
        }
        assert_eq!(models.fsw.state().file_cnt, 2);
        assert_eq!(models.instr.state().file_cnt, 2);
    }

    #[test]
    fn test_interrupted_science_produces_no_file() {
        let mut models = ModelSet::new();
        let param = EventCmdParam::default();
        let mut ctx = DispatchCtx::new();
        let mut send = |models: &mut ModelSet, id: InstrEvent| {
            let cmd = event(1, SubsystemId::Instr, id as u8, ParamKind::None, None);
            models.dispatch(&cmd, &param, &mut ctx);
        };

        send(&mut models, InstrEvent::EnaPower);
        send(&mut models, InstrEvent::EnaScience);
        for _ in 0..29 {
            models.execute();
        }
        send(&mut models, InstrEvent::DisScience);
        models.execute();

        send(&mut models, InstrEvent::EnaScience);
        models.execute();
        assert_eq!(models.instr.state().file_cnt, 0);
        assert_eq!(models.instr.state().file_cyc_cnt, 1);
        assert_eq!(models.fsw.state().file_cnt, 0);
    }
}

#[cfg(test)]
mod power_tests {
    use super::*;

    #[test]
    fn test_charge_clamps_at_full() {
        let mut power = PowerModel::new();
        let mut env = ExecEnv { eclipse: false, new_files: 0 };
        apply(&mut power, event(1, SubsystemId::Power, PowerEvent::SetBattSoc as u8, ParamKind::OneFlt, Some("99.98")));

        power.execute(&mut env);
        power.execute(&mut env);
        let state = power.state();
        assert_eq!(state.batt_soc, 100.0);
        assert_eq!(state.sa_current, 10.0);
    }

    #[test]
    fn test_discharge_has_no_floor() {
        let mut power = PowerModel::new();
        let mut env = ExecEnv { eclipse: true, new_files: 0 };

        power.execute(&mut env);
        let state = power.state();
        assert!(state.batt_soc < 0.0);
        assert!((state.batt_soc + 0.02).abs() < 1e-6);
        assert_eq!(state.sa_current, 0.0);
    }

    #[test]
    fn test_one_percent_per_fifty_seconds() {
        let mut power = PowerModel::new();
        let mut env = ExecEnv { eclipse: false, new_files: 0 };
        apply(&mut power, event(1, SubsystemId::Power, PowerEvent::SetBattSoc as u8, ParamKind::OneFlt, Some("50")));

        for _ in 0..50 {
            power.execute(&mut env);
        }
        assert!((power.state().batt_soc - 51.0).abs() < 1e-3);
    }
}

#[cfg(test)]
mod thermal_tests {
    use super::*;

    #[test]
    fn test_heater_events_then_eclipse_override() {
        let mut therm = ThermModel::new();
        let (ok, _) = apply(&mut therm, event(1, SubsystemId::Therm, ThermEvent::EnaHeater1 as u8, ParamKind::OneInt, Some("1")));
        assert!(ok);
        assert!(therm.state().heater1_ena);
        assert!(!therm.state().heater2_ena);

        therm.execute(&mut ExecEnv { eclipse: false, new_files: 0 });
        assert!(!therm.state().heater1_ena);

        therm.execute(&mut ExecEnv { eclipse: true, new_files: 0 });
        assert!(therm.state().heater1_ena);
        assert!(therm.state().heater2_ena);
    }
}

#[cfg(test)]
mod dispatch_tests {
    use super::*;

    #[test]
    fn test_sim_events_are_not_routed_to_models() {
        let mut models = ModelSet::new();
        let mut ctx = DispatchCtx::new();
        let cmd = event(1, SubsystemId::Sim, 2, ParamKind::None, None);

        assert_eq!(models.dispatch(&cmd, &EventCmdParam::default(), &mut ctx), None);
    }

    #[test]
    fn test_each_model_owns_its_subsystem() {
        assert_eq!(AdcsModel::SUBSYSTEM, SubsystemId::Adcs);
        assert_eq!(CdhModel::SUBSYSTEM, SubsystemId::Cdh);
        assert_eq!(CommModel::SUBSYSTEM, SubsystemId::Comm);
        assert_eq!(FswModel::SUBSYSTEM, SubsystemId::Fsw);
        assert_eq!(InstrModel::SUBSYSTEM, SubsystemId::Instr);
        assert_eq!(PowerModel::SUBSYSTEM, SubsystemId::Power);
        assert_eq!(ThermModel::SUBSYSTEM, SubsystemId::Therm);
    }

    #[test]
    fn test_unrecognized_id_is_routed_and_recorded() {
        let mut models = ModelSet::new();
        let mut ctx = DispatchCtx::new();
        let cmd = event(42, SubsystemId::Therm, 9, ParamKind::None, None);

        assert_eq!(models.dispatch(&cmd, &EventCmdParam::default(), &mut ctx), Some(false));
        assert_eq!(models.therm.last_event_cmd().time, 42);
    }

    #[test]
    fn test_init_restores_baseline() {
        let mut models = ModelSet::new();
        let mut ctx = DispatchCtx::new();
        let mut param = EventCmdParam::default();
        let cmd = event(1, SubsystemId::Power, PowerEvent::SetBattSoc as u8, ParamKind::OneFlt, Some("75"));
        param.load(cmd.kind, cmd.param);
        models.dispatch(&cmd, &param, &mut ctx);
        assert_eq!(models.power.state().batt_soc, 75.0);

        models.init();
        assert_eq!(models.power.state().batt_soc, 0.0);
        assert_eq!(models.power.last_event_cmd().time, 0);
    }
}

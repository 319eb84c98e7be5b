use crate::bus::{AppName, BusMessage, SoftwareBus};
use crate::command::{CommandResponse, JsonCmdId, SimCommand};
use crate::config::{SimConfig, MAX_QUIET_APPS};
use crate::eid::{
    EVENT_ERR_EID, EXECUTE_EID, EXECUTE_EVENT_EID, PROCESS_JSON_CMD_EID, START_REC_PLBK_EID,
    START_SIM_EID, START_SIM_ERR_EID, STOP_REC_PLBK_EID, STOP_SIM_EID,
};
use crate::error::{SimError, SimResult};
use crate::event::{
    EventCmd, EventCmdParam, SimEvent, EVT_CMD_NULL_IDX, IDLE_TIME, INIT_TIME, REALTIME_END,
    REALTIME_EPOCH, TIME_LAPSE_EXE_CNT,
};
use crate::scenario::ScenarioId;
use crate::subsystems::{DispatchCtx, ModelSet, Notice};
use crate::telemetry::{MgmtTlm, ModelTlm};
use crate::timeline::{ScenarioTable, Timeline};
use heapless::Vec;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle = 0,
    Init = 1,
    TimeLapse = 2,
    Realtime = 3,
}

/// Discrete time spacecraft simulator.
///
/// The engine owns the timeline and every model. [`SimEngine::execute`] runs
/// one engine cycle; the command methods start and stop runs between cycles.
/// Nothing here is synchronised: concurrent calls are unsafe and a host that
/// shares the engine across tasks must serialise access itself (the `scsim`
/// binary wraps it in a mutex).
pub struct SimEngine<B: SoftwareBus> {
    config: SimConfig,
    quiet_apps: Vec<AppName, MAX_QUIET_APPS>,
    bus: B,

    time: i32,
    active: bool,
    phase: Phase,
    scenario: Option<ScenarioId>,

    timeline: Timeline,
    models: ModelSet,
    param: EventCmdParam,
    tlm_sequence: u32,
}

impl<B: SoftwareBus> SimEngine<B> {
    pub fn new(config: SimConfig, bus: B) -> SimResult<Self> {
        config.validate()?;
        let quiet_apps = config.quiet_app_names()?;

        Ok(Self {
            config,
            quiet_apps,
            bus,
            time: IDLE_TIME,
            active: false,
            phase: Phase::Idle,
            scenario: None,
            timeline: Timeline::new(),
            models: ModelSet::new(),
            param: EventCmdParam::default(),
            tlm_sequence: 0,
        })
    }

    /// Run one engine cycle and publish telemetry.
    pub fn execute(&mut self) {
        if self.active {
            match self.phase {
                Phase::Init => self.run_init(),
                Phase::TimeLapse => self.run_time_lapse(),
                Phase::Realtime => self.run_realtime(),
                Phase::Idle => {}
            }
        }

        self.send_mgmt_tlm();
        if self.models.comm.in_contact() || self.config.model_tlm_always {
            self.send_model_tlm();
        }
    }

    /// Sim time stays fixed while every init-time event is processed.
    fn run_init(&mut self) {
        debug!(eid = EXECUTE_EID, "Init phase: enter");

        while self.active
            && self.timeline.next_index() != EVT_CMD_NULL_IDX
            && self.timeline.next_cmd().time == INIT_TIME
        {
            self.execute_event_cmd();
        }
        if !self.active {
            return;
        }

        let next_time = self.timeline.next_cmd().time;
        if self.timeline.next_index() != EVT_CMD_NULL_IDX && next_time < REALTIME_EPOCH {
            // Time lapse starts with the first time lapse event
            self.phase = Phase::TimeLapse;
            self.set_time(next_time);
        } else {
            self.phase = Phase::Realtime;
            self.set_time(REALTIME_EPOCH);
        }

        debug!(
            eid = EXECUTE_EID,
            "Init phase: exit with next phase {:?} at time {}", self.phase, self.time
        );
    }

    fn run_time_lapse(&mut self) {
        debug!(
            eid = EXECUTE_EID,
            "Time lapse phase: enter at time {}, next cmd time {}",
            self.time,
            self.timeline.next_cmd().time
        );

        let mut exe_cnt = 0;
        while self.time < REALTIME_EPOCH && exe_cnt < TIME_LAPSE_EXE_CNT {
            if self.timeline.is_due(self.time) {
                self.execute_event_cmd();
                if !self.active {
                    return;
                }
            }

            self.models.execute();
            self.time += 1;
            exe_cnt += 1;
        }

        self.set_time(self.time);
        if self.time >= REALTIME_EPOCH {
            self.phase = Phase::Realtime;
        }

        debug!(
            eid = EXECUTE_EID,
            "Time lapse phase: exit with next phase {:?} at time {}", self.phase, self.time
        );
    }

    fn run_realtime(&mut self) {
        if self.timeline.is_due(self.time) {
            self.execute_event_cmd();
            if !self.active {
                return;
            }
        }

        self.models.execute();
        self.time += 1;
        if self.time >= REALTIME_END {
            self.stop_sim();
        }
    }

    /// Decode, route and retire the event at the next cursor.
    fn execute_event_cmd(&mut self) {
        let cmd = *self.timeline.next_cmd();
        debug!(
            eid = EXECUTE_EVENT_EID,
            "Executing {} cmd {} scheduled at {}",
            cmd.subsystem.name(),
            cmd.id,
            cmd.time
        );

        self.param.load(cmd.kind, cmd.param);

        let mut ctx = DispatchCtx::new();
        if self.models.dispatch(&cmd, &self.param, &mut ctx).is_none() {
            self.process_sim_event(&cmd);
        }

        for notice in &ctx.notices {
            match notice {
                Notice::ClearEventLog => {
                    self.bus.transmit(self.config.evs_cmd_topic_id, BusMessage::ClearEventLog);
                }
            }
        }

        for spawned in &ctx.spawned {
            if !self.active {
                break;
            }
            if let Err(err) = self.timeline.insert(*spawned) {
                error!(eid = EVENT_ERR_EID, "Aborting sim: {}", err);
                self.stop_sim();
            }
        }

        // A stop during dispatch has already parked the cursors
        if self.active {
            self.timeline.advance();
        }
    }

    fn process_sim_event(&mut self, cmd: &EventCmd) {
        match SimEvent::from_id(cmd.id) {
            Some(SimEvent::StopSim) => self.stop_sim(),
            _ => debug!(eid = EXECUTE_EVENT_EID, "SIM ignored unrecognized cmd {}", cmd.id),
        }
    }

    fn set_time(&mut self, seconds: i32) {
        self.time = seconds;
        self.bus.transmit(
            self.config.time_cmd_topic_id,
            BusMessage::SetTime {
                seconds: seconds.max(0) as u32,
            },
        );
    }

    fn stop_sim(&mut self) {
        info!(eid = STOP_SIM_EID, "Simulation stopped at {} seconds", self.time);

        self.time = IDLE_TIME;
        self.active = false;
        self.phase = Phase::Idle;
        self.timeline.reset_cursors();

        self.stop_playback();

        for app in &self.quiet_apps {
            self.bus.transmit(
                self.config.evs_cmd_topic_id,
                BusMessage::EnableAppEvents { app: *app },
            );
        }
    }

    /// Begin a run of a canned scenario. Unknown ids are rejected before any
    /// state changes.
    pub fn start_simulation(&mut self, scenario_id: u16) -> SimResult<()> {
        let scenario = ScenarioId::try_from(scenario_id).map_err(|err| {
            error!(
                eid = START_SIM_ERR_EID,
                "Start sim command rejected. Invalid scenario identifier {}. It must be between 1 and 2 inclusively",
                scenario_id
            );
            err
        })?;

        self.scenario = Some(scenario);
        let free = self.begin_run(scenario.table());
        info!(
            eid = START_SIM_EID,
            "Start simulation using scenario {} with {} available runtime cmd entries",
            scenario_id,
            free
        );
        Ok(())
    }

    /// Begin a run of a caller supplied timeline. The table must be time
    /// sorted; slots after the first end marker become runtime capacity.
    pub fn start_custom_scenario(&mut self, table: &ScenarioTable) {
        self.scenario = None;
        let free = self.begin_run(table);
        info!(
            eid = START_SIM_EID,
            "Start simulation using custom scenario with {} available runtime cmd entries", free
        );
    }

    fn begin_run(&mut self, table: &ScenarioTable) -> usize {
        self.set_time(INIT_TIME);
        self.active = true;
        self.phase = Phase::Init;

        // Only the first set time of a run should reach the event log
        for app in &self.quiet_apps {
            self.bus.transmit(
                self.config.evs_cmd_topic_id,
                BusMessage::DisableAppEvents { app: *app },
            );
        }

        self.timeline.activate(table)
    }

    /// Always succeeds, including when already idle.
    pub fn stop_simulation(&mut self) {
        self.stop_sim();
    }

    pub fn start_playback(&mut self) -> SimResult<()> {
        if !self.models.comm.in_contact() {
            error!(
                eid = START_REC_PLBK_EID,
                "Start playback command rejected because not in ground contact"
            );
            return Err(SimError::PlaybackRejected);
        }

        self.models.fsw.set_playback(true);
        self.bus
            .transmit(self.config.kit_to_cmd_topic_id, BusMessage::StartEvtLogPlayback);
        info!(eid = START_REC_PLBK_EID, "FSW recorder playback started");
        Ok(())
    }

    pub fn stop_playback(&mut self) {
        self.models.fsw.set_playback(false);
        self.bus
            .transmit(self.config.kit_to_cmd_topic_id, BusMessage::StopEvtLogPlayback);
        info!(eid = STOP_REC_PLBK_EID, "FSW recorder playback stopped");
    }

    /// Map a single-field JSON command id onto a command operation.
    pub fn process_json_command(&mut self, id: u8) -> SimResult<()> {
        info!(eid = PROCESS_JSON_CMD_EID, "Processing JSON command {}", id);

        match JsonCmdId::from_id(id) {
            Some(JsonCmdId::StartSim1) => self.start_simulation(ScenarioId::GndContact1 as u16),
            Some(JsonCmdId::StartSim2) => self.start_simulation(ScenarioId::GndContact2 as u16),
            Some(JsonCmdId::StopSim) => {
                self.stop_simulation();
                Ok(())
            }
            Some(JsonCmdId::StartEvtPlbk) => self.start_playback(),
            Some(JsonCmdId::StopEvtPlbk) => {
                self.stop_playback();
                Ok(())
            }
            None => {
                error!(
                    eid = PROCESS_JSON_CMD_EID,
                    "Received invalid JSON command ID {}", id
                );
                Err(SimError::InvalidJsonCommand(id))
            }
        }
    }

    pub fn handle_command(&mut self, command: SimCommand) -> CommandResponse {
        let result = match command {
            SimCommand::StartSim { scenario } => self.start_simulation(scenario),
            SimCommand::StopSim => {
                self.stop_simulation();
                Ok(())
            }
            SimCommand::StartPlayback => self.start_playback(),
            SimCommand::StopPlayback => {
                self.stop_playback();
                Ok(())
            }
            SimCommand::Json { id } => self.process_json_command(id),
        };

        match result {
            Ok(()) => CommandResponse::ack(format!("{command:?} accepted")),
            Err(err @ SimError::InvalidJsonCommand(_)) => CommandResponse::invalid(err.to_string()),
            Err(err) => CommandResponse::nack(err.to_string()),
        }
    }

    fn send_mgmt_tlm(&mut self) {
        self.tlm_sequence = self.tlm_sequence.wrapping_add(1);
        let tlm = MgmtTlm::build(
            self.tlm_sequence,
            self.sim_time(),
            self.active,
            self.phase as u8,
            &self.timeline,
            &self.models,
        );
        self.bus
            .transmit(self.config.mgmt_tlm_topic_id, BusMessage::MgmtTlm(tlm));
    }

    fn send_model_tlm(&mut self) {
        let tlm = ModelTlm::build(self.tlm_sequence, &self.models);
        self.bus
            .transmit(self.config.model_tlm_topic_id, BusMessage::ModelTlm(tlm));
    }

    pub fn sim_time(&self) -> u32 {
        self.time.max(0) as u32
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scenario(&self) -> Option<ScenarioId> {
        self.scenario
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Current management snapshot without publishing it.
    pub fn mgmt_snapshot(&self) -> MgmtTlm {
        MgmtTlm::build(
            self.tlm_sequence,
            self.sim_time(),
            self.active,
            self.phase as u8,
            &self.timeline,
            &self.models,
        )
    }

    pub fn model_snapshot(&self) -> ModelTlm {
        ModelTlm::build(self.tlm_sequence, &self.models)
    }
}

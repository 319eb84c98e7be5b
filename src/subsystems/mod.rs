pub mod adcs;
pub mod cdh;
pub mod comms;
pub mod fsw;
pub mod instrument;
pub mod power;
pub mod thermal;

pub use adcs::{AdcsEvent, AdcsMode, AdcsModel, AdcsState};
pub use cdh::{CdhEvent, CdhModel, CdhState, HardwareCmd};
pub use comms::{CommEvent, CommLink, CommModel, CommState, ContactState};
pub use fsw::{FswEvent, FswModel, FswState};
pub use instrument::{InstrEvent, InstrModel, InstrState};
pub use power::{PowerEvent, PowerModel, PowerState};
pub use thermal::{ThermEvent, ThermModel, ThermState};

use crate::eid::EXECUTE_EVENT_EID;
use crate::event::{EventCmd, EventCmdParam, SubsystemId};
use heapless::Vec;
use serde::Serialize;
use tracing::{debug, warn};

pub const MAX_SPAWNED_EVENTS: usize = 2;
pub const MAX_NOTICES: usize = 2;

/// Values one model publishes for others during a simulated second.
///
/// Kept explicit so cross-model reads stay narrow and visible at the call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecEnv {
    /// ADCS eclipse flag, read by power and thermal.
    pub eclipse: bool,
    /// Recorder files produced by the instrument this second.
    pub new_files: u16,
}

/// Requests to collaborators outside the model set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ClearEventLog,
}

/// Side effects collected while a model processes one event.
#[derive(Debug, Default)]
pub struct DispatchCtx {
    pub spawned: Vec<EventCmd, MAX_SPAWNED_EVENTS>,
    pub notices: Vec<Notice, MAX_NOTICES>,
}

impl DispatchCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new timeline entry for insertion once dispatch returns.
    pub fn spawn(&mut self, cmd: EventCmd) {
        if self.spawned.push(cmd).is_err() {
            warn!("Dropped spawned {} cmd {}: dispatch queue full", cmd.subsystem.name(), cmd.id);
        }
    }

    pub fn notify(&mut self, notice: Notice) {
        if self.notices.push(notice).is_err() {
            warn!("Dropped notice {:?}: dispatch queue full", notice);
        }
    }
}

/// Shared contract of every spacecraft model.
pub trait Model {
    type State: Copy + Serialize;

    const SUBSYSTEM: SubsystemId;

    /// Reset to the documented baseline.
    fn init(&mut self);

    /// Advance one simulated second.
    fn execute(&mut self, env: &mut ExecEnv);

    /// Apply one event. Returns false for ids the model does not know; the
    /// event is recorded as the last processed either way.
    fn process_event_cmd(
        &mut self,
        cmd: &EventCmd,
        param: &EventCmdParam,
        ctx: &mut DispatchCtx,
    ) -> bool;

    fn last_event_cmd(&self) -> &EventCmd;

    fn state(&self) -> Self::State;
}

/// The seven spacecraft models, dispatched by subsystem id.
#[derive(Debug, Default)]
pub struct ModelSet {
    pub adcs: AdcsModel,
    pub cdh: CdhModel,
    pub comm: CommModel,
    pub fsw: FswModel,
    pub instr: InstrModel,
    pub power: PowerModel,
    pub therm: ThermModel,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self) {
        self.adcs.init();
        self.cdh.init();
        self.comm.init();
        self.fsw.init();
        self.instr.init();
        self.power.init();
        self.therm.init();
    }

    /// One simulated second for every model, in fixed order.
    pub fn execute(&mut self) {
        let mut env = ExecEnv::default();

        self.adcs.execute(&mut env);
        env.eclipse = self.adcs.eclipse();

        self.cdh.execute(&mut env);
        self.comm.execute(&mut env);
        self.fsw.execute(&mut env);
        self.instr.execute(&mut env);
        self.fsw.add_files(env.new_files);
        self.power.execute(&mut env);
        self.therm.execute(&mut env);
    }

    /// Route an event to its model. `None` when no model owns the subsystem.
    pub fn dispatch(
        &mut self,
        cmd: &EventCmd,
        param: &EventCmdParam,
        ctx: &mut DispatchCtx,
    ) -> Option<bool> {
        let recognized = match cmd.subsystem {
            SubsystemId::Adcs => route(&mut self.adcs, cmd, param, ctx),
            SubsystemId::Cdh => route(&mut self.cdh, cmd, param, ctx),
            SubsystemId::Comm => route(&mut self.comm, cmd, param, ctx),
            SubsystemId::Fsw => route(&mut self.fsw, cmd, param, ctx),
            SubsystemId::Instr => route(&mut self.instr, cmd, param, ctx),
            SubsystemId::Power => route(&mut self.power, cmd, param, ctx),
            SubsystemId::Therm => route(&mut self.therm, cmd, param, ctx),
            SubsystemId::Sim | SubsystemId::Undef => return None,
        };
        Some(recognized)
    }
}

fn route<M: Model>(model: &mut M, cmd: &EventCmd, param: &EventCmdParam, ctx: &mut DispatchCtx) -> bool {
    debug_assert_eq!(cmd.subsystem, M::SUBSYSTEM, "Event routed to the wrong model");

    let recognized = model.process_event_cmd(cmd, param, ctx);
    if !recognized {
        debug!(
            eid = EXECUTE_EVENT_EID,
            "{} ignored unrecognized cmd {}",
            M::SUBSYSTEM.name(),
            cmd.id
        );
    }
    recognized
}

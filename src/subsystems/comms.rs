use super::{DispatchCtx, ExecEnv, Model};
use crate::eid::{COMM_PROCESS_EVENT_EID, COMM_START_CONTACT_EID};
use crate::event::{EventCmd, EventCmdParam, ParamKind, SubsystemId};
use serde::Serialize;
use tracing::{debug, info};

/// `time_pending` value meaning no contact is scheduled.
pub const NO_CONTACT_PENDING: i16 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommEvent {
    SchAos = 1,
    Los = 2,
    SetDataRate = 3,
    SetTdrsId = 4,
    AbortContact = 5,
}

impl CommEvent {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::SchAos),
            2 => Some(Self::Los),
            3 => Some(Self::SetDataRate),
            4 => Some(Self::SetTdrsId),
            5 => Some(Self::AbortContact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommLink {
    Undef = 0,
    Duplex = 1,
    Simplex = 2,
}

impl CommLink {
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => Self::Duplex,
            2 => Self::Simplex,
            _ => Self::Undef,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContactState {
    pub link: CommLink,
    pub tdrs_id: u16,
    pub data_rate: u16,
    /// Countdown to the next contact, negative when none is pending.
    pub time_pending: i16,
    pub length: u16,
    pub time_consumed: u16,
    pub time_remaining: u16,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CommState {
    pub in_contact: bool,
    pub contact: ContactState,
}

/// Ground contact model.
///
/// A scheduled AOS counts down `time_pending` seconds, then holds the contact
/// for `length` seconds or until an LOS/abort event arrives. Scheduling also
/// places the matching LOS event on the timeline.
#[derive(Debug)]
pub struct CommModel {
    state: CommState,
    last_event_cmd: EventCmd,
}

impl Default for CommModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CommModel {
    pub fn new() -> Self {
        Self {
            state: CommState {
                in_contact: false,
                contact: ContactState {
                    link: CommLink::Undef,
                    tdrs_id: 0,
                    data_rate: 0,
                    time_pending: NO_CONTACT_PENDING,
                    length: 0,
                    time_consumed: 0,
                    time_remaining: 0,
                },
            },
            last_event_cmd: EventCmd::idle(SubsystemId::Comm),
        }
    }

    pub fn in_contact(&self) -> bool {
        self.state.in_contact
    }

    pub fn contact(&self) -> &ContactState {
        &self.state.contact
    }

    fn end_contact(&mut self) {
        let contact = &mut self.state.contact;
        self.state.in_contact = false;
        contact.link = CommLink::Undef;
        contact.length = 0;
        contact.time_pending = NO_CONTACT_PENDING;
        contact.time_consumed = 0;
        contact.time_remaining = 0;
    }

    fn schedule_aos(&mut self, cmd: &EventCmd, param: &EventCmdParam, ctx: &mut DispatchCtx) {
        let [pending, length, link] = param.three_int;
        let contact = &mut self.state.contact;
        contact.time_pending = pending as i16;
        contact.length = length as u16;
        contact.link = CommLink::from_value(link);

        self.state.in_contact = false;
        contact.time_consumed = 0;
        contact.time_remaining = 0;

        debug!(
            eid = COMM_PROCESS_EVENT_EID,
            "Scheduled AOS in {}s, for {}s with link type {:?}",
            contact.time_pending,
            contact.length,
            contact.link
        );

        ctx.spawn(EventCmd::new(
            cmd.time + i32::from(contact.length),
            SubsystemId::Comm,
            CommEvent::Los as u8,
            ParamKind::None,
            None,
        ));
    }
}

impl Model for CommModel {
    type State = CommState;

    const SUBSYSTEM: SubsystemId = SubsystemId::Comm;

    fn init(&mut self) {
        *self = Self::new();
    }

    fn execute(&mut self, _env: &mut ExecEnv) {
        if self.state.in_contact {
            let contact = &mut self.state.contact;
            contact.time_consumed = contact.time_consumed.wrapping_add(1);
            contact.time_remaining = contact.time_remaining.saturating_sub(1);
            if contact.time_remaining == 0 {
                self.end_contact();
            }
        } else if self.state.contact.time_pending > 0 {
            let contact = &mut self.state.contact;
            contact.time_pending -= 1;
            if contact.time_pending == 0 {
                self.state.in_contact = true;
                contact.time_consumed = 0;
                contact.time_remaining = contact.length;
                info!(
                    eid = COMM_START_CONTACT_EID,
                    "Started contact with length of {} seconds", contact.length
                );
            }
        }
    }

    fn process_event_cmd(
        &mut self,
        cmd: &EventCmd,
        param: &EventCmdParam,
        ctx: &mut DispatchCtx,
    ) -> bool {
        debug!(eid = COMM_PROCESS_EVENT_EID, "Executing COMM cmd {}", cmd.id);

        let recognized = match CommEvent::from_id(cmd.id) {
            Some(CommEvent::SchAos) => {
                self.schedule_aos(cmd, param, ctx);
                true
            }
            Some(CommEvent::Los | CommEvent::AbortContact) => {
                self.end_contact();
                true
            }
            Some(CommEvent::SetDataRate) => {
                self.state.contact.data_rate = param.one_int as u16;
                true
            }
            Some(CommEvent::SetTdrsId) => {
                self.state.contact.tdrs_id = param.one_int as u16;
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

    fn state(&self) -> CommState {
        self.state
    }
}

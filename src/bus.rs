use crate::telemetry::{MgmtTlm, ModelTlm};
use arrayvec::ArrayString;
use serde::Serialize;

/// Application names are limited to this many bytes.
pub const APP_NAME_MAX: usize = 20;

pub type AppName = ArrayString<APP_NAME_MAX>;

/// Everything the engine sends to the outside world.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMessage {
    MgmtTlm(MgmtTlm),
    ModelTlm(ModelTlm),
    /// Jump the external clock; ordinary one second steps are not published.
    SetTime { seconds: u32 },
    EnableAppEvents { app: AppName },
    DisableAppEvents { app: AppName },
    ClearEventLog,
    StartEvtLogPlayback,
    StopEvtLogPlayback,
}

/// Outbound message sink. Topic ids are opaque and come from configuration.
pub trait SoftwareBus {
    fn transmit(&mut self, topic_id: u32, msg: BusMessage);
}

/// Keeps every transmitted message in order.
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub messages: Vec<(u32, BusMessage)>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn on_topic(&self, topic_id: u32) -> impl Iterator<Item = &BusMessage> {
        self.messages
            .iter()
            .filter(move |(topic, _)| *topic == topic_id)
            .map(|(_, msg)| msg)
    }

    pub fn mgmt_tlm(&self) -> impl Iterator<Item = &MgmtTlm> {
        self.messages.iter().filter_map(|(_, msg)| match msg {
            BusMessage::MgmtTlm(tlm) => Some(tlm),
            _ => None,
        })
    }

    pub fn model_tlm(&self) -> impl Iterator<Item = &ModelTlm> {
        self.messages.iter().filter_map(|(_, msg)| match msg {
            BusMessage::ModelTlm(tlm) => Some(tlm),
            _ => None,
        })
    }
}

impl SoftwareBus for RecordingBus {
    fn transmit(&mut self, topic_id: u32, msg: BusMessage) {
        self.messages.push((topic_id, msg));
    }
}

impl<B: SoftwareBus + ?Sized> SoftwareBus for &mut B {
    fn transmit(&mut self, topic_id: u32, msg: BusMessage) {
        (**self).transmit(topic_id, msg);
    }
}

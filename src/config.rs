use crate::bus::{AppName, APP_NAME_MAX};
use crate::eid::LOAD_CFG_EID;
use crate::error::{SimError, SimResult};
use heapless::Vec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const MAX_QUIET_APPS: usize = 4;

const DEFAULT_APP_NAME: &str = "SC_SIM";
const DEFAULT_MGMT_TLM_TOPICID: u32 = 0x08F2;
const DEFAULT_MODEL_TLM_TOPICID: u32 = 0x08F3;
const DEFAULT_KIT_TO_CMD_TOPICID: u32 = 0x1880;
const DEFAULT_EVS_CMD_TOPICID: u32 = 0x1801;
const DEFAULT_TIME_CMD_TOPICID: u32 = 0x1805;
const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

/// Engine configuration, read once at construction.
///
/// Keys match the application's JSON init file. Missing keys take defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    #[serde(rename = "APP_CFE_NAME")]
    pub app_name: String,
    #[serde(rename = "SC_SIM_MGMT_TLM_TOPICID")]
    pub mgmt_tlm_topic_id: u32,
    #[serde(rename = "SC_SIM_MODEL_TLM_TOPICID")]
    pub model_tlm_topic_id: u32,
    /// Recorder playback collaborator.
    #[serde(rename = "KIT_TO_CMD_TOPICID")]
    pub kit_to_cmd_topic_id: u32,
    /// Event service: app event enable/disable and log clearing.
    #[serde(rename = "EVS_CMD_TOPICID")]
    pub evs_cmd_topic_id: u32,
    #[serde(rename = "TIME_CMD_TOPICID")]
    pub time_cmd_topic_id: u32,
    /// Apps whose informational events are muted while a simulation runs.
    #[serde(rename = "QUIET_APPS")]
    pub quiet_apps: std::vec::Vec<String>,
    #[serde(rename = "MODEL_TLM_ALWAYS")]
    pub model_tlm_always: bool,
    #[serde(rename = "TICK_PERIOD_MS")]
    pub tick_period_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_owned(),
            mgmt_tlm_topic_id: DEFAULT_MGMT_TLM_TOPICID,
            model_tlm_topic_id: DEFAULT_MODEL_TLM_TOPICID,
            kit_to_cmd_topic_id: DEFAULT_KIT_TO_CMD_TOPICID,
            evs_cmd_topic_id: DEFAULT_EVS_CMD_TOPICID,
            time_cmd_topic_id: DEFAULT_TIME_CMD_TOPICID,
            quiet_apps: ["CFE_SB", "CFE_TIME", "KIT_SCH"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            model_tlm_always: false,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(text: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        info!(eid = LOAD_CFG_EID, "Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.quiet_app_names()?;
        if self.tick_period_ms == 0 {
            return Err(SimError::Config("TICK_PERIOD_MS must be non-zero".to_owned()));
        }
        Ok(())
    }

    /// Quiet app names as bounded strings.
    pub fn quiet_app_names(&self) -> SimResult<Vec<AppName, MAX_QUIET_APPS>> {
        let mut names = Vec::new();
        for app in &self.quiet_apps {
            let name = AppName::from(app.as_str()).map_err(|_| {
                SimError::Config(format!("App name '{app}' exceeds {APP_NAME_MAX} characters"))
            })?;
            names
                .push(name)
                .map_err(|_| SimError::Config(format!("More than {MAX_QUIET_APPS} quiet apps")))?;
        }
        Ok(names)
    }

    /// Integer value of a configuration key, by its init file name.
    pub fn int_config(&self, key: &str) -> SimResult<u64> {
        let value = match key {
            "SC_SIM_MGMT_TLM_TOPICID" => u64::from(self.mgmt_tlm_topic_id),
            "SC_SIM_MODEL_TLM_TOPICID" => u64::from(self.model_tlm_topic_id),
            "KIT_TO_CMD_TOPICID" => u64::from(self.kit_to_cmd_topic_id),
            "EVS_CMD_TOPICID" => u64::from(self.evs_cmd_topic_id),
            "TIME_CMD_TOPICID" => u64::from(self.time_cmd_topic_id),
            "MODEL_TLM_ALWAYS" => u64::from(self.model_tlm_always),
            "TICK_PERIOD_MS" => self.tick_period_ms,
            _ => return Err(SimError::Config(format!("Unknown integer config key {key}"))),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = SimConfig::from_json_str(r#"{"SC_SIM_MGMT_TLM_TOPICID": 100}"#).unwrap();
        assert_eq!(config.mgmt_tlm_topic_id, 100);
        assert_eq!(config.model_tlm_topic_id, DEFAULT_MODEL_TLM_TOPICID);
        assert_eq!(config.quiet_app_names().unwrap().len(), 3);
        assert_eq!(config.int_config("SC_SIM_MGMT_TLM_TOPICID").unwrap(), 100);
        assert!(config.int_config("NOT_A_KEY").is_err());
    }

    #[test]
    fn test_long_app_name_rejected() {
        let text = r#"{"QUIET_APPS": ["AN_APPLICATION_NAME_TOO_LONG"]}"#;
        assert!(matches!(SimConfig::from_json_str(text), Err(SimError::Config(_))));
    }

    #[test]
    fn test_zero_tick_rejected() {
        assert!(SimConfig::from_json_str(r#"{"TICK_PERIOD_MS": 0}"#).is_err());
    }
}

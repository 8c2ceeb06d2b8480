//! Resuming an interrupted run from a persisted snapshot.

use serde::{Deserialize, Serialize};

use super::persistence::PersistenceParams;
use crate::types::{AgentInput, LlmConfig, Message};

/// Everything needed to continue a run after the last persisted step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoveryData {
    pub messages: Vec<Message>,
    #[serde(default)]
    pub input: Option<AgentInput>,
    /// Last completed step; the resumed run starts at `step + 1`.
    pub step: usize,
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default)]
    pub llm_config: LlmConfig,
}

/// Summary of a snapshot, for logging before a resume.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryInfo {
    pub current_step: usize,
    pub message_count: usize,
    pub last_message: Option<Message>,
}

impl RecoveryData {
    pub fn info(&self) -> RecoveryInfo {
        RecoveryInfo {
            current_step: self.step,
            message_count: self.messages.len(),
            last_message: self.messages.last().cloned(),
        }
    }
}

impl From<PersistenceParams> for RecoveryData {
    fn from(params: PersistenceParams) -> Self {
        let input = match params.input {
            serde_json::Value::Null => None,
            other => Some(AgentInput::from(other)),
        };
        Self {
            messages: params.messages,
            input,
            step: params.step,
            context: params.context,
            llm_config: params.llm_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn info_reports_last_message() {
        let data = RecoveryData {
            messages: vec![Message::system("s"), Message::user("q")],
            input: Some("q".into()),
            step: 4,
            context: json!({}),
            llm_config: LlmConfig::default(),
        };

        let info = data.info();

        assert_eq!(info.current_step, 4);
        assert_eq!(info.message_count, 2);
        assert_eq!(info.last_message, Some(Message::user("q")));
    }

    #[test]
    fn null_input_converts_to_none() {
        let data = RecoveryData::from(PersistenceParams {
            agent: "a".into(),
            messages: vec![],
            step: 1,
            input: serde_json::Value::Null,
            context: json!(null),
            llm_config: LlmConfig::default(),
        });

        assert!(data.input.is_none());
        assert_eq!(data.step, 1);
    }
}

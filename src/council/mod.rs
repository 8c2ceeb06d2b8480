//! Turn-based multi-agent orchestration.
//!
//! A president picks the next speaker each round against a shared minutes
//! log; the chosen senator runs on the minutes; a secretary summarizes once
//! the president says `FINISH` or the round budget runs out. Speakers run
//! one at a time, so the minutes have a single writer.

pub mod dais;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::{Agent, RunOptions};
use crate::config::settings::{Settings, DEFAULT_COUNCIL_MAX_ROUNDS, DEFAULT_MAX_INVALID_SELECTIONS};
use crate::error::{CuriaError, Result};
use crate::memory::Memory;
use crate::provider::ModelProvider;
use crate::schema::OutputSchema;
use crate::types::{AgentInput, AgentOutput, Message};
use crate::util::normalize_name;

pub use dais::FINISH;

/// A president, its senators and a secretary sharing one minutes log.
pub struct Council {
    name: String,
    senators: Vec<Agent>,
    president: Agent,
    secretary: Agent,
    minutes: Memory,
    max_rounds: usize,
    max_invalid_selections: usize,
    current_round: usize,
    cancel: CancellationToken,
}

impl Council {
    /// Fails when senators share a normalized name.
    pub fn new(
        name: impl Into<String>,
        senators: Vec<Agent>,
        president_provider: Arc<dyn ModelProvider>,
        secretary_provider: Arc<dyn ModelProvider>,
    ) -> Result<Self> {
        let name = name.into();
        let president = dais::president(&senators, president_provider)?;
        let secretary = dais::secretary(secretary_provider);

        let mut minutes = Memory::new(format!("{name} minutes"), president.instructions())
            .with_max_history(president.max_message_history());
        let council_name = name.clone();
        minutes.on_change(move |change| {
            debug!(
                council = %council_name,
                kind = ?change.kind,
                before = change.before,
                after = change.after,
                "Minutes changed"
            );
        });

        Ok(Self {
            name,
            senators,
            president,
            secretary,
            minutes,
            max_rounds: DEFAULT_COUNCIL_MAX_ROUNDS,
            max_invalid_selections: DEFAULT_MAX_INVALID_SELECTIONS,
            current_round: 0,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Replace the secretary's `{summary, final_answer}` output shape.
    pub fn with_output_schema(mut self, schema: impl OutputSchema + 'static) -> Self {
        self.secretary = self.secretary.with_output_schema(schema);
        self
    }

    /// Consecutive invalid speaker picks tolerated before summarizing.
    pub fn with_max_invalid_selections(mut self, max_invalid_selections: usize) -> Self {
        self.max_invalid_selections = max_invalid_selections.max(1);
        self
    }

    /// Cancellation forwarded to the president and every speaker.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_settings(self, settings: &Settings) -> Self {
        self.with_max_rounds(settings.council_max_rounds)
            .with_max_invalid_selections(settings.max_invalid_selections)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rounds in which a senator spoke during the latest run.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn minutes(&self) -> &Memory {
        &self.minutes
    }

    pub fn senators(&self) -> &[Agent] {
        &self.senators
    }

    pub fn president(&self) -> &Agent {
        &self.president
    }

    pub fn secretary(&self) -> &Agent {
        &self.secretary
    }

    /// Deliberate on `input` and return the secretary's write-up.
    ///
    /// President failures propagate. Senator failures are recorded in the
    /// minutes and the president is asked again.
    pub async fn run(&mut self, input: impl Into<AgentInput>) -> Result<AgentOutput> {
        let content = match input.into() {
            AgentInput::Text(text) => text,
            AgentInput::Structured(value) => value.to_string(),
        };

        self.current_round = 0;
        self.minutes.reset();
        self.minutes.replace_system_message(self.president.instructions());
        self.minutes.add([Message::user(content)]);
        info!(council = %self.name, senators = self.senators.len(), "Council convened");

        let mut invalid_selections = 0;
        while self.current_round < self.max_rounds {
            let options = self.run_options();
            let decision = self.president.run_on(&mut self.minutes, options).await?;
            let next_speaker = next_speaker(&decision);

            if next_speaker.is_empty() || next_speaker.eq_ignore_ascii_case(FINISH) {
                debug!(council = %self.name, round = self.current_round, "President finished");
                break;
            }

            let Some(index) = find_speaker(&self.senators, &next_speaker) else {
                invalid_selections += 1;
                warn!(
                    council = %self.name,
                    selected = %next_speaker,
                    invalid_selections,
                    "President selected an unknown speaker"
                );
                let names: Vec<&str> = self.senators.iter().map(Agent::name).collect();
                self.minutes.add([Message::system(format!(
                    "Manager selected an invalid agent '{next_speaker}'. Please choose a valid agent from {} or {FINISH}.",
                    names.join(", ")
                ))]);
                if invalid_selections >= self.max_invalid_selections {
                    break;
                }
                continue;
            };

            invalid_selections = 0;
            self.current_round += 1;
            let options = self.run_options();
            let speaker = &mut self.senators[index];
            debug!(council = %self.name, round = self.current_round, speaker = speaker.name(), "Speaker selected");

            match speaker.run_on(&mut self.minutes, options).await {
                Ok(AgentOutput::Text(text)) if !text.is_empty() => {
                    self.minutes
                        .replace_last_reply(Message::assistant(text).with_name(speaker.name()));
                }
                Ok(AgentOutput::Text(_)) => {}
                Ok(AgentOutput::Structured(value)) => {
                    self.minutes.replace_last_reply(
                        Message::assistant(value.to_string()).with_name(speaker.name()),
                    );
                }
                Err(CuriaError::Aborted) => return Err(CuriaError::Aborted),
                Err(err) => {
                    warn!(council = %self.name, speaker = speaker.name(), error = %err, "Speaker failed");
                    self.minutes.add([Message::system(format!(
                        "{} encountered an error: {err}. Manager, please choose next speaker or {FINISH}.",
                        speaker.name()
                    ))]);
                }
            }
        }

        info!(council = %self.name, rounds = self.current_round, "Council adjourned");
        self.secretary
            .run_on(&mut self.minutes, RunOptions::new())
            .await
    }

    fn run_options(&self) -> RunOptions {
        RunOptions::new().with_cancel(self.cancel.clone())
    }
}

/// The president's pick: `next_speaker` of a structured answer, otherwise
/// the trimmed text.
fn next_speaker(decision: &AgentOutput) -> String {
    match decision {
        AgentOutput::Structured(value) => value
            .get("next_speaker")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string(),
        AgentOutput::Text(text) => text.trim().to_string(),
    }
}

/// Case- and whitespace-insensitive match against senator names.
fn find_speaker(senators: &[Agent], selected: &str) -> Option<usize> {
    let wanted = normalize_name(selected);
    senators
        .iter()
        .position(|senator| normalize_name(senator.name()) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_decision_reads_next_speaker() {
        let decision = AgentOutput::Structured(json!({ "next_speaker": " Tax Expert " }));
        assert_eq!(next_speaker(&decision), "Tax Expert");
    }

    #[test]
    fn text_decision_is_trimmed() {
        assert_eq!(next_speaker(&AgentOutput::Text("FINISH\n".into())), "FINISH");
    }

    #[test]
    fn structured_decision_without_field_is_empty() {
        let decision = AgentOutput::Structured(json!({ "speaker": "x" }));
        assert_eq!(next_speaker(&decision), "");
    }
}

//! The council's fixed seats: the president who picks speakers and the
//! secretary who writes up the result.

use std::sync::Arc;

use serde_json::json;

use crate::agent::Agent;
use crate::error::Result;
use crate::provider::ModelProvider;
use crate::schema::JsonSchema;

pub const PRESIDENT_NAME: &str = "President";
pub const SECRETARY_NAME: &str = "Secretary";

/// Answer that ends the council.
pub const FINISH: &str = "FINISH";

const PRESIDENT_INSTRUCTIONS: &str = "You are the manager of a group of agents. Your goal is to guide the conversation to solve the user's request.
Based on the current conversation and the capabilities of the available agents, choose the most suitable agent to speak next.
When the task is complete, or no other agent is needed, or if you need more information from the user, you can output 'FINISH'. Don't select yourself as tool.";

const SECRETARY_INSTRUCTIONS: &str =
    "You are a conversation summarizer. Summarize the provided conversation and extract the final answer.";

/// Build the president. Every senator is registered as one of its tools.
pub fn president(senators: &[Agent], provider: Arc<dyn ModelProvider>) -> Result<Agent> {
    let schema = JsonSchema::new(json!({
        "type": "object",
        "properties": {
            "next_speaker": {
                "type": "string",
                "description": "The name of the agent who should speak next, or 'FINISH' if the task is complete."
            }
        },
        "required": ["next_speaker"]
    }));

    Agent::new(PRESIDENT_NAME, PRESIDENT_INSTRUCTIONS, provider)
        .with_description("Orchestrates the conversation flow between other agents.")
        .with_output_schema(schema)
        .with_tools(senators.iter().map(Agent::as_tool).collect())
}

/// Build the secretary: one step, `{summary, final_answer}` output.
pub fn secretary(provider: Arc<dyn ModelProvider>) -> Agent {
    Agent::new(SECRETARY_NAME, SECRETARY_INSTRUCTIONS, provider)
        .with_description("Summarizes group chat conversations.")
        .with_output_schema(JsonSchema::string_fields(&[
            ("summary", "Concise summary of the conversation."),
            ("final_answer", "The final answer or result of the task."),
        ]))
        .with_max_turns(1)
}

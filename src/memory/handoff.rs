//! Handoff system message synthesis.

use serde::{Deserialize, Serialize};

use super::Memory;

/// Options for [`Memory::handoff`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandoffOptions {
    /// Prepend the source agent's non-system history ahead of our own.
    #[serde(default)]
    pub inherit: bool,
    /// Arbitrary context rendered into the handoff message.
    #[serde(default)]
    pub context: serde_json::Value,
}

impl HandoffOptions {
    pub fn inherit() -> Self {
        Self {
            inherit: true,
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// Render the transition message for a handoff from `from` to `to`.
pub fn build_handoff_system_message(
    from: &Memory,
    to: &Memory,
    context: &serde_json::Value,
) -> String {
    let context = if context.is_null() {
        serde_json::json!({})
    } else {
        context.clone()
    };
    let rendered =
        serde_json::to_string_pretty(&context).unwrap_or_else(|_| context.to_string());

    format!(
        "# AGENT HANDOFF: {from_name} -> {to_name}\n\
         \n\
         ## Previous Agent Context:\n\
         {from_system}\n\
         \n\
         ## Current Agent Instructions:\n\
         {to_system}\n\
         \n\
         ## Handoff Context:\n\
         ```json\n\
         {rendered}\n\
         ```\n\
         \n\
         ## Guidelines:\n\
         - You have full access to the conversation history\n\
         - Continue the task seamlessly from where the previous agent left off\n\
         - Use your specialized capabilities as {to_name}\n",
        from_name = from.name(),
        to_name = to.name(),
        from_system = from.system_message(),
        to_system = to.system_message(),
    )
}

//! Validated, ordered tool set for one agent.

use std::collections::HashSet;
use std::sync::Arc;

use super::tool::Tool;
use super::types::ToolDefinition;
use crate::error::{CuriaError, Result};

/// Tools registered on an agent. Names are non-empty and unique.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry, rejecting empty or duplicate names.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for tool in &tools {
            validate_name(tool.as_ref())?;
            if !seen.insert(tool.name().to_string()) {
                return Err(CuriaError::DuplicateTool(tool.name().to_string()));
            }
        }
        Ok(Self { tools })
    }

    /// Add a tool, rejecting empty or duplicate names.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        validate_name(tool.as_ref())?;
        if self.get(tool.name()).is_some() {
            return Err(CuriaError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Remove a tool by name, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        let index = self.tools.iter().position(|t| t.name() == name)?;
        Some(self.tools.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Declarations advertised to the provider, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

fn validate_name(tool: &dyn Tool) -> Result<()> {
    if tool.name().trim().is_empty() {
        return Err(CuriaError::InvalidTool(format!(
            "tool name must not be empty (description: {:?})",
            tool.description()
        )));
    }
    Ok(())
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

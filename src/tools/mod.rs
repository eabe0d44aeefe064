//! Typed operation catalog for the ERC-8004 registries.
//!
//! The catalog is a fixed set of [`AgentTool`] descriptors grouped into two
//! categories. Consumers build an [`AgentContext`], select tools with
//! [`agent_tools`], and hand both to one of the adapters in
//! [`crate::adapters`].

pub mod context;
pub mod identity;
pub mod reputation;
pub mod schema;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

pub use context::{AgentContext, ContextOptions, ContextOverrides, ExecutionMode};
pub use types::{tool_result, tx_result, AgentTool, ToolExecutionResult};

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    Identity,
    Reputation,
}

impl ToolCategory {
    /// All categories, in catalog order.
    pub const ALL: [ToolCategory; 2] = [ToolCategory::Identity, ToolCategory::Reputation];

    fn tools(&self) -> &'static [Arc<dyn AgentTool>] {
        match self {
            ToolCategory::Identity => &identity::IDENTITY_TOOLS,
            ToolCategory::Reputation => &reputation::REPUTATION_TOOLS,
        }
    }
}

/// Category and name filters for [`agent_tools`].
#[derive(Debug, Clone, Default)]
pub struct ToolSelection {
    /// Categories to draw from; all categories when empty.
    pub categories: Vec<ToolCategory>,
    /// When set, keep only tools with these names.
    pub include: Option<Vec<String>>,
    /// When set, drop tools with these names. Applied after `include`.
    pub exclude: Option<Vec<String>>,
}

/// Select tools from the catalog.
///
/// Categories are walked in the requested order, each category in declaration
/// order, de-duplicating by name with the first occurrence winning. The
/// `include` filter is applied before `exclude`. Output order is stable for
/// identical inputs.
pub fn agent_tools(selection: &ToolSelection) -> Vec<Arc<dyn AgentTool>> {
    let categories: &[ToolCategory] = if selection.categories.is_empty() {
        &ToolCategory::ALL
    } else {
        &selection.categories
    };

    let mut tools: Vec<Arc<dyn AgentTool>> = Vec::new();
    let mut seen: HashSet<&'static str> = HashSet::new();

    for category in categories {
        for tool in category.tools() {
            if seen.insert(tool.name()) {
                tools.push(Arc::clone(tool));
            }
        }
    }

    let include: Option<HashSet<&str>> = selection
        .include
        .as_ref()
        .map(|names| names.iter().map(String::as_str).collect());
    let exclude: Option<HashSet<&str>> = selection
        .exclude
        .as_ref()
        .map(|names| names.iter().map(String::as_str).collect());

    tools.retain(|tool| {
        if let Some(include) = &include {
            if !include.contains(tool.name()) {
                return false;
            }
        }
        if let Some(exclude) = &exclude {
            if exclude.contains(tool.name()) {
                return false;
            }
        }
        true
    });

    tools
}

/// Look up a single tool across the whole catalog.
pub fn tool_by_name(name: &str) -> Option<Arc<dyn AgentTool>> {
    ToolCategory::ALL
        .iter()
        .flat_map(|category| category.tools().iter())
        .find(|tool| tool.name() == name)
        .map(Arc::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_covers_both_categories() {
        let tools = agent_tools(&ToolSelection::default());
        assert_eq!(tools.len(), 22);
        assert!(tools.iter().any(|t| t.name() == "identity_register"));
        assert!(tools.iter().any(|t| t.name() == "reputation_giveFeedback"));
    }

    #[test]
    fn test_selection_has_no_duplicates() {
        let selection = ToolSelection {
            categories: vec![
                ToolCategory::Identity,
                ToolCategory::Reputation,
                ToolCategory::Identity,
            ],
            ..Default::default()
        };
        let tools = agent_tools(&selection);
        let mut names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 22);
    }

    #[test]
    fn test_first_occurrence_wins_ordering() {
        let reversed = ToolSelection {
            categories: vec![ToolCategory::Reputation, ToolCategory::Identity],
            ..Default::default()
        };
        let tools = agent_tools(&reversed);
        assert_eq!(tools[0].name(), "reputation_createFeedbackAuth");
        assert_eq!(tools[13].name(), "identity_register");
    }

    #[test]
    fn test_include_then_exclude() {
        let selection = ToolSelection {
            include: Some(vec![
                "identity_getOwner".to_string(),
                "identity_register".to_string(),
            ]),
            exclude: Some(vec!["identity_register".to_string()]),
            ..Default::default()
        };
        let tools = agent_tools(&selection);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "identity_getOwner");
    }

    #[test]
    fn test_exclude_scenario_from_identity_category() {
        let selection = ToolSelection {
            categories: vec![ToolCategory::Identity],
            exclude: Some(vec!["identity_register".to_string()]),
            ..Default::default()
        };
        let tools = agent_tools(&selection);
        assert_eq!(tools.len(), 8);
        assert!(!tools.iter().any(|t| t.name() == "identity_register"));
        let mut names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let selection = ToolSelection::default();
        let a: Vec<&str> = agent_tools(&selection).iter().map(|t| t.name()).collect();
        let b: Vec<&str> = agent_tools(&selection).iter().map(|t| t.name()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tool_by_name() {
        assert!(tool_by_name("reputation_readFeedback").is_some());
        assert!(tool_by_name("no_such_tool").is_none());
    }

    #[test]
    fn test_every_tool_schema_is_an_object() {
        for tool in agent_tools(&ToolSelection::default()) {
            let schema = tool.input_schema();
            assert_eq!(schema["type"], "object", "{}", tool.name());
            assert!(schema["properties"].is_object(), "{}", tool.name());
        }
    }
}

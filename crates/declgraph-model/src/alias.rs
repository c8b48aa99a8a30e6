//! Type aliases.

use declgraph_common::DeclId;
use declgraph_syntax::{TypeNode, parse_type};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAlias {
    pub alias_name: String,
    /// `owner.qualifiedName + "." + aliasName`, or `aliasName` at file level.
    pub qualified_name: String,
    pub target: TypeNode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<DeclId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<DeclId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl TypeAlias {
    pub fn new(alias_name: impl Into<String>, target: &str) -> Self {
        let alias_name = alias_name.into();
        Self {
            qualified_name: alias_name.clone(),
            alias_name,
            target: parse_type(target),
            owner: None,
            module: None,
            imports: Vec::new(),
            resolved: None,
            file: None,
        }
    }

    /// Raw target text as written.
    pub fn target_text(&self) -> &str {
        &self.target.raw
    }
}

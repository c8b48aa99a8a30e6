//! Parse-result records.
//!
//! One [`FileParseResult`] per source file. Declarations form a tree (nested
//! declarations and aliases inline); member type references are plain
//! strings, parsed into [`TypeNode`](declgraph_syntax::TypeNode)s when the
//! arena is built. Every field except names is optional in JSON.

use crate::decl::DeclKind;
use crate::members::RequirementRelation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileParseResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<ParsedDeclaration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<ParsedAlias>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<ParsedFunction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDeclaration {
    pub name: String,
    pub kind: DeclKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherited_names: Vec<String>,
    /// Imports specific to this declaration, on top of the file's.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<ParsedVariable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<ParsedMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscripts: Vec<ParsedSubscript>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_cases: Vec<ParsedEnumCase>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_types: Vec<ParsedAssociatedType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_requirements: Vec<ParsedGenericRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composed_type_names: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<ParsedDeclaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<ParsedAlias>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedVariable {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_mutable: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub name: String,
    pub type_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParsedMethod {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParsedParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_class: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_async: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub throws: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub rethrows: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_initializer: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_failable_initializer: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A top-level function.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFunction {
    #[serde(flatten)]
    pub signature: ParsedMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSubscript {
    #[serde(default)]
    pub parameters: Vec<ParsedParameter>,
    pub return_type: String,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAssociatedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub type_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEnumCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_values: Vec<ParsedAssociatedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAssociatedType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedGenericRequirement {
    pub left: String,
    pub right: String,
    pub relation: RequirementRelation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAlias {
    pub name: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

//! Member records owned by declarations.
//!
//! Every type reference is a parsed [`TypeNode`]; `defined_in` is filled by the
//! member annotator once extensions have been merged.

use crate::input::{
    ParsedAssociatedType, ParsedEnumCase, ParsedFunction, ParsedGenericRequirement, ParsedMethod,
    ParsedParameter, ParsedSubscript, ParsedVariable,
};
use bitflags::bitflags;
use declgraph_common::DeclId;
use declgraph_syntax::{TypeNode, parse_type};
use serde::{Deserialize, Serialize};

// =============================================================================
// Variables
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_node: TypeNode,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_mutable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in: Option<DeclId>,
}

impl Variable {
    pub fn from_parsed(parsed: &ParsedVariable) -> Self {
        Self {
            name: parsed.name.clone(),
            type_node: parse_type(&parsed.type_name),
            is_static: parsed.is_static,
            is_mutable: parsed.is_mutable,
            defined_in: None,
        }
    }

    pub fn to_parsed(&self) -> ParsedVariable {
        ParsedVariable {
            name: self.name.clone(),
            type_name: self.type_node.raw.clone(),
            is_static: self.is_static,
            is_mutable: self.is_mutable,
        }
    }
}

// =============================================================================
// Methods
// =============================================================================

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MethodFlags: u16 {
        const STATIC = 1 << 0;
        const CLASS = 1 << 1;
        const ASYNC = 1 << 2;
        const THROWS = 1 << 3;
        const RETHROWS = 1 << 4;
        const INITIALIZER = 1 << 5;
        const FAILABLE_INITIALIZER = 1 << 6;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub type_node: TypeNode,
}

impl MethodParameter {
    fn from_parsed(parsed: &ParsedParameter) -> Self {
        Self {
            label: parsed.label.clone(),
            name: parsed.name.clone(),
            type_node: parse_type(&parsed.type_name),
        }
    }

    fn to_parsed(&self) -> ParsedParameter {
        ParsedParameter {
            label: self.label.clone(),
            name: self.name.clone(),
            type_name: self.type_node.raw.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<MethodParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeNode>,
    #[serde(default)]
    pub flags: MethodFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in: Option<DeclId>,
}

impl Method {
    pub fn from_parsed(parsed: &ParsedMethod) -> Self {
        let mut flags = MethodFlags::empty();
        flags.set(MethodFlags::STATIC, parsed.is_static);
        flags.set(MethodFlags::CLASS, parsed.is_class);
        flags.set(MethodFlags::ASYNC, parsed.is_async);
        flags.set(MethodFlags::THROWS, parsed.throws || parsed.rethrows);
        flags.set(MethodFlags::RETHROWS, parsed.rethrows);
        flags.set(
            MethodFlags::INITIALIZER,
            parsed.is_initializer || parsed.is_failable_initializer,
        );
        flags.set(MethodFlags::FAILABLE_INITIALIZER, parsed.is_failable_initializer);

        Self {
            name: parsed.name.clone(),
            parameters: parsed.parameters.iter().map(MethodParameter::from_parsed).collect(),
            return_type: parsed.return_type.as_deref().map(parse_type),
            flags,
            defined_in: None,
        }
    }

    pub fn to_parsed(&self) -> ParsedMethod {
        ParsedMethod {
            name: self.name.clone(),
            parameters: self.parameters.iter().map(MethodParameter::to_parsed).collect(),
            return_type: self.return_type.as_ref().map(|node| node.raw.clone()),
            is_static: self.flags.contains(MethodFlags::STATIC),
            is_class: self.flags.contains(MethodFlags::CLASS),
            is_async: self.flags.contains(MethodFlags::ASYNC),
            throws: self.flags.contains(MethodFlags::THROWS),
            rethrows: self.flags.contains(MethodFlags::RETHROWS),
            is_initializer: self.is_initializer(),
            is_failable_initializer: self.is_failable_initializer(),
        }
    }

    pub fn is_initializer(&self) -> bool {
        self.flags.contains(MethodFlags::INITIALIZER)
    }

    pub fn is_failable_initializer(&self) -> bool {
        self.flags.contains(MethodFlags::FAILABLE_INITIALIZER)
    }

    pub fn is_static(&self) -> bool {
        self.flags.intersects(MethodFlags::STATIC | MethodFlags::CLASS)
    }
}

// =============================================================================
// Subscripts
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscript {
    #[serde(default)]
    pub parameters: Vec<MethodParameter>,
    pub return_type: TypeNode,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in: Option<DeclId>,
}

impl Subscript {
    pub fn from_parsed(parsed: &ParsedSubscript) -> Self {
        Self {
            parameters: parsed.parameters.iter().map(MethodParameter::from_parsed).collect(),
            return_type: parse_type(&parsed.return_type),
            is_static: parsed.is_static,
            defined_in: None,
        }
    }

    pub fn to_parsed(&self) -> ParsedSubscript {
        ParsedSubscript {
            parameters: self.parameters.iter().map(MethodParameter::to_parsed).collect(),
            return_type: self.return_type.raw.clone(),
            is_static: self.is_static,
        }
    }
}

// =============================================================================
// Enum cases
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub type_node: TypeNode,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_values: Vec<AssociatedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in: Option<DeclId>,
}

impl EnumCase {
    pub fn from_parsed(parsed: &ParsedEnumCase) -> Self {
        Self {
            name: parsed.name.clone(),
            associated_values: parsed
                .associated_values
                .iter()
                .map(|value| AssociatedValue {
                    label: value.label.clone(),
                    type_node: parse_type(&value.type_name),
                })
                .collect(),
            raw_value: parsed.raw_value.clone(),
            defined_in: None,
        }
    }

    pub fn to_parsed(&self) -> ParsedEnumCase {
        ParsedEnumCase {
            name: self.name.clone(),
            associated_values: self
                .associated_values
                .iter()
                .map(|value| crate::input::ParsedAssociatedValue {
                    label: value.label.clone(),
                    type_name: value.type_node.raw.clone(),
                })
                .collect(),
            raw_value: self.raw_value.clone(),
        }
    }

    pub fn has_associated_values(&self) -> bool {
        !self.associated_values.is_empty()
    }
}

// =============================================================================
// Interface members
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociatedType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<TypeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in: Option<DeclId>,
}

impl AssociatedType {
    pub fn from_parsed(parsed: &ParsedAssociatedType) -> Self {
        Self {
            name: parsed.name.clone(),
            constraint: parsed.constraint.as_deref().map(parse_type),
            defined_in: None,
        }
    }

    pub fn to_parsed(&self) -> ParsedAssociatedType {
        ParsedAssociatedType {
            name: self.name.clone(),
            constraint: self.constraint.as_ref().map(|node| node.raw.clone()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequirementRelation {
    /// `T == U`
    Equals,
    /// `T: P`
    ConformsTo,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericRequirement {
    pub left: TypeNode,
    pub right: TypeNode,
    pub relation: RequirementRelation,
    /// Left-hand side names one of the declaring interface's associated types.
    #[serde(default)]
    pub left_is_associated_type: bool,
}

impl GenericRequirement {
    pub fn from_parsed(parsed: &ParsedGenericRequirement) -> Self {
        Self {
            left: parse_type(&parsed.left),
            right: parse_type(&parsed.right),
            relation: parsed.relation,
            left_is_associated_type: false,
        }
    }

    pub fn to_parsed(&self) -> ParsedGenericRequirement {
        ParsedGenericRequirement {
            left: self.left.raw.clone(),
            right: self.right.raw.clone(),
            relation: self.relation,
        }
    }
}

// =============================================================================
// Free functions
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    #[serde(flatten)]
    pub signature: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Function {
    pub fn from_parsed(
        parsed: &ParsedFunction,
        module: Option<&str>,
        imports: Vec<String>,
        file: Option<&str>,
    ) -> Self {
        Self {
            signature: Method::from_parsed(&parsed.signature),
            module: module.map(str::to_string),
            imports,
            file: file.map(str::to_string),
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

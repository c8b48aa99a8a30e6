//! The declaration record.

use crate::members::{AssociatedType, EnumCase, GenericRequirement, Method, Subscript, Variable};
use declgraph_common::{AliasId, DeclId};
use declgraph_syntax::TypeNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a declaration declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclKind {
    /// Value type.
    Struct,
    /// Reference type (classes and actors).
    #[serde(alias = "actor")]
    Class,
    Enum,
    /// Interface-like.
    Protocol,
    /// `A & B`
    ProtocolComposition,
    Extension,
}

impl DeclKind {
    #[inline]
    pub fn is_reference_type(self) -> bool {
        matches!(self, Self::Class)
    }

    #[inline]
    pub fn is_interface_like(self) -> bool {
        matches!(self, Self::Protocol)
    }

    #[inline]
    pub fn is_extension(self) -> bool {
        matches!(self, Self::Extension)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Enum => "enum",
            Self::Protocol => "protocol",
            Self::ProtocolComposition => "protocolComposition",
            Self::Extension => "extension",
        }
    }
}

/// A nominal declaration (or extension) in the arena.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub local_name: String,
    pub qualified_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    pub kind: DeclKind,
    /// Extension whose base declaration was never found.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_unknown_extension: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherited_names: Vec<String>,

    #[serde(default)]
    pub based_on: BTreeMap<String, String>,
    #[serde(default)]
    pub based_types: BTreeMap<String, DeclId>,
    #[serde(default)]
    pub inherits_from: BTreeMap<String, DeclId>,
    #[serde(default)]
    pub implements: BTreeMap<String, DeclId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<DeclId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscripts: Vec<Subscript>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_cases: Vec<EnumCase>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_types: Vec<AssociatedType>,
    /// Associated types inherited from interface-like ancestors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherited_associated_types: Vec<AssociatedType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_requirements: Vec<GenericRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composed_type_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composed_types: Vec<DeclId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_type: Option<TypeNode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<DeclId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<AliasId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<DeclId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Declaration {
    /// A declaration with no members.
    pub fn new(local_name: impl Into<String>, kind: DeclKind) -> Self {
        let local_name = local_name.into();
        Self {
            qualified_name: local_name.clone(),
            local_name,
            module: None,
            imports: Vec::new(),
            kind,
            is_unknown_extension: false,
            inherited_names: Vec::new(),
            based_on: BTreeMap::new(),
            based_types: BTreeMap::new(),
            inherits_from: BTreeMap::new(),
            implements: BTreeMap::new(),
            supertype: None,
            variables: Vec::new(),
            methods: Vec::new(),
            subscripts: Vec::new(),
            enum_cases: Vec::new(),
            associated_types: Vec::new(),
            inherited_associated_types: Vec::new(),
            generic_requirements: Vec::new(),
            composed_type_names: Vec::new(),
            composed_types: Vec::new(),
            raw_type: None,
            annotations: BTreeMap::new(),
            nested: Vec::new(),
            aliases: Vec::new(),
            parent: None,
            file: None,
        }
    }

    #[inline]
    pub fn is_extension(&self) -> bool {
        self.kind.is_extension()
    }

    /// `module.qualifiedName` when the module is known, else `qualifiedName`.
    pub fn global_name(&self) -> String {
        match &self.module {
            Some(module) => format!("{module}.{}", self.qualified_name),
            None => self.qualified_name.clone(),
        }
    }

    /// Reset `based_on` to the raw inheritance clause.
    pub fn seed_based_on(&mut self) {
        self.based_on = self
            .inherited_names
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect();
    }

    /// Union `names` into the inheritance clause, keeping existing order.
    pub fn union_inherited_names<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        for name in names {
            if !self.inherited_names.contains(name) {
                self.inherited_names.push(name.clone());
            }
        }
    }

    pub fn has_members(&self) -> bool {
        !(self.variables.is_empty()
            && self.methods.is_empty()
            && self.subscripts.is_empty()
            && self.enum_cases.is_empty()
            && self.associated_types.is_empty()
            && self.generic_requirements.is_empty())
    }
}

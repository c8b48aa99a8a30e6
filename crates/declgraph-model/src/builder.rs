//! Fluent constructors for parse results.
//!
//! Used by tests, benches and anything that synthesises input without going
//! through JSON.
//!
//! ```
//! use declgraph_model::{DeclKind, FileParseResult, ParsedDeclaration};
//!
//! let file = FileParseResult::new("App")
//!     .with_path("Sources/App/Foo.swift")
//!     .declaration(ParsedDeclaration::new("Foo", DeclKind::Struct).variable("x", "Int"));
//! assert_eq!(file.declarations.len(), 1);
//! ```

use crate::decl::DeclKind;
use crate::input::{
    FileParseResult, ParsedAlias, ParsedAssociatedType, ParsedAssociatedValue, ParsedDeclaration,
    ParsedEnumCase, ParsedFunction, ParsedGenericRequirement, ParsedMethod, ParsedParameter,
    ParsedSubscript, ParsedVariable,
};
use crate::members::RequirementRelation;
use std::collections::BTreeMap;

impl FileParseResult {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            ..Self::default()
        }
    }

    /// A file whose module is unknown.
    pub fn without_module() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    #[must_use]
    pub fn declaration(mut self, decl: ParsedDeclaration) -> Self {
        self.declarations.push(decl);
        self
    }

    #[must_use]
    pub fn alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push(ParsedAlias::new(name, target));
        self
    }

    #[must_use]
    pub fn function(mut self, method: ParsedMethod) -> Self {
        self.functions.push(ParsedFunction {
            signature: method,
            imports: Vec::new(),
        });
        self
    }
}

impl ParsedAlias {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            imports: Vec::new(),
        }
    }
}

impl ParsedDeclaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            inherited_names: Vec::new(),
            imports: Vec::new(),
            variables: Vec::new(),
            methods: Vec::new(),
            subscripts: Vec::new(),
            enum_cases: Vec::new(),
            associated_types: Vec::new(),
            generic_requirements: Vec::new(),
            composed_type_names: Vec::new(),
            annotations: BTreeMap::new(),
            nested: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Struct)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Class)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Enum)
    }

    pub fn protocol(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Protocol)
    }

    pub fn extension(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Extension)
    }

    #[must_use]
    pub fn inherits<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherited_names.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.variables.push(ParsedVariable {
            name: name.into(),
            type_name: type_name.into(),
            is_static: false,
            is_mutable: false,
        });
        self
    }

    #[must_use]
    pub fn static_variable(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.variables.push(ParsedVariable {
            name: name.into(),
            type_name: type_name.into(),
            is_static: true,
            is_mutable: false,
        });
        self
    }

    #[must_use]
    pub fn method(mut self, method: ParsedMethod) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn subscript(mut self, parameters: Vec<ParsedParameter>, return_type: impl Into<String>) -> Self {
        self.subscripts.push(ParsedSubscript {
            parameters,
            return_type: return_type.into(),
            is_static: false,
        });
        self
    }

    #[must_use]
    pub fn case(mut self, name: impl Into<String>) -> Self {
        self.enum_cases.push(ParsedEnumCase {
            name: name.into(),
            associated_values: Vec::new(),
            raw_value: None,
        });
        self
    }

    #[must_use]
    pub fn case_with_values<I, S>(mut self, name: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_cases.push(ParsedEnumCase {
            name: name.into(),
            associated_values: types
                .into_iter()
                .map(|ty| ParsedAssociatedValue {
                    label: None,
                    type_name: ty.into(),
                })
                .collect(),
            raw_value: None,
        });
        self
    }

    #[must_use]
    pub fn associated_type(mut self, name: impl Into<String>, constraint: Option<&str>) -> Self {
        self.associated_types.push(ParsedAssociatedType {
            name: name.into(),
            constraint: constraint.map(str::to_string),
        });
        self
    }

    #[must_use]
    pub fn requirement(
        mut self,
        left: impl Into<String>,
        relation: RequirementRelation,
        right: impl Into<String>,
    ) -> Self {
        self.generic_requirements.push(ParsedGenericRequirement {
            left: left.into(),
            right: right.into(),
            relation,
        });
        self
    }

    #[must_use]
    pub fn composed_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.composed_type_names.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn annotation(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.annotations.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn nest(mut self, decl: ParsedDeclaration) -> Self {
        self.nested.push(decl);
        self
    }

    #[must_use]
    pub fn alias(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push(ParsedAlias::new(name, target));
        self
    }
}

impl ParsedMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn initializer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_initializer: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.parameters.push(ParsedParameter {
            label: None,
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    #[must_use]
    pub fn returns(mut self, type_name: impl Into<String>) -> Self {
        self.return_type = Some(type_name.into());
        self
    }

    #[must_use]
    pub fn failable(mut self) -> Self {
        self.is_failable_initializer = true;
        self
    }

    #[must_use]
    pub fn throwing(mut self) -> Self {
        self.throws = true;
        self
    }
}

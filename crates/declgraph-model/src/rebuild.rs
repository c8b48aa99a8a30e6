//! Declarations -> parse results.
//!
//! Produces input records that compose back to the same model: every item
//! carries its full import list as item-specific imports, and file-level
//! imports are left empty. Resolution annotations are dropped; only raw type
//! text survives.

use crate::alias::TypeAlias;
use crate::decl::Declaration;
use crate::input::{FileParseResult, ParsedAlias, ParsedDeclaration, ParsedFunction};
use crate::members::{
    AssociatedType, EnumCase, Function, GenericRequirement, Method, Subscript, Variable,
};
use declgraph_common::DeclId;
use std::collections::BTreeMap;

type GroupKey = (Option<String>, Option<String>);

/// Group top-level items by (file, module) and rebuild the declaration trees.
pub fn rebuild_parse_results(
    decls: &[Declaration],
    aliases: &[TypeAlias],
    functions: &[Function],
) -> Vec<FileParseResult> {
    let mut groups: BTreeMap<GroupKey, FileParseResult> = BTreeMap::new();

    for (index, decl) in decls.iter().enumerate() {
        if decl.parent.is_some() {
            continue;
        }
        group(&mut groups, &decl.file, &decl.module)
            .declarations
            .push(rebuild_declaration(decls, aliases, DeclId::from_index(index), 0));
    }

    for alias in aliases.iter().filter(|alias| alias.owner.is_none()) {
        group(&mut groups, &alias.file, &alias.module)
            .aliases
            .push(rebuild_alias(alias));
    }

    for function in functions {
        group(&mut groups, &function.file, &function.module)
            .functions
            .push(ParsedFunction {
                signature: function.signature.to_parsed(),
                imports: function.imports.clone(),
            });
    }

    groups.into_values().collect()
}

fn group<'a>(
    groups: &'a mut BTreeMap<GroupKey, FileParseResult>,
    file: &Option<String>,
    module: &Option<String>,
) -> &'a mut FileParseResult {
    groups
        .entry((file.clone(), module.clone()))
        .or_insert_with(|| FileParseResult {
            path: file.clone(),
            module: module.clone(),
            ..FileParseResult::default()
        })
}

fn rebuild_alias(alias: &TypeAlias) -> ParsedAlias {
    ParsedAlias {
        name: alias.alias_name.clone(),
        target: alias.target_text().to_string(),
        imports: alias.imports.clone(),
    }
}

fn rebuild_declaration(
    decls: &[Declaration],
    aliases: &[TypeAlias],
    id: DeclId,
    depth: u32,
) -> ParsedDeclaration {
    let decl = &decls[id.index()];
    let nested = if depth >= declgraph_common::limits::MAX_SCOPE_WALK_DEPTH {
        Vec::new()
    } else {
        decl.nested
            .iter()
            .filter(|child| child.index() < decls.len())
            .map(|&child| rebuild_declaration(decls, aliases, child, depth + 1))
            .collect()
    };

    ParsedDeclaration {
        name: decl.local_name.clone(),
        kind: decl.kind,
        inherited_names: decl.inherited_names.clone(),
        imports: decl.imports.clone(),
        variables: decl.variables.iter().map(Variable::to_parsed).collect(),
        methods: decl.methods.iter().map(Method::to_parsed).collect(),
        subscripts: decl.subscripts.iter().map(Subscript::to_parsed).collect(),
        enum_cases: decl.enum_cases.iter().map(EnumCase::to_parsed).collect(),
        associated_types: decl
            .associated_types
            .iter()
            .map(AssociatedType::to_parsed)
            .collect(),
        generic_requirements: decl
            .generic_requirements
            .iter()
            .map(GenericRequirement::to_parsed)
            .collect(),
        composed_type_names: decl.composed_type_names.clone(),
        annotations: decl.annotations.clone(),
        nested,
        aliases: decl
            .aliases
            .iter()
            .filter_map(|alias| aliases.get(alias.index()))
            .map(rebuild_alias)
            .collect(),
    }
}

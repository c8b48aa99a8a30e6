use super::*;

#[test]
fn test_ambiguous_reference_lists_candidates() {
    let diagnostic =
        Diagnostic::ambiguous_reference("Foo", vec!["ModA.Foo".to_string(), "ModB.Foo".to_string()]);
    assert_eq!(diagnostic.kind, DiagnosticKind::AmbiguousReference);
    assert_eq!(diagnostic.code, 1001);
    assert_eq!(diagnostic.candidates.len(), 2);
    assert!(diagnostic.message.contains("ModA.Foo, ModB.Foo"));
}

#[test]
fn test_unmatched_extension_mentions_inheritance_clause() {
    let diagnostic = Diagnostic::unmatched_extension("Missing", &["Codable".to_string()]);
    assert_eq!(
        diagnostic.message,
        "Found \"extension Missing: Codable\" of type for which there is no original type declaration information."
    );

    let bare = Diagnostic::unmatched_extension("Missing", &[]);
    assert!(bare.message.contains("\"extension Missing\""));
}

#[test]
fn test_bag_deduplicates_and_keeps_order() {
    let mut bag = DiagnosticBag::new();
    assert!(bag.push(Diagnostic::duplicate_alias("A")));
    assert!(bag.push(Diagnostic::duplicate_alias("B")));
    assert!(!bag.push(Diagnostic::duplicate_alias("A")));

    let mut other = DiagnosticBag::new();
    other.push(Diagnostic::duplicate_alias("B"));
    other.push(Diagnostic::resolution_limit("C"));
    bag.extend(other);

    let subjects: Vec<_> = bag.iter().map(|d| d.subject.as_str()).collect();
    assert_eq!(subjects, vec!["A", "B", "C"]);
    assert_eq!(bag.count_of(DiagnosticKind::DuplicateAlias), 2);
}

#[test]
fn test_serializes_kind_in_camel_case() {
    let diagnostic = Diagnostic::cyclic_alias("A", vec!["A".into(), "B".into(), "A".into()]);
    let json = serde_json::to_value(&diagnostic).unwrap();
    assert_eq!(json["kind"], "cyclicAlias");
    assert_eq!(json["code"], 1005);
    assert!(json.get("file").is_none());
}

#[test]
fn test_invalid_record_message() {
    let diagnostic = Diagnostic::invalid_record("Outer.A.B", "only extensions may use a dotted name")
        .with_file(Some("Outer.swift".into()));
    assert_eq!(diagnostic.code, 1009);
    assert_eq!(diagnostic.kind.label(), "invalid-record");
    assert_eq!(diagnostic.message, "Skipping Outer.A.B: only extensions may use a dotted name.");
}

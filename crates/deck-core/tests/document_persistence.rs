//! Integration tests: loading, patching and persisting slide documents.

use deck_core::*;
use pretty_assertions::assert_eq;

fn team() -> Document {
    Document::from_json(include_str!("fixtures/team.json")).unwrap()
}

#[test]
fn fixture_loads_with_persisted_overrides() {
    let doc = team();
    assert_eq!(doc.layout, LayoutKind::Team);

    let title = doc.get(ElementRef::Title).unwrap();
    assert_eq!(title.transform.offset(), Vec2::new(12.0, -4.0));
    let style = title.style.as_ref().unwrap();
    assert_eq!(style.font_family, "Poppins");
    assert_eq!(style.alignment, Alignment::Center);
    assert_eq!(style.color, Color::rgb(0x1A, 0x1A, 0x2E));

    let photo = ElementRef::MemberField {
        member: 0,
        field: MemberField::Photo,
    };
    assert_eq!(
        doc.get(photo).unwrap().transform.explicit_size(),
        Some(Size::new(160.0, 160.0))
    );
}

#[test]
fn deleted_entries_are_kept_but_not_live() {
    let doc = team();
    let role = ElementRef::MemberField {
        member: 1,
        field: MemberField::Role,
    };
    assert!(doc.get(role).is_some());
    assert!(!doc.is_live(role));
    assert_eq!(doc.element_refs().len(), 7);
}

#[test]
fn snapshot_survives_messagepack() {
    let mut doc = team();
    doc.apply(&Patch::transform(
        ElementRef::Description,
        ElementTransform::at(0.0, 48.0),
    ));
    doc.apply(&Patch::text(ElementRef::Title, "The Team"));

    let bytes = doc.to_bytes().unwrap();
    let restored = Document::from_bytes(&bytes).unwrap();
    assert_eq!(restored, doc);
}

#[test]
fn json_with_mismatched_content_is_rejected() {
    let json = r#"{"layout":"logos","elements":{"logo-0":{"content":{"text":"ACME"}}}}"#;
    let err = Document::from_json(json).unwrap_err();
    assert!(matches!(err, DocumentError::ContentMismatch { .. }), "{err}");
}

#[test]
fn json_with_unknown_element_id_is_rejected() {
    let json = r#"{"elements":{"plan-x":{"content":{"text":"?"}}}}"#;
    assert!(matches!(
        Document::from_json(json),
        Err(DocumentError::Json(_))
    ));
}

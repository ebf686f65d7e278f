//! Integration tests: editing behaviour of a whole canvas session
//! (deck-editor ↔ deck-core ↔ deck-render).
//!
//! Drives a pricing slide through pointer, keyboard, popup and upload
//! events and checks what ends up in the document and what the host is
//! told to do.

use deck_core::element::ResizeHandle;
use deck_core::{
    Change, Document, ElementRef, ElementTransform, Patch, Point, PointerTarget, Rect, Region,
    StyleChange, Vec2,
};
use deck_editor::store::{ResizeFloor, SelectionStore};
use deck_editor::{
    CanvasSession, EditorConfig, Effect, Effects, InputEvent, PopupScope, UploadError,
};
use pretty_assertions::assert_eq;

const FEATURE_0: ElementRef = ElementRef::PlanFeature {
    plan: 0,
    feature: 0,
};
const FEATURE_1: ElementRef = ElementRef::PlanFeature {
    plan: 0,
    feature: 1,
};
const LOGO: ElementRef = ElementRef::Logo(0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_session() -> CanvasSession {
    init_logging();
    let doc = Document::from_json(include_str!("fixtures/pricing.json")).unwrap();
    let mut session = CanvasSession::new(doc, EditorConfig::default());
    session.set_root_bounds(Rect::new(0.0, 0.0, 960.0, 540.0));
    session.set_element_bounds(ElementRef::Title, Rect::new(100.0, 40.0, 500.0, 100.0));
    session.set_element_bounds(ElementRef::Subtitle, Rect::new(100.0, 110.0, 500.0, 150.0));
    session.set_element_bounds(FEATURE_0, Rect::new(100.0, 200.0, 300.0, 230.0));
    session.set_element_bounds(FEATURE_1, Rect::new(100.0, 240.0, 300.0, 270.0));
    session.set_element_bounds(LOGO, Rect::new(600.0, 200.0, 720.0, 260.0));
    session
}

fn click(session: &mut CanvasSession, x: f64, y: f64) -> Effects {
    let target = session.hit(Point::new(x, y));
    let mut effects = session.handle(&InputEvent::pointer_down(x, y, target));
    effects.extend(session.handle(&InputEvent::pointer_up(x, y)));
    effects
}

fn drag(session: &mut CanvasSession, element: ElementRef, from: Point, by: Vec2) -> Effects {
    let to = from + by;
    let mut effects = session.handle(&InputEvent::pointer_down(
        from.x,
        from.y,
        PointerTarget::Element(element),
    ));
    effects.extend(session.handle(&InputEvent::pointer_move(to.x, to.y)));
    effects.extend(session.handle(&InputEvent::pointer_up(to.x, to.y)));
    effects
}

fn updates(effects: &[Effect]) -> Vec<&Patch> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Update(patch) => Some(patch),
            _ => None,
        })
        .collect()
}

fn selected_count(session: &CanvasSession) -> usize {
    session
        .document()
        .element_refs()
        .into_iter()
        .filter(|&el| session.selection(el).is_some_and(|s| s.is_selected))
        .count()
}

fn edit(session: &mut CanvasSession, element: ElementRef) {
    session.handle(&InputEvent::DoubleClick {
        target: PointerTarget::Element(element),
    });
    assert_eq!(session.editing().map(|s| s.element()), Some(element));
}

// ─── Selection ───────────────────────────────────────────────────────────

#[test]
fn at_most_one_element_is_ever_selected() {
    let mut session = make_session();
    let points = [
        (150.0, 60.0),
        (650.0, 220.0),
        (150.0, 210.0),
        (150.0, 120.0),
        (150.0, 250.0),
        (650.0, 220.0),
        (900.0, 500.0),
        (150.0, 60.0),
    ];
    for (x, y) in points {
        let target = session.hit(Point::new(x, y));
        session.handle(&InputEvent::pointer_down(x, y, target));
        assert!(selected_count(&session) <= 1);
        session.handle(&InputEvent::pointer_up(x, y));
        assert!(selected_count(&session) <= 1);
    }
    assert_eq!(session.selected(), Some(ElementRef::Title));
}

#[test]
fn canvas_click_deselects_everything_and_closes_popups() {
    let mut session = make_session();
    click(&mut session, 150.0, 210.0);
    assert_eq!(session.selected(), Some(FEATURE_0));
    let scope = session.open_popup(FEATURE_0).unwrap();
    assert!(session.popup(scope).unwrap().is_open);

    click(&mut session, 900.0, 500.0);
    assert_eq!(selected_count(&session), 0);
    assert!(!session.popup(scope).unwrap().is_open);
    assert!(!session.popups().any_open());
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn zero_delta_drag_still_commits_once() {
    let mut store = SelectionStore::new(
        ElementRef::Title,
        ElementTransform::at(10.0, 5.0),
        ResizeFloor::default(),
    );
    store.select();
    store.begin_drag(Point::new(200.0, 70.0));
    let patch = store.pointer_up(Point::new(200.0, 70.0));
    assert_eq!(
        patch,
        Some(Patch::transform(ElementRef::Title, ElementTransform::at(10.0, 5.0)))
    );
    assert_eq!(store.pointer_up(Point::new(200.0, 70.0)), None);
}

#[test]
fn drag_back_to_origin_commits_unchanged_transform() {
    let mut session = make_session();
    session.handle(&InputEvent::pointer_down(
        200.0,
        70.0,
        PointerTarget::Element(ElementRef::Title),
    ));
    session.handle(&InputEvent::pointer_move(240.0, 70.0));
    session.handle(&InputEvent::pointer_move(200.0, 70.0));
    let effects = session.handle(&InputEvent::pointer_up(200.0, 70.0));
    assert_eq!(
        updates(&effects),
        vec![&Patch::transform(ElementRef::Title, ElementTransform::at(10.0, 5.0))]
    );
}

#[test]
fn drag_accumulates_from_start_and_commits_final_value() {
    let mut session = make_session();
    session.handle(&InputEvent::pointer_down(
        200.0,
        70.0,
        PointerTarget::Element(ElementRef::Title),
    ));
    session.handle(&InputEvent::pointer_move(220.0, 67.0));
    assert_eq!(
        session.selection(ElementRef::Title).unwrap().transform,
        ElementTransform::at(30.0, 2.0)
    );
    let effects = session.handle(&InputEvent::pointer_up(220.0, 67.0));
    assert_eq!(
        updates(&effects),
        vec![&Patch::transform(ElementRef::Title, ElementTransform::at(30.0, 2.0))]
    );
    assert!(effects.contains(&Effect::ReleasePointer(ElementRef::Title)));
    assert_eq!(session.active_gestures(), 0);
    assert_eq!(
        session.document().get(ElementRef::Title).unwrap().transform,
        ElementTransform::at(30.0, 2.0)
    );
}

#[test]
fn stationary_click_emits_no_transform() {
    let mut session = make_session();
    let effects = click(&mut session, 150.0, 60.0);
    assert!(updates(&effects).is_empty());
    assert!(effects.contains(&Effect::CapturePointer(ElementRef::Title)));
    assert!(effects.contains(&Effect::ReleasePointer(ElementRef::Title)));
}

// ─── Popup ───────────────────────────────────────────────────────────────

#[test]
fn popup_rebases_exactly_once_per_drag() {
    let mut session = make_session();
    click(&mut session, 150.0, 60.0);
    let scope = session.open_popup(ElementRef::Title).unwrap();
    let p0 = session.popup(scope).unwrap().position;
    assert_eq!(p0, Point::new(90.0, -10.0));

    let d1 = Vec2::new(20.0, 10.0);
    drag(&mut session, ElementRef::Title, Point::new(200.0, 70.0), d1);
    assert_eq!(session.popup(scope).unwrap().position, p0 + d1);

    let d2 = Vec2::new(-5.0, 30.0);
    let start = Point::new(220.0, 80.0);
    session.handle(&InputEvent::pointer_down(
        start.x,
        start.y,
        PointerTarget::Element(ElementRef::Title),
    ));
    let during = start + d2;
    session.handle(&InputEvent::pointer_move(during.x, during.y));
    assert_eq!(session.popup(scope).unwrap().position, p0 + d1 + d2);
    session.handle(&InputEvent::pointer_up(during.x, during.y));
    assert_eq!(session.popup(scope).unwrap().original_position, p0 + d1 + d2);
}

#[test]
fn pricing_layout_keeps_a_popup_per_region() {
    let mut session = make_session();
    let main = session.open_popup(ElementRef::Title).unwrap();
    let table = session.open_popup(FEATURE_1).unwrap();
    assert_eq!(main, PopupScope::Region(Region::Main));
    assert_eq!(table, PopupScope::Region(Region::Table));
    assert!(session.popup(main).unwrap().is_open);
    assert!(session.popup(table).unwrap().is_open);
    assert_eq!(session.popup(table).unwrap().current_font_size, 14.0);
}

#[test]
fn pricing_popups_survive_selecting_another_region() {
    let mut session = make_session();
    click(&mut session, 150.0, 60.0);
    let main = session.open_popup(ElementRef::Title).unwrap();
    click(&mut session, 150.0, 210.0);
    let table = session.open_popup(FEATURE_0).unwrap();
    assert_eq!(session.popups().open_scopes().count(), 2);
    assert!(session.popup(main).unwrap().is_open);

    // Another feature displaces the table popup only.
    click(&mut session, 150.0, 250.0);
    assert!(session.popup(main).unwrap().is_open);
    assert!(!session.popup(table).unwrap().is_open);
}

#[test]
fn popup_style_routes_to_the_addressed_feature() {
    let mut session = make_session();
    click(&mut session, 150.0, 250.0);
    let scope = session.open_popup(FEATURE_1).unwrap();
    let effects = session.popup_style(scope, StyleChange::FontSize(18.0));
    let patches = updates(&effects);
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].field_name(), "planFeature_0_1Style");
    assert_eq!(
        session.document().get(FEATURE_1).unwrap().effective_style().font_size,
        18.0
    );
    // Other feature untouched.
    assert_eq!(session.document().get(FEATURE_0).unwrap().style, None);
}

#[test]
fn popup_delete_removes_target() {
    let mut session = make_session();
    click(&mut session, 150.0, 120.0);
    let scope = session.open_popup(ElementRef::Subtitle).unwrap();
    let effects = session.popup_delete(scope);
    assert_eq!(updates(&effects), vec![&Patch::delete(ElementRef::Subtitle)]);
    assert!(!session.document().is_live(ElementRef::Subtitle));
    assert!(!session.popup(scope).unwrap().is_open);
    assert_eq!(session.selected(), None);
}

#[test]
fn popup_controls_after_delete_emit_nothing() {
    let mut session = make_session();
    click(&mut session, 150.0, 120.0);
    let scope = session.open_popup(ElementRef::Subtitle).unwrap();
    session.popup_delete(scope);

    let effects = session.popup_style(scope, StyleChange::FontSize(40.0));
    assert!(updates(&effects).is_empty());
    assert!(updates(&session.popup_delete(scope)).is_empty());
    assert_eq!(session.document().get(ElementRef::Subtitle).unwrap().style, None);
}

#[test]
fn invalid_font_size_is_not_committed() {
    let mut session = make_session();
    click(&mut session, 150.0, 60.0);
    let scope = session.open_popup(ElementRef::Title).unwrap();
    let effects = session.popup_style(scope, StyleChange::FontSize(f64::NAN));
    assert!(updates(&effects).is_empty());
    let effects = session.popup_style(scope, StyleChange::FontFamily("Inter; x: y".into()));
    assert!(updates(&effects).is_empty());
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn resize_clamps_to_floor() {
    let mut session = make_session();
    click(&mut session, 150.0, 60.0);
    let handle = session.hit(Point::new(500.0, 70.0));
    assert_eq!(handle, PointerTarget::Handle(ElementRef::Title, ResizeHandle::E));

    session.handle(&InputEvent::pointer_down(500.0, 70.0, handle));
    session.handle(&InputEvent::pointer_move(150.0, 70.0));
    assert_eq!(session.selection(ElementRef::Title).unwrap().transform.width, Some(100.0));
    let effects = session.handle(&InputEvent::pointer_up(120.0, 70.0));
    let patches = updates(&effects);
    let Change::Transform(t) = &patches[0].change else {
        panic!("expected a transform patch, got {patches:?}");
    };
    assert_eq!(t.width, Some(100.0));
    assert_eq!(t.height, None);
}

#[test]
fn resize_floor_comes_from_config() {
    init_logging();
    let doc = Document::from_json(include_str!("fixtures/pricing.json")).unwrap();
    let config = EditorConfig::from_json(r#"{"minWidth": 150}"#).unwrap();
    let mut session = CanvasSession::new(doc, config);
    session.set_element_bounds(LOGO, Rect::new(600.0, 200.0, 720.0, 260.0));
    session.handle(&InputEvent::pointer_down(650.0, 220.0, PointerTarget::Element(LOGO)));
    session.handle(&InputEvent::pointer_up(650.0, 220.0));
    session.handle(&InputEvent::pointer_down(
        720.0,
        260.0,
        PointerTarget::Handle(LOGO, ResizeHandle::SE),
    ));
    let effects = session.handle(&InputEvent::pointer_up(600.0, 300.0));
    let patches = updates(&effects);
    let Change::Transform(t) = &patches[0].change else {
        panic!("expected a transform patch, got {patches:?}");
    };
    assert_eq!(t.width, Some(150.0));
    assert_eq!(t.height, Some(100.0));
}

// ─── Text editing ────────────────────────────────────────────────────────

#[test]
fn escape_restores_pre_edit_text_without_update() {
    let mut session = make_session();
    edit(&mut session, ElementRef::Subtitle);
    session.text_input("Something else entirely");
    let effects = session.handle(&InputEvent::key("Escape"));
    assert!(updates(&effects).is_empty());
    assert!(session.editing().is_none());
    assert_eq!(
        session.document().get(ElementRef::Subtitle).unwrap().content.as_text(),
        Some("Simple plans for every stage")
    );
}

#[test]
fn blur_commits_final_text_once() {
    let mut session = make_session();
    edit(&mut session, FEATURE_0);
    session.text_input("10 decks");
    session.text_input("Unlimited decks");
    let mut effects = session.blur();
    effects.extend(session.blur());
    assert_eq!(updates(&effects), vec![&Patch::text(FEATURE_0, "Unlimited decks")]);
    assert_eq!(
        updates(&effects)[0].to_json(),
        serde_json::json!({ "planFeature_0_0": "Unlimited decks" })
    );
}

#[test]
fn shift_enter_inserts_newline_instead_of_committing() {
    let mut session = make_session();
    edit(&mut session, ElementRef::Title);
    let effects = session.handle(&InputEvent::Key {
        key: "Enter".into(),
        modifiers: deck_editor::Modifiers::SHIFT,
    });
    assert!(updates(&effects).is_empty());
    assert_eq!(session.editing().unwrap().draft(), "Pricing\n");
    let effects = session.handle(&InputEvent::key("Enter"));
    assert_eq!(updates(&effects), vec![&Patch::text(ElementRef::Title, "Pricing\n")]);
}

// ─── Uploads ─────────────────────────────────────────────────────────────

#[test]
fn failed_upload_leaves_image_and_alerts_once() {
    let mut session = make_session();
    let before = session.document().get(LOGO).unwrap().clone();
    let ticket = session.begin_upload(LOGO).unwrap();
    assert!(session.image_view(LOGO).is_some_and(|v| !v.interactive));

    let effects = session.finish_upload(ticket, Err(UploadError::Network("offline".into())));
    let alerts = effects.iter().filter(|e| matches!(e, Effect::Alert(_))).count();
    assert_eq!(alerts, 1);
    assert!(updates(&effects).is_empty());
    assert_eq!(session.document().get(LOGO).unwrap(), &before);
    assert!(!session.is_uploading(LOGO));
}

#[test]
fn uploading_image_ignores_pointer() {
    let mut session = make_session();
    session.begin_upload(LOGO).unwrap();
    let effects = click(&mut session, 650.0, 220.0);
    assert!(effects.is_empty());
    assert_eq!(session.selected(), None);
}

#[test]
fn upload_result_after_teardown_is_ignored() {
    let mut session = make_session();
    let ticket = session.begin_upload(LOGO).unwrap();
    session.teardown();
    let effects = session.finish_upload(ticket, Ok("https://cdn.example.com/late.png".into()));
    assert!(effects.is_empty());
    assert_eq!(
        session.document().get(LOGO).unwrap().content.as_image_url(),
        Some("https://cdn.example.com/brand/logo.png")
    );
}

#[test]
fn deleting_an_uploading_image_drops_its_result() {
    let mut session = make_session();
    let ticket = session.begin_upload(LOGO).unwrap();
    session.apply_external(&Patch::delete(LOGO));
    assert!(!session.is_uploading(LOGO));

    let effects = session.finish_upload(ticket, Ok("https://cdn.example.com/x.png".into()));
    assert!(effects.is_empty());
    assert_eq!(
        session.document().get(LOGO).unwrap().content.as_image_url(),
        Some("https://cdn.example.com/brand/logo.png")
    );
}

#[test]
fn successful_upload_replaces_image() {
    let mut session = make_session();
    let ticket = session.begin_upload(LOGO).unwrap();
    assert!(session.begin_upload(LOGO).is_none());
    let effects = session.finish_upload(ticket, Ok("https://cdn.example.com/new.png".into()));
    assert_eq!(
        updates(&effects),
        vec![&Patch::image_url(LOGO, "https://cdn.example.com/new.png")]
    );
    assert_eq!(
        session.image_view(LOGO).unwrap().url,
        "https://cdn.example.com/new.png"
    );
}

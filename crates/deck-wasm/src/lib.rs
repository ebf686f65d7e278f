//! WASM bridge for the deck canvas. Exposes the editing core to the web app.
//!
//! Compiled via `wasm-pack build --target web`. The host renders slides in
//! the DOM, forwards pointer/keyboard/popup events here, and executes the
//! returned effects. Every event method returns a JSON array of effects:
//!
//! ```json
//! [{"type":"capturePointer","value":"title"},
//!  {"type":"update","value":{"titleTransform":{"offsetX":30,"offsetY":2,...}}},
//!  {"type":"renderNeeded"}]
//! ```

mod upload;

use deck_core::model::TransformPatch;
use deck_core::style::StyleChange;
use deck_core::{Document, ElementRef, Patch, Point, PointerTarget, Rect};
use deck_editor::{
    CanvasSession, EditorConfig, Effect, InputEvent, Modifiers, PopupScope, UploadError,
    UploadTicket,
};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

/// The main WASM-facing canvas controller.
///
/// Holds the canvas session and the tickets of uploads the host is
/// currently running. All interaction from the web app goes through here.
#[wasm_bindgen]
pub struct DeckCanvas {
    session: CanvasSession,
    uploads: HashMap<u32, UploadTicket>,
    next_upload: u32,
}

#[wasm_bindgen]
impl DeckCanvas {
    /// Create a canvas for a slide document. `config_json` overrides
    /// editor defaults (resize floor, drag threshold, popup policy…).
    #[wasm_bindgen(constructor)]
    pub fn new(document_json: &str, config_json: Option<String>) -> Result<DeckCanvas, JsValue> {
        setup_console();
        let document = Document::from_json(document_json).map_err(to_js)?;
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(to_js)?,
            None => EditorConfig::default(),
        };
        Ok(Self {
            session: CanvasSession::new(document, config),
            uploads: HashMap::new(),
            next_upload: 0,
        })
    }

    // ─── Measurement ─────────────────────────────────────────────────────

    pub fn set_root_bounds(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.session
            .set_root_bounds(Rect::new(x, y, x + width, y + height));
    }

    /// Returns `false` if the element is not on the canvas.
    pub fn set_element_bounds(
        &mut self,
        element: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<bool, JsValue> {
        let element = parse_element(element).map_err(to_js)?;
        Ok(self
            .session
            .set_element_bounds(element, Rect::new(x, y, x + width, y + height)))
    }

    pub fn measure_text(&mut self, scroll_height: f64) {
        self.session.measure_text(scroll_height);
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    /// Pointer-down classified from DOM markers: the `data-element` id of
    /// the nearest marked ancestor, the `data-handle` of the node itself,
    /// and whether the node is the live text input. Pass no element for a
    /// canvas click.
    #[allow(clippy::too_many_arguments)]
    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        element: Option<String>,
        handle: Option<String>,
        text_input: bool,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<String, JsValue> {
        let element = element.as_deref().map(parse_element).transpose().map_err(to_js)?;
        let target = PointerTarget::from_markers(element, handle.as_deref(), text_input);
        Ok(self.dispatch(InputEvent::PointerDown {
            x,
            y,
            target,
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        }))
    }

    /// Pointer-down classified by hit testing the measured surfaces.
    pub fn pointer_down_at(&mut self, x: f64, y: f64) -> String {
        let target = self.session.hit(Point::new(x, y));
        self.dispatch(InputEvent::pointer_down(x, y, target))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::pointer_move(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::pointer_up(x, y))
    }

    pub fn double_click(&mut self, element: &str) -> Result<String, JsValue> {
        let element = parse_element(element).map_err(to_js)?;
        Ok(self.dispatch(InputEvent::DoubleClick {
            target: PointerTarget::Element(element),
        }))
    }

    pub fn key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        self.dispatch(InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    // ─── Text editing ────────────────────────────────────────────────────

    pub fn text_input(&mut self, text: &str) -> String {
        effects_to_json(&self.session.text_input(text))
    }

    pub fn blur(&mut self) -> String {
        effects_to_json(&self.session.blur())
    }

    // ─── Popup ───────────────────────────────────────────────────────────

    /// Open the style popup for `element`. Returns the popup scope as JSON,
    /// or `null` if the element is not on the canvas.
    pub fn open_popup(&mut self, element: &str) -> Result<String, JsValue> {
        let element = parse_element(element).map_err(to_js)?;
        let scope = self.session.open_popup(element);
        Ok(serde_json::to_string(&scope).unwrap_or_else(|_| "null".into()))
    }

    /// `change_json` is e.g. `{"property":"fontSize","value":24}`.
    pub fn popup_style(&mut self, scope_json: &str, change_json: &str) -> Result<String, JsValue> {
        let scope = parse_scope(scope_json).map_err(to_js)?;
        let change: StyleChange = serde_json::from_str(change_json).map_err(to_js)?;
        Ok(effects_to_json(&self.session.popup_style(scope, change)))
    }

    pub fn popup_delete(&mut self, scope_json: &str) -> Result<String, JsValue> {
        let scope = parse_scope(scope_json).map_err(to_js)?;
        Ok(effects_to_json(&self.session.popup_delete(scope)))
    }

    pub fn close_popup(&mut self, scope_json: &str) -> Result<String, JsValue> {
        let scope = parse_scope(scope_json).map_err(to_js)?;
        Ok(effects_to_json(&self.session.close_popup(scope)))
    }

    pub fn popup_state(&self, scope_json: &str) -> Result<String, JsValue> {
        let scope = parse_scope(scope_json).map_err(to_js)?;
        serde_json::to_string(&self.session.popup(scope)).map_err(to_js)
    }

    // ─── Element actions ─────────────────────────────────────────────────

    /// Merge a partial transform (e.g. `{"scale":1.5}`) into an element.
    pub fn set_transform(&mut self, element: &str, patch_json: &str) -> Result<String, JsValue> {
        let element = parse_element(element).map_err(to_js)?;
        let patch: TransformPatch = serde_json::from_str(patch_json).map_err(to_js)?;
        Ok(effects_to_json(&self.session.set_transform(element, &patch)))
    }

    pub fn delete_selected(&mut self) -> String {
        effects_to_json(&self.session.delete_selected())
    }

    pub fn deselect_all(&mut self) -> String {
        effects_to_json(&self.session.deselect_all())
    }

    /// Apply a change made outside the canvas. `patch_json` is a serialized
    /// patch, e.g. `{"target":"title","change":{"text":"Hi"}}`.
    pub fn apply_external(&mut self, patch_json: &str) -> Result<String, JsValue> {
        let patch: Patch = serde_json::from_str(patch_json).map_err(to_js)?;
        Ok(effects_to_json(&self.session.apply_external(&patch)))
    }

    // ─── Uploads ─────────────────────────────────────────────────────────

    /// Reserve an upload slot for `element`. Returns an upload id to pass
    /// to `finish_upload`, or `undefined` if the element cannot take one
    /// right now.
    pub fn begin_upload(&mut self, element: &str) -> Result<Option<u32>, JsValue> {
        let element = parse_element(element).map_err(to_js)?;
        let Some(ticket) = self.session.begin_upload(element) else {
            return Ok(None);
        };
        self.next_upload = self.next_upload.wrapping_add(1);
        self.uploads.insert(self.next_upload, ticket);
        Ok(Some(self.next_upload))
    }

    /// Resolve an upload with the stored URL.
    pub fn finish_upload(&mut self, upload: u32, url: String) -> String {
        self.resolve_upload(upload, Ok(url))
    }

    /// Resolve an upload with the rejection value of `upload_image`.
    pub fn fail_upload(&mut self, upload: u32, error: &str) -> String {
        self.resolve_upload(upload, Err(parse_upload_error(error)))
    }

    /// The canvas is unmounting. Results of uploads still running are
    /// ignored from now on.
    pub fn teardown(&mut self) -> String {
        self.uploads.clear();
        effects_to_json(&self.session.teardown())
    }

    // ─── Views ───────────────────────────────────────────────────────────

    /// Live element ids, as a JSON array.
    pub fn elements(&self) -> String {
        serde_json::to_string(&self.session.document().element_refs())
            .unwrap_or_else(|_| "[]".into())
    }

    pub fn selected(&self) -> Option<String> {
        self.session.selected().map(|el| el.to_string())
    }

    pub fn text_view(&self, element: &str) -> Result<String, JsValue> {
        let element = parse_element(element).map_err(to_js)?;
        serde_json::to_string(&self.session.text_view(element)).map_err(to_js)
    }

    pub fn image_view(&self, element: &str) -> Result<String, JsValue> {
        let element = parse_element(element).map_err(to_js)?;
        serde_json::to_string(&self.session.image_view(element)).map_err(to_js)
    }

    pub fn document_json(&self) -> Result<String, JsValue> {
        self.session.document().to_json().map_err(to_js)
    }
}

impl DeckCanvas {
    fn dispatch(&mut self, event: InputEvent) -> String {
        effects_to_json(&self.session.handle(&event))
    }

    fn resolve_upload(&mut self, upload: u32, result: Result<String, UploadError>) -> String {
        match self.uploads.remove(&upload) {
            Some(ticket) => effects_to_json(&self.session.finish_upload(ticket, result)),
            None => {
                log::debug!("unknown upload {upload} ignored");
                "[]".to_string()
            }
        }
    }
}

/// Upload `file` to `endpoint`. Resolves to the stored image URL; rejects
/// with a JSON-encoded upload error for `DeckCanvas::fail_upload`.
#[wasm_bindgen]
pub async fn upload_image(endpoint: String, file: web_sys::File) -> Result<String, JsValue> {
    upload::post_image(&endpoint, &file).await.map_err(|err| {
        let json = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
        JsValue::from_str(&json)
    })
}

// ─── Conversions ─────────────────────────────────────────────────────────

fn parse_element(id: &str) -> Result<ElementRef, String> {
    id.parse::<ElementRef>().map_err(|e| e.to_string())
}

fn parse_scope(json: &str) -> Result<PopupScope, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid popup scope {json}: {e}"))
}

/// Rejections that are not a serialized `UploadError` (e.g. a thrown
/// `TypeError`) count as network failures.
fn parse_upload_error(error: &str) -> UploadError {
    serde_json::from_str(error).unwrap_or_else(|_| UploadError::Network(error.to_string()))
}

fn effect_to_value(effect: &Effect) -> serde_json::Value {
    match effect {
        Effect::Update(patch) => serde_json::json!({ "type": "update", "value": patch.to_json() }),
        other => serde_json::to_value(other).unwrap_or(serde_json::Value::Null),
    }
}

fn effects_to_json(effects: &[Effect]) -> String {
    let values: Vec<serde_json::Value> = effects.iter().map(effect_to_value).collect();
    serde_json::Value::Array(values).to_string()
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

// ─── Console setup ───────────────────────────────────────────────────────

fn setup_console() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SETUP: Once = Once::new();
        SETUP.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("deck WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if console_log::init_with_level(log::Level::Debug).is_err() {
                web_sys::console::warn_1(&"deck: logger already installed".into());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::Region;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn update_effects_carry_single_key_patch() {
        let effects = [
            Effect::CapturePointer(ElementRef::Title),
            Effect::Update(Patch::text(ElementRef::Title, "Hello")),
            Effect::RenderNeeded,
        ];
        let value: serde_json::Value = serde_json::from_str(&effects_to_json(&effects)).unwrap();
        assert_eq!(
            value,
            json!([
                { "type": "capturePointer", "value": "title" },
                { "type": "update", "value": { "title": "Hello" } },
                { "type": "renderNeeded" }
            ])
        );
    }

    #[test]
    fn scopes_and_elements_parse() {
        assert_eq!(parse_scope(r#""layout""#), Ok(PopupScope::Layout));
        assert_eq!(
            parse_scope(r#"{"region":"table"}"#),
            Ok(PopupScope::Region(Region::Table))
        );
        assert!(parse_scope("{}").is_err());
        assert_eq!(
            parse_element("plan-1-feature-3"),
            Ok(ElementRef::PlanFeature {
                plan: 1,
                feature: 3
            })
        );
        assert!(parse_element("plan-x").is_err());
    }

    #[test]
    fn upload_rejections_decode() {
        assert_eq!(parse_upload_error(r#"{"status":413}"#), UploadError::Status(413));
        assert_eq!(
            parse_upload_error("TypeError: Failed to fetch"),
            UploadError::Network("TypeError: Failed to fetch".into())
        );
    }
}

//! Multipart image upload over `fetch`.

use deck_editor::UploadError;
use gloo_net::http::Request;
use serde::Deserialize;
use wasm_bindgen::JsValue;
use web_sys::{File, FormData};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// POST `file` as the `file` field of a `multipart/form-data` body and
/// return the URL the server stored it under.
pub async fn post_image(endpoint: &str, file: &File) -> Result<String, UploadError> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob("file", file).map_err(js_error)?;

    let response = Request::post(endpoint)
        .body(form)
        .map_err(|e| UploadError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| UploadError::Network(e.to_string()))?;
    if !response.ok() {
        return Err(UploadError::Status(response.status()));
    }

    let body: UploadResponse = response
        .json()
        .await
        .map_err(|e| UploadError::MalformedResponse(e.to_string()))?;
    parse_url(body)
}

fn parse_url(body: UploadResponse) -> Result<String, UploadError> {
    if body.url.trim().is_empty() {
        return Err(UploadError::MalformedResponse("empty url".into()));
    }
    Ok(body.url)
}

fn js_error(value: JsValue) -> UploadError {
    UploadError::Network(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

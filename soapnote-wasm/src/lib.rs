//! Bridge WASM <-> JavaScript cho màn hình chỉnh sửa ghi chú khám.

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use soapnote_codec::procedure::{render_sections, sectionize};
use soapnote_codec::{format_for_clipboard, parse_document_with_report, serialize_with_config};
use soapnote_core::{ClinicalDocument, CodecConfig, CodecError, EncounterMeta};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsCodecConfig {
    #[serde(default)]
    indent: Option<usize>,
    #[serde(default)]
    history_placeholder: Option<String>,
}

impl From<JsCodecConfig> for CodecConfig {
    fn from(cfg: JsCodecConfig) -> Self {
        let mut base = CodecConfig::default();
        if let Some(indent) = cfg.indent {
            base.indent = indent;
        }
        if let Some(placeholder) = cfg.history_placeholder {
            base.history_placeholder = placeholder;
        }
        base
    }
}

/// Tách văn bản thô thành tài liệu có cấu trúc (kèm danh sách trường bị mặc định).
#[wasm_bindgen]
pub fn parse_note(raw: &str) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    to_js(&parse_document_with_report(raw))
}

/// Ghi tài liệu có cấu trúc trở lại định dạng văn bản thô để lưu.
#[wasm_bindgen]
pub fn serialize_note(document: JsValue, config: Option<JsValue>) -> Result<String, JsValue> {
    let mut document: ClinicalDocument = from_value(document).map_err(|err| {
        JsValue::from_str(&format_codec_error(CodecError::InvalidDocument(
            err.to_string(),
        )))
    })?;
    document.procedure = sectionize(&document.procedure_text);

    let cfg = match config {
        Some(js_cfg) => {
            let cfg: JsCodecConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            CodecConfig::from(cfg)
        }
        None => CodecConfig::default(),
    };

    serialize_with_config(&document, &cfg).map_err(|err| JsValue::from_str(&format_codec_error(err)))
}

/// Hiển thị các mục thủ thuật, thay placeholder ngày giờ nếu có thông tin buổi khám.
#[wasm_bindgen]
pub fn render_procedure(procedure_text: &str, meta: Option<JsValue>) -> Result<JsValue, JsValue> {
    let meta = match meta {
        Some(js_meta) if !js_meta.is_null() && !js_meta.is_undefined() => Some(
            from_value::<EncounterMeta>(js_meta)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được thời gian khám: {err}")))?,
        ),
        _ => None,
    };

    let document = sectionize(procedure_text);
    to_js(&render_sections(&document, meta.as_ref()))
}

/// Văn bản thuần để sao chép, theo tiêu đề mục ("Subjective", "Objective", ...).
#[wasm_bindgen]
pub fn format_clipboard(title: &str, data: JsValue) -> Result<String, JsValue> {
    if data.is_null() || data.is_undefined() {
        return Ok(String::new());
    }

    let value = from_value::<serde_json::Value>(data)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được dữ liệu: {err}")))?;
    Ok(format_for_clipboard(title, &value))
}

/// Map JSON được xuất thành object thường của JS, không phải `Map`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Không serialize được kết quả: {err}")))
}

fn format_codec_error(err: CodecError) -> String {
    format!("Codec error: {err}")
}

//! Mô hình dữ liệu lõi cho ghi chú khám bệnh (SOAP + thủ thuật + y lệnh).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Nhãn mặc định cho các mục tiền sử bị bỏ trống khi lưu.
pub const NOT_DISCUSSED: &str = "Not discussed";

/// Tiêu đề của mục thủ thuật được hiển thị dạng callout.
pub const CALLOUT_TITLE: &str = "Procedure Description";

/// Cấu hình điều chỉnh cách ghi lại văn bản thô.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodecConfig {
    /// Số khoảng trắng thụt lề cho khối Objective / Assessment and Plan.
    pub indent: usize,
    /// Giá trị thay thế cho các mục tiền sử rỗng.
    pub history_placeholder: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            history_placeholder: NOT_DISCUSSED.to_string(),
        }
    }
}

/// Phần Subjective của ghi chú. Mọi trường luôn có mặt, mặc định là chuỗi rỗng.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Subjective {
    pub chief_complaint: String,
    pub hpi: String,
    pub family_history: String,
    pub surgical_history: String,
    pub social_history: String,
    pub ros: String,
}

/// Một vấn đề trong phần Assessment and Plan.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Problem {
    #[serde(deserialize_with = "lenient_string")]
    pub problem: String,
    #[serde(deserialize_with = "lenient_string")]
    pub assessment: String,
    #[serde(deserialize_with = "lenient_string")]
    pub plan: String,
    /// Các khóa khác do hệ thống nguồn ghi thêm, giữ nguyên khi lưu lại.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AssessmentPlan {
    /// `null` đọc thành danh sách rỗng; mục dạng chuỗi trở thành `Problem { problem }`.
    #[serde(deserialize_with = "lenient_problems")]
    pub problems: Vec<Problem>,
    #[serde(deserialize_with = "lenient_string")]
    pub follow_up: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Toàn bộ phần SOAP đã tách trường.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SoapFields {
    pub patient: String,
    pub subjective: Subjective,
    pub objective: Map<String, Value>,
    #[serde(rename = "assessmentAndPlan")]
    pub assessment_and_plan: AssessmentPlan,
}

/// Cách trình bày một mục thủ thuật.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    #[default]
    Fielded,
    Callout,
}

/// Một mục có tiêu đề trong ghi chú thủ thuật.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
    pub kind: SectionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ProcedureDocument {
    pub sections: Vec<Section>,
}

impl ProcedureDocument {
    /// Tìm mục theo tiêu đề (so khớp chính xác).
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.title == title)
    }
}

/// Một dòng đã phân loại khi hiển thị mục thủ thuật.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcedureLine {
    Field { label: String, value: String },
    Narrative { text: String },
}

/// Mục thủ thuật sau khi phân loại dòng và thay thế placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedSection {
    pub title: String,
    pub kind: SectionKind,
    pub lines: Vec<ProcedureLine>,
}

/// Danh sách y lệnh. Mỗi y lệnh được giữ nguyên dạng JSON.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OrdersDocument {
    pub orders: Vec<Value>,
    pub confirmed: bool,
    /// Các khóa khác đi kèm đối tượng y lệnh, giữ nguyên khi lưu lại.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Trạng thái chỉnh sửa đầy đủ của một ghi chú khám.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ClinicalDocument {
    pub soap: SoapFields,
    /// Văn bản thủ thuật gốc, được ghi lại nguyên vẹn khi lưu.
    pub procedure_text: String,
    /// Góc nhìn có cấu trúc của `procedure_text`, chỉ để đọc/hiển thị.
    pub procedure: ProcedureDocument,
    pub orders: OrdersDocument,
}

/// Thời gian buổi khám do giao diện cung cấp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncounterMeta {
    pub date: String,
    pub start: String,
    pub end: String,
}

impl EncounterMeta {
    pub fn new(
        date: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Dựng từ mốc bắt đầu/kết thúc, ví dụ `1/1/2025`, `9:00 AM`, `9:30 AM`.
    pub fn from_times(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            date: start.format("%-m/%-d/%Y").to_string(),
            start: start.format("%-I:%M %p").to_string(),
            end: end.format("%-I:%M %p").to_string(),
        }
    }

    /// Chuỗi hiển thị `"<date>, <start> – <end>"`.
    pub fn display_range(&self) -> String {
        format!("{}, {} \u{2013} {}", self.date, self.start, self.end)
    }
}

/// Lỗi chung của bộ mã hóa ghi chú.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Không ghi được dữ liệu nhúng: {0}")]
    Encode(String),
    #[error("Tài liệu không hợp lệ: {0}")]
    InvalidDocument(String),
    #[error("Lỗi kho lưu trữ: {0}")]
    Store(String),
    #[error("Không tìm thấy tài liệu {0}")]
    NotFound(String),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    })
}

fn lenient_problems<'de, D>(deserializer: D) -> Result<Vec<Problem>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        single => vec![single],
    };

    entries
        .into_iter()
        .filter(|entry| !entry.is_null())
        .map(|entry| match entry {
            Value::Object(_) => serde_json::from_value(entry).map_err(serde::de::Error::custom),
            Value::String(problem) => Ok(Problem {
                problem,
                ..Problem::default()
            }),
            other => Ok(Problem {
                problem: other.to_string(),
                ..Problem::default()
            }),
        })
        .collect()
}

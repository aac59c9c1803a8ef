use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request aborted")]
    Aborted,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(u32),

    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// 画面に出すための本文（空の場合は呼び出し側で汎用メッセージに置き換える）
    pub fn detail(&self) -> String {
        match self {
            CoreError::JsError(msg)
            | CoreError::Network(msg)
            | CoreError::ParseError(msg)
            | CoreError::Config(msg)
            | CoreError::Other(msg) => msg.trim().to_string(),
            CoreError::Http { message, .. } => message.trim().to_string(),
            CoreError::Aborted => String::new(),
            CoreError::InvalidPageSize(_) => self.to_string(),
        }
    }
}

impl From<JsValue> for CoreError {
    fn from(value: JsValue) -> Self {
        if let Some(s) = value.as_string() {
            CoreError::JsError(s)
        } else {
            CoreError::JsError(format!("{:?}", value))
        }
    }
}

impl From<CoreError> for JsValue {
    fn from(error: CoreError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::ParseError(error.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for CoreError {
    fn from(error: serde_wasm_bindgen::Error) -> Self {
        CoreError::ParseError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

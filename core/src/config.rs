use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::{CoreError, Result};

/// 選択可能なページサイズ
pub const PAGE_SIZE_OPTIONS: [u32; 5] = [10, 15, 20, 25, 50];

pub const DEFAULT_POLL_INTERVAL_SECS: u32 = 30;
pub const ADMIN_PANEL_POLL_INTERVAL_SECS: u32 = 120;

pub fn is_valid_page_size(page_size: u32) -> bool {
    PAGE_SIZE_OPTIONS.contains(&page_size)
}

/// 一般ユーザー向けか管理者向けか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InboxScope {
    #[default]
    User,
    Admin,
}

impl InboxScope {
    /// 一覧取得のパス
    pub fn list_path(&self) -> &'static str {
        match self {
            InboxScope::User => "/notifications",
            InboxScope::Admin => "/notifications/admin",
        }
    }
}

/// 表示テンプレート
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InboxLayout {
    Compact,
    #[default]
    Full,
}

/// 受信箱の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboxConfig {
    pub base_url: String,
    pub scope: InboxScope,
    pub page_size_default: u32,
    pub poll_interval_secs: u32,
    pub include_stats: bool,
    pub layout: InboxLayout,
    pub auth_token: Option<String>,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self::user("/api")
    }
}

impl InboxConfig {
    /// ユーザー通知センター
    pub fn user(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            scope: InboxScope::User,
            page_size_default: 15,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            include_stats: true,
            layout: InboxLayout::Full,
            auth_token: None,
        }
    }

    /// 管理者通知センター
    pub fn admin(base_url: impl Into<String>) -> Self {
        Self {
            scope: InboxScope::Admin,
            page_size_default: 20,
            ..Self::user(base_url)
        }
    }

    /// ダッシュボード埋め込みの管理者パネル
    pub fn admin_panel(base_url: impl Into<String>) -> Self {
        Self {
            page_size_default: 10,
            poll_interval_secs: ADMIN_PANEL_POLL_INTERVAL_SECS,
            layout: InboxLayout::Compact,
            ..Self::admin(base_url)
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// 設定値の検証
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CoreError::Config("baseUrl must not be empty".to_string()));
        }
        if !is_valid_page_size(self.page_size_default) {
            return Err(CoreError::InvalidPageSize(self.page_size_default));
        }
        if self.poll_interval_secs == 0 {
            return Err(CoreError::Config(
                "pollIntervalSecs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval_ms(&self) -> f64 {
        self.poll_interval_secs as f64 * 1000.0
    }

    /// JSから渡された設定オブジェクトを読み込む
    pub fn from_js(value: JsValue) -> Result<Self> {
        let config: Self = serde_wasm_bindgen::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON文字列から読み込む
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let user = InboxConfig::user("https://api.example.com");
        assert_eq!(user.scope.list_path(), "/notifications");
        assert_eq!(user.page_size_default, 15);
        assert_eq!(user.poll_interval_secs, 30);

        let panel = InboxConfig::admin_panel("https://api.example.com");
        assert_eq!(panel.scope.list_path(), "/notifications/admin");
        assert_eq!(panel.poll_interval_secs, 120);
        assert_eq!(panel.layout, InboxLayout::Compact);
        assert!(panel.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = InboxConfig::from_json(
            r#"{"baseUrl":"https://api.example.com","scope":"admin","pageSizeDefault":25}"#,
        )
        .unwrap();
        assert_eq!(config.scope, InboxScope::Admin);
        assert_eq!(config.page_size_default, 25);
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.layout, InboxLayout::Full);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = InboxConfig::user("https://api.example.com");
        config.page_size_default = 12;
        assert!(matches!(config.validate(), Err(CoreError::InvalidPageSize(12))));

        let mut config = InboxConfig::user("https://api.example.com");
        config.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        assert!(InboxConfig::user("  ").validate().is_err());
    }
}

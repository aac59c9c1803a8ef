use inbox_core::config::InboxLayout;
use serde::{Deserialize, Serialize};

use crate::i18n::Language;

/// 表示設定（ブラウザごとに保存）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// 未保存なら起動時の設定に従う
    pub language: Option<Language>,
    /// レイアウトの上書き（None ならページ設定のまま）
    pub layout: Option<InboxLayout>,
}

impl Preferences {
    const STORAGE_KEY: &'static str = "inbox_preferences";

    /// LocalStorageから読み込み
    pub fn load() -> Self {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                    return Self::from_json(&json);
                }
            }
        }
        Self::default()
    }

    /// LocalStorageに保存
    pub fn save(&self) {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                if let Ok(json) = serde_json::to_string(self) {
                    if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                        log::warn!("Failed to save preferences");
                    }
                }
            }
        }
    }

    /// 壊れた保存値は既定値として扱う
    fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("Ignoring stored preferences: {}", e);
            Self::default()
        })
    }

    /// ページ設定と上書きを合わせた実際のレイアウト
    pub fn effective_layout(&self, configured: InboxLayout) -> InboxLayout {
        self.layout.unwrap_or(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let prefs = Preferences::from_json(r#"{"language":"en","layout":"compact"}"#);
        assert_eq!(prefs.language, Some(Language::English));
        assert_eq!(prefs.layout, Some(InboxLayout::Compact));
    }

    #[test]
    fn test_partial_and_broken_values() {
        let prefs = Preferences::from_json(r#"{"language":"ja"}"#);
        assert_eq!(prefs.language, Some(Language::Japanese));
        assert_eq!(prefs.layout, None);

        assert_eq!(Preferences::from_json("not json"), Preferences::default());
    }

    #[test]
    fn test_effective_layout() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.effective_layout(InboxLayout::Compact), InboxLayout::Compact);

        prefs.layout = Some(InboxLayout::Full);
        assert_eq!(prefs.effective_layout(InboxLayout::Compact), InboxLayout::Full);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_save_and_load_local_storage() {
        let prefs = Preferences {
            language: Some(Language::English),
            layout: Some(InboxLayout::Compact),
        };
        prefs.save();
        assert_eq!(Preferences::load(), prefs);
    }
}

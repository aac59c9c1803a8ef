/// 多言語対応リソース管理
use inbox_core::config::InboxLayout;
use inbox_core::countdown::{format_countdown, RoulettePhase};
use inbox_core::display::{DayGroup, PageSummary, RelativeTime};
use inbox_core::state::{InboxFailure, Operation};
use inbox_core::types::{NotificationKind, Priority};
use serde::{Deserialize, Serialize};

/// サポート言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Japanese => "ja",
            Language::English => "en",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Japanese => "日本語",
            Language::English => "English",
        }
    }

    pub fn all() -> &'static [Language] {
        &[Language::Japanese, Language::English]
    }
}

/// 文字列リソース
pub struct I18n {
    language: Language,
}

impl I18n {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    // トップバー
    pub fn app_title(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🎰 お知らせ",
            Language::English => "🎰 Notifications",
        }
    }

    pub fn tab_user(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🔔 通知",
            Language::English => "🔔 Inbox",
        }
    }

    pub fn tab_admin(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🛡 管理者通知",
            Language::English => "🛡 Admin",
        }
    }

    pub fn unread_badge(&self, count: u64) -> String {
        match self.language {
            Language::Japanese => format!("未読 {}", count),
            Language::English => format!("{} unread", count),
        }
    }

    pub fn button_settings(&self) -> &'static str {
        match self.language {
            Language::Japanese => "⚙️ 設定",
            Language::English => "⚙️ Settings",
        }
    }

    pub fn button_close(&self) -> &'static str {
        match self.language {
            Language::Japanese => "✖ 閉じる",
            Language::English => "✖ Close",
        }
    }

    // フィルター
    pub fn filter_priority(&self) -> &'static str {
        match self.language {
            Language::Japanese => "優先度",
            Language::English => "Priority",
        }
    }

    pub fn priority_all(&self) -> &'static str {
        match self.language {
            Language::Japanese => "すべて",
            Language::English => "All",
        }
    }

    pub fn priority_label(&self, priority: Priority) -> &'static str {
        match (self.language, priority) {
            (Language::Japanese, Priority::Urgent) => "緊急",
            (Language::Japanese, Priority::High) => "高",
            (Language::Japanese, Priority::Normal) => "通常",
            (Language::Japanese, Priority::Low) => "低",
            (Language::English, Priority::Urgent) => "Urgent",
            (Language::English, Priority::High) => "High",
            (Language::English, Priority::Normal) => "Normal",
            (Language::English, Priority::Low) => "Low",
        }
    }

    pub fn filter_unread_only(&self) -> &'static str {
        match self.language {
            Language::Japanese => "未読のみ",
            Language::English => "Unread only",
        }
    }

    /// 検索は現在ページのみが対象
    pub fn search_hint(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🔍 このページを絞り込み",
            Language::English => "🔍 Filter this page",
        }
    }

    pub fn page_size_label(&self) -> &'static str {
        match self.language {
            Language::Japanese => "表示件数",
            Language::English => "Per page",
        }
    }

    // 一括操作
    pub fn select_all_visible(&self) -> &'static str {
        match self.language {
            Language::Japanese => "☑ 表示中をすべて選択",
            Language::English => "☑ Select visible",
        }
    }

    pub fn clear_selection(&self) -> &'static str {
        match self.language {
            Language::Japanese => "選択解除",
            Language::English => "Clear selection",
        }
    }

    pub fn mark_selected_read(&self, count: usize) -> String {
        match self.language {
            Language::Japanese => format!("✔ 選択を既読 ({})", count),
            Language::English => format!("✔ Mark selected read ({})", count),
        }
    }

    pub fn mark_all_read(&self) -> &'static str {
        match self.language {
            Language::Japanese => "✔ すべて既読",
            Language::English => "✔ Mark all read",
        }
    }

    pub fn delete_read(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🗑 既読を削除",
            Language::English => "🗑 Delete read",
        }
    }

    pub fn refresh(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🔄 更新",
            Language::English => "🔄 Refresh",
        }
    }

    // 1件ごとの操作
    pub fn mark_read(&self) -> &'static str {
        match self.language {
            Language::Japanese => "既読にする",
            Language::English => "Mark read",
        }
    }

    pub fn delete(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🗑 削除",
            Language::English => "🗑 Delete",
        }
    }

    pub fn details(&self) -> &'static str {
        match self.language {
            Language::Japanese => "詳細",
            Language::English => "Details",
        }
    }

    // エラー
    pub fn error_dismiss(&self) -> &'static str {
        match self.language {
            Language::Japanese => "✖ 閉じる",
            Language::English => "✖ Dismiss",
        }
    }

    pub fn error_retry(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🔄 再試行",
            Language::English => "🔄 Retry",
        }
    }

    fn failure_fallback(&self, operation: Operation) -> &'static str {
        match self.language {
            Language::Japanese => match operation {
                Operation::Load => "通知の取得に失敗しました",
                Operation::MarkRead => "既読にできませんでした",
                Operation::MarkAllRead => "すべて既読にできませんでした",
                Operation::DeleteRead => "既読通知を削除できませんでした",
                Operation::DeleteOne => "通知を削除できませんでした",
            },
            Language::English => operation.fallback_message(),
        }
    }

    /// サーバーからの本文があればそれを、なければ操作ごとの汎用メッセージ
    pub fn failure_message(&self, failure: &InboxFailure) -> String {
        if failure.detail.is_empty() {
            self.failure_fallback(failure.operation).to_string()
        } else {
            failure.detail.clone()
        }
    }

    // 一覧
    pub fn loading(&self) -> &'static str {
        match self.language {
            Language::Japanese => "読み込み中...",
            Language::English => "Loading...",
        }
    }

    pub fn list_empty(&self) -> &'static str {
        match self.language {
            Language::Japanese => "通知はありません",
            Language::English => "No notifications",
        }
    }

    pub fn search_no_match(&self) -> &'static str {
        match self.language {
            Language::Japanese => "このページに一致する通知はありません",
            Language::English => "Nothing on this page matches",
        }
    }

    pub fn relative_time(&self, time: RelativeTime) -> String {
        match (self.language, time) {
            (Language::Japanese, RelativeTime::JustNow) => "たった今".to_string(),
            (Language::Japanese, RelativeTime::Minutes(n)) => format!("{}分前", n),
            (Language::Japanese, RelativeTime::Hours(n)) => format!("{}時間前", n),
            (Language::Japanese, RelativeTime::Days(n)) => format!("{}日前", n),
            (Language::Japanese, RelativeTime::Date(date)) => date.format("%Y/%m/%d").to_string(),
            (Language::English, RelativeTime::JustNow) => "just now".to_string(),
            (Language::English, RelativeTime::Minutes(n)) => format!("{}m ago", n),
            (Language::English, RelativeTime::Hours(n)) => format!("{}h ago", n),
            (Language::English, RelativeTime::Days(n)) => format!("{}d ago", n),
            (Language::English, RelativeTime::Date(date)) => date.format("%b %-d, %Y").to_string(),
        }
    }

    pub fn day_group(&self, group: DayGroup) -> &'static str {
        match (self.language, group) {
            (Language::Japanese, DayGroup::Today) => "今日",
            (Language::Japanese, DayGroup::Yesterday) => "昨日",
            (Language::Japanese, DayGroup::ThisWeek) => "今週",
            (Language::Japanese, DayGroup::Older) => "それ以前",
            (Language::English, DayGroup::Today) => "Today",
            (Language::English, DayGroup::Yesterday) => "Yesterday",
            (Language::English, DayGroup::ThisWeek) => "This week",
            (Language::English, DayGroup::Older) => "Older",
        }
    }

    pub fn kind_label(&self, kind: NotificationKind) -> &'static str {
        match self.language {
            Language::Japanese => match kind {
                NotificationKind::RouletteWinner => "当選",
                NotificationKind::RouletteStarted => "ルーレット開始",
                NotificationKind::RouletteEndingSoon => "まもなく締切",
                NotificationKind::RouletteCompleted => "抽選完了",
                NotificationKind::ParticipationConfirmed => "参加確定",
                NotificationKind::AdminSystemAlert => "システム警告",
                NotificationKind::AdminNewParticipant => "新規参加者",
                NotificationKind::AdminRouletteCompleted => "ルーレット終了",
                NotificationKind::AccountSecurity => "セキュリティ",
                NotificationKind::Welcome => "ようこそ",
                NotificationKind::Other => "お知らせ",
            },
            Language::English => match kind {
                NotificationKind::RouletteWinner => "Winner",
                NotificationKind::RouletteStarted => "Roulette started",
                NotificationKind::RouletteEndingSoon => "Ending soon",
                NotificationKind::RouletteCompleted => "Draw completed",
                NotificationKind::ParticipationConfirmed => "Participation confirmed",
                NotificationKind::AdminSystemAlert => "System alert",
                NotificationKind::AdminNewParticipant => "New participant",
                NotificationKind::AdminRouletteCompleted => "Roulette finished",
                NotificationKind::AccountSecurity => "Security",
                NotificationKind::Welcome => "Welcome",
                NotificationKind::Other => "Notice",
            },
        }
    }

    pub fn roulette_phase(&self, phase: &RoulettePhase) -> String {
        match (self.language, phase) {
            (Language::Japanese, RoulettePhase::Upcoming { starts_in }) => {
                format!("⏳ 開始まで {}", format_countdown(*starts_in))
            }
            (Language::Japanese, RoulettePhase::Open { closes_in: Some(d) }) => {
                format!("🟢 締切まで {}", format_countdown(*d))
            }
            (Language::Japanese, RoulettePhase::Open { closes_in: None }) => "🟢 受付中".to_string(),
            (Language::Japanese, RoulettePhase::AwaitingDraw { draws_in: Some(d) }) => {
                format!("🎲 抽選まで {}", format_countdown(*d))
            }
            (Language::Japanese, RoulettePhase::AwaitingDraw { draws_in: None }) => {
                "🎲 抽選待ち".to_string()
            }
            (Language::Japanese, RoulettePhase::Finished) => "🏁 抽選済み".to_string(),
            (Language::English, RoulettePhase::Upcoming { starts_in }) => {
                format!("⏳ Starts in {}", format_countdown(*starts_in))
            }
            (Language::English, RoulettePhase::Open { closes_in: Some(d) }) => {
                format!("🟢 Closes in {}", format_countdown(*d))
            }
            (Language::English, RoulettePhase::Open { closes_in: None }) => "🟢 Open".to_string(),
            (Language::English, RoulettePhase::AwaitingDraw { draws_in: Some(d) }) => {
                format!("🎲 Draw in {}", format_countdown(*d))
            }
            (Language::English, RoulettePhase::AwaitingDraw { draws_in: None }) => {
                "🎲 Awaiting draw".to_string()
            }
            (Language::English, RoulettePhase::Finished) => "🏁 Drawn".to_string(),
        }
    }

    // ページング
    pub fn prev_page(&self) -> &'static str {
        match self.language {
            Language::Japanese => "← 前へ",
            Language::English => "← Prev",
        }
    }

    pub fn next_page(&self) -> &'static str {
        match self.language {
            Language::Japanese => "次へ →",
            Language::English => "Next →",
        }
    }

    pub fn page_of(&self, page: u32, total_pages: u32) -> String {
        match self.language {
            Language::Japanese => format!("{} / {} ページ", page, total_pages),
            Language::English => format!("Page {} of {}", page, total_pages),
        }
    }

    pub fn showing(&self, visible: usize, on_page: usize, total: u64) -> String {
        match self.language {
            Language::Japanese => format!("このページの {} / {} 件を表示（全 {} 件）", visible, on_page, total),
            Language::English => format!(
                "Showing {} of {} on this page ({} total)",
                visible, on_page, total
            ),
        }
    }

    pub fn page_summary(&self, summary: &PageSummary) -> String {
        match self.language {
            Language::Japanese => format!(
                "このページ: 未読 {} ・ 緊急 {} ・ 高 {}",
                summary.unread,
                summary.count(Priority::Urgent),
                summary.count(Priority::High)
            ),
            Language::English => format!(
                "This page: {} unread · {} urgent · {} high",
                summary.unread,
                summary.count(Priority::Urgent),
                summary.count(Priority::High)
            ),
        }
    }

    // 設定
    pub fn settings_title(&self) -> &'static str {
        match self.language {
            Language::Japanese => "⚙️ 設定",
            Language::English => "⚙️ Settings",
        }
    }

    pub fn settings_language(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🌐 言語",
            Language::English => "🌐 Language",
        }
    }

    pub fn settings_layout(&self) -> &'static str {
        match self.language {
            Language::Japanese => "🗂 表示レイアウト",
            Language::English => "🗂 Layout",
        }
    }

    pub fn layout_from_config(&self) -> &'static str {
        match self.language {
            Language::Japanese => "ページ設定に従う",
            Language::English => "Use page default",
        }
    }

    pub fn layout_name(&self, layout: InboxLayout) -> &'static str {
        match (self.language, layout) {
            (Language::Japanese, InboxLayout::Compact) => "コンパクト",
            (Language::Japanese, InboxLayout::Full) => "フル",
            (Language::English, InboxLayout::Compact) => "Compact",
            (Language::English, InboxLayout::Full) => "Full",
        }
    }

    pub fn settings_saved(&self) -> &'static str {
        match self.language {
            Language::Japanese => "💾 保存しました",
            Language::English => "💾 Saved",
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(Language::Japanese)
    }
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知ID（APIによって整数または文字列）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NotificationId {
    Int(i64),
    Text(String),
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationId::Int(id) => write!(f, "{}", id),
            NotificationId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for NotificationId {
    fn from(id: i64) -> Self {
        NotificationId::Int(id)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        NotificationId::Text(id.to_string())
    }
}

/// 優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[Priority::Urgent, Priority::High, Priority::Normal, Priority::Low]
    }

    /// 強調表示するか
    pub fn is_elevated(&self) -> bool {
        matches!(self, Priority::Urgent | Priority::High)
    }
}

/// 通知レコード（サーバー所有、クライアントは読み取り専用キャッシュ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub roulette_id: Option<NotificationId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub extra_data: Option<serde_json::Value>,
}

impl NotificationRecord {
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::from_tag(&self.notification_type)
    }

    /// ローカル検索（大文字小文字を区別しない部分一致）
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle_lower)
            || self.message.to_lowercase().contains(needle_lower)
            || self.notification_type.to_lowercase().contains(needle_lower)
    }
}

/// 通知種別（アイコン・ラベル表示専用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    RouletteWinner,
    RouletteStarted,
    RouletteEndingSoon,
    RouletteCompleted,
    ParticipationConfirmed,
    AdminSystemAlert,
    AdminNewParticipant,
    AdminRouletteCompleted,
    AccountSecurity,
    Welcome,
    Other,
}

impl NotificationKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "roulette_winner" => NotificationKind::RouletteWinner,
            "roulette_started" => NotificationKind::RouletteStarted,
            "roulette_ending_soon" => NotificationKind::RouletteEndingSoon,
            "roulette_completed" => NotificationKind::RouletteCompleted,
            "participation_confirmed" => NotificationKind::ParticipationConfirmed,
            "admin_system_alert" => NotificationKind::AdminSystemAlert,
            "admin_new_participant" => NotificationKind::AdminNewParticipant,
            "admin_roulette_completed" => NotificationKind::AdminRouletteCompleted,
            "account_security" => NotificationKind::AccountSecurity,
            "welcome" => NotificationKind::Welcome,
            _ => NotificationKind::Other,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::RouletteWinner => "🏆",
            NotificationKind::RouletteStarted => "🎰",
            NotificationKind::RouletteEndingSoon => "⏰",
            NotificationKind::RouletteCompleted => "🏁",
            NotificationKind::ParticipationConfirmed => "🎟",
            NotificationKind::AdminSystemAlert => "🚨",
            NotificationKind::AdminNewParticipant => "👤",
            NotificationKind::AdminRouletteCompleted => "📊",
            NotificationKind::AccountSecurity => "🔒",
            NotificationKind::Welcome => "👋",
            NotificationKind::Other => "🔔",
        }
    }
}

/// 一覧取得パラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub page_size: u32,
    pub priority: Option<Priority>,
    pub unread_only: bool,
    pub include_stats: bool,
}

impl ListParams {
    /// クエリ文字列に変換（未設定のフィルターは送らない）
    pub fn to_query(&self) -> String {
        let mut pairs = vec![
            format!("page={}", self.page),
            format!("page_size={}", self.page_size),
        ];
        if let Some(priority) = self.priority {
            pairs.push(format!("priority={}", priority.as_str()));
        }
        if self.unread_only {
            pairs.push("unread_only=true".to_string());
        }
        if self.include_stats {
            pairs.push("include_stats=true".to_string());
        }
        pairs.join("&")
    }
}

/// 集計情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxStats {
    pub unread_count: u64,
}

/// 一覧レスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub results: Vec<NotificationRecord>,
    pub count: u64,
    #[serde(default)]
    pub stats: Option<InboxStats>,
}

/// 既読化リクエスト
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadRequest<'a> {
    pub ids: &'a [NotificationId],
}

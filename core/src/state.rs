//! 受信箱の表示状態
//!
//! I/Oを持たない同期的な状態機械。コントローラーはここで発行したチケットを
//! 使って取得を行い、結果を `finish_load` に戻す。世代番号が最新でない結果は
//! 破棄される。

use std::collections::HashSet;

use crate::config::is_valid_page_size;
use crate::error::{CoreError, Result};
use crate::types::{ListParams, ListResponse, NotificationId, NotificationRecord, Priority};

/// 失敗した操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    MarkRead,
    MarkAllRead,
    DeleteRead,
    DeleteOne,
}

impl Operation {
    /// サーバーから本文が得られなかった場合の汎用メッセージ
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Load => "Failed to load notifications",
            Operation::MarkRead => "Failed to mark notifications as read",
            Operation::MarkAllRead => "Failed to mark all notifications as read",
            Operation::DeleteRead => "Failed to delete read notifications",
            Operation::DeleteOne => "Failed to delete notification",
        }
    }
}

/// 直近の失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxFailure {
    pub operation: Operation,
    pub detail: String,
}

impl InboxFailure {
    pub fn new(operation: Operation, error: &CoreError) -> Self {
        Self {
            operation,
            detail: error.detail(),
        }
    }

    /// 表示用メッセージ（空なら汎用メッセージ）
    pub fn message(&self) -> String {
        if self.detail.is_empty() {
            self.operation.fallback_message().to_string()
        } else {
            self.detail.clone()
        }
    }
}

/// 受信箱の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxPhase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// 一覧取得のチケット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub params: ListParams,
}

/// 一覧取得の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 結果を反映した
    Applied { unread_count: Option<u64> },
    /// 件数は反映したが、ページ番号を詰めたので一覧は取り直しが必要
    Clamped { unread_count: Option<u64> },
    /// 失敗を記録した
    Failed,
    /// 新しいリクエストが発行済みのため破棄した
    Stale,
    /// 画面が破棄済み
    Disposed,
}

/// ceil(count / page_size)、最小1
pub fn total_pages_for(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = count.div_ceil(page_size as u64);
    pages.clamp(1, u32::MAX as u64) as u32
}

/// 受信箱の表示状態
#[derive(Debug, Clone)]
pub struct InboxViewState {
    page: u32,
    page_size: u32,
    total_count: u64,
    total_pages: u32,
    priority_filter: Option<Priority>,
    unread_only: bool,
    search_text: String,
    selected: HashSet<NotificationId>,
    list: Vec<NotificationRecord>,
    unread_count: Option<u64>,
    error: Option<InboxFailure>,
    generation: u64,
    active_load: Option<u64>,
    pending_mutations: u32,
    loaded_once: bool,
}

impl InboxViewState {
    pub fn new(page_size: u32) -> Result<Self> {
        if !is_valid_page_size(page_size) {
            return Err(CoreError::InvalidPageSize(page_size));
        }
        Ok(Self {
            page: 1,
            page_size,
            total_count: 0,
            total_pages: 1,
            priority_filter: None,
            unread_only: false,
            search_text: String::new(),
            selected: HashSet::new(),
            list: Vec::new(),
            unread_count: None,
            error: None,
            generation: 0,
            active_load: None,
            pending_mutations: 0,
            loaded_once: false,
        })
    }

    // === 参照 ===

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn priority_filter(&self) -> Option<Priority> {
        self.priority_filter
    }

    pub fn unread_only(&self) -> bool {
        self.unread_only
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn list(&self) -> &[NotificationRecord] {
        &self.list
    }

    pub fn unread_count(&self) -> Option<u64> {
        self.unread_count
    }

    pub fn error(&self) -> Option<&InboxFailure> {
        self.error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.active_load.is_some() || self.pending_mutations > 0
    }

    pub fn phase(&self) -> InboxPhase {
        if self.is_loading() {
            InboxPhase::Loading
        } else if self.error.is_some() {
            InboxPhase::Errored
        } else if self.loaded_once {
            InboxPhase::Loaded
        } else {
            InboxPhase::Idle
        }
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    /// 検索文字列で絞り込んだ現在ページの通知
    pub fn visible(&self) -> Vec<&NotificationRecord> {
        let needle = self.search_text.trim().to_lowercase();
        self.list
            .iter()
            .filter(|record| record.matches_search(&needle))
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible().len()
    }

    // === 取得 ===

    /// 取得開始。世代を進めて以前の取得を無効にする
    pub fn begin_load(&mut self, include_stats: bool) -> LoadTicket {
        self.generation += 1;
        self.active_load = Some(self.generation);
        LoadTicket {
            generation: self.generation,
            params: ListParams {
                page: self.page,
                page_size: self.page_size,
                priority: self.priority_filter,
                unread_only: self.unread_only,
                include_stats,
            },
        }
    }

    /// 取得完了
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<ListResponse>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            return LoadOutcome::Stale;
        }
        self.release_load(ticket.generation);

        match result {
            Ok(response) => {
                self.total_count = response.count;
                self.total_pages = total_pages_for(self.total_count, self.page_size);
                let clamped = self.page > self.total_pages;
                if clamped {
                    self.page = self.total_pages;
                }
                self.list = response.results;

                let ids: HashSet<&NotificationId> = self.list.iter().map(|r| &r.id).collect();
                self.selected.retain(|id| ids.contains(id));

                let unread_count = response.stats.map(|stats| stats.unread_count);
                if unread_count.is_some() {
                    self.unread_count = unread_count;
                }
                self.error = None;
                self.loaded_once = true;
                if clamped {
                    LoadOutcome::Clamped { unread_count }
                } else {
                    LoadOutcome::Applied { unread_count }
                }
            }
            Err(e) => {
                self.error = Some(InboxFailure::new(Operation::Load, &e));
                LoadOutcome::Failed
            }
        }
    }

    /// 取得スロットを解放（同じ世代の場合のみ）
    pub fn release_load(&mut self, generation: u64) {
        if self.active_load == Some(generation) {
            self.active_load = None;
        }
    }

    // === 変更操作 ===

    pub fn begin_mutation(&mut self) {
        self.pending_mutations += 1;
    }

    pub fn end_mutation(&mut self) {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);
    }

    /// 変更操作の完了。成功したら true
    pub fn finish_mutation(
        &mut self,
        operation: Operation,
        result: Result<()>,
        clear_selection: bool,
    ) -> bool {
        if clear_selection {
            self.selected.clear();
        }
        match result {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(InboxFailure::new(operation, &e));
                false
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // === フィルター・ページング ===

    /// 優先度フィルター変更。変わった場合はページを1に戻して true
    pub fn set_priority_filter(&mut self, priority: Option<Priority>) -> bool {
        if self.priority_filter == priority {
            return false;
        }
        self.priority_filter = priority;
        self.reset_page();
        true
    }

    pub fn set_unread_only(&mut self, unread_only: bool) -> bool {
        if self.unread_only == unread_only {
            return false;
        }
        self.unread_only = unread_only;
        self.reset_page();
        true
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<bool> {
        if !is_valid_page_size(page_size) {
            return Err(CoreError::InvalidPageSize(page_size));
        }
        if self.page_size == page_size {
            return Ok(false);
        }
        self.page_size = page_size;
        self.total_pages = total_pages_for(self.total_count, self.page_size);
        self.reset_page();
        Ok(true)
    }

    /// ページ移動（[1, total_pages] に丸める）。変わった場合は true
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.clamp(1, self.total_pages);
        if self.page == page {
            return false;
        }
        self.page = page;
        self.selected.clear();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.page.saturating_sub(1))
    }

    /// 検索文字列（ページはリセットしない）
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    fn reset_page(&mut self) {
        self.page = 1;
        self.selected.clear();
    }

    // === 選択 ===

    pub fn is_selected(&self, id: &NotificationId) -> bool {
        self.selected.contains(id)
    }

    pub fn toggle_selected(&mut self, id: &NotificationId) {
        if !self.selected.remove(id) && self.list.iter().any(|r| &r.id == id) {
            self.selected.insert(id.clone());
        }
    }

    /// 表示中の通知をすべて選択
    pub fn select_all_visible(&mut self) {
        let ids: Vec<NotificationId> = self.visible().iter().map(|r| r.id.clone()).collect();
        self.selected.extend(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// 選択中のID（現在ページの並び順）
    pub fn selected_ids(&self) -> Vec<NotificationId> {
        self.list
            .iter()
            .filter(|r| self.selected.contains(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InboxStats;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, priority: Priority, is_read: bool) -> NotificationRecord {
        NotificationRecord {
            id: id.into(),
            title: format!("title {}", id),
            message: format!("message {}", id),
            notification_type: "roulette_started".to_string(),
            priority,
            is_read,
            roulette_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap(),
            extra_data: None,
        }
    }

    fn response(ids: &[i64], count: u64, unread: Option<u64>) -> ListResponse {
        ListResponse {
            results: ids.iter().map(|id| record(*id, Priority::Normal, false)).collect(),
            count,
            stats: unread.map(|unread_count| InboxStats { unread_count }),
        }
    }

    fn loaded(ids: &[i64], count: u64) -> InboxViewState {
        let mut state = InboxViewState::new(15).unwrap();
        let ticket = state.begin_load(true);
        state.finish_load(&ticket, Ok(response(ids, count, None)));
        state
    }

    #[test]
    fn test_total_pages_arithmetic() {
        assert_eq!(total_pages_for(0, 15), 1);
        assert_eq!(total_pages_for(15, 15), 1);
        assert_eq!(total_pages_for(16, 15), 2);
        assert_eq!(total_pages_for(100, 10), 10);
        assert_eq!(total_pages_for(101, 50), 3);
    }

    #[test]
    fn test_rejects_unknown_page_size() {
        assert!(InboxViewState::new(12).is_err());
        let mut state = InboxViewState::new(10).unwrap();
        assert!(matches!(state.set_page_size(30), Err(CoreError::InvalidPageSize(30))));
        assert_eq!(state.page_size(), 10);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut state = loaded(&[1, 2, 3], 45);
        assert!(state.set_page(3));
        assert_eq!(state.page(), 3);

        assert!(state.set_priority_filter(Some(Priority::Urgent)));
        assert_eq!(state.page(), 1);

        let ticket = state.begin_load(false);
        assert_eq!(ticket.params.page, 1);
        assert_eq!(ticket.params.priority, Some(Priority::Urgent));

        // 同じ値では変化しない
        assert!(!state.set_priority_filter(Some(Priority::Urgent)));
    }

    #[test]
    fn test_unread_only_and_page_size_reset_page() {
        let mut state = loaded(&[1], 45);
        state.set_page(2);
        assert!(state.set_unread_only(true));
        assert_eq!(state.page(), 1);

        state.set_page(3);
        assert!(state.set_page_size(50).unwrap());
        assert_eq!(state.page(), 1);
        assert_eq!(state.total_pages(), 1);
    }

    #[test]
    fn test_page_is_clamped() {
        let mut state = loaded(&[1], 31);
        assert_eq!(state.total_pages(), 3);
        assert!(state.set_page(99));
        assert_eq!(state.page(), 3);
        assert!(!state.next_page());
        assert!(state.set_page(0));
        assert_eq!(state.page(), 1);
        assert!(!state.prev_page());
    }

    #[test]
    fn test_search_does_not_reset_page() {
        let mut state = loaded(&[1, 2, 12], 40);
        state.set_page(2);
        state.set_search_text("TITLE 1");
        assert_eq!(state.page(), 2);
        assert_eq!(state.visible_count(), 2);
        assert_eq!(state.total_pages(), 3);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = InboxViewState::new(15).unwrap();
        let first = state.begin_load(false);
        let second = state.begin_load(false);

        let outcome = state.finish_load(&second, Ok(response(&[2], 1, None)));
        assert!(matches!(outcome, LoadOutcome::Applied { .. }));
        assert!(!state.is_loading());

        let outcome = state.finish_load(&first, Ok(response(&[1], 1, None)));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(state.list()[0].id, NotificationId::Int(2));
    }

    #[test]
    fn test_stale_settlement_keeps_loading() {
        let mut state = InboxViewState::new(15).unwrap();
        let first = state.begin_load(false);
        let _second = state.begin_load(false);

        state.finish_load(&first, Err(CoreError::Aborted));
        assert!(state.is_loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_failure_keeps_last_good_list() {
        let mut state = loaded(&[1, 2], 2);
        let ticket = state.begin_load(false);
        assert_eq!(state.phase(), InboxPhase::Loading);

        let outcome = state.finish_load(&ticket, Err(CoreError::Network("offline".into())));
        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(state.list().len(), 2);
        assert_eq!(state.phase(), InboxPhase::Errored);
        assert_eq!(state.error().unwrap().message(), "offline");
    }

    #[test]
    fn test_failure_message_falls_back() {
        let failure = InboxFailure::new(Operation::DeleteOne, &CoreError::Aborted);
        assert_eq!(failure.message(), "Failed to delete notification");
    }

    #[test]
    fn test_selection_clears_on_page_change() {
        let mut state = loaded(&[5, 7, 9], 30);
        state.toggle_selected(&5.into());
        state.toggle_selected(&7.into());
        assert_eq!(state.selected_count(), 2);

        state.next_page();
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_selection_survives_same_page_refresh() {
        let mut state = loaded(&[5, 7, 9], 3);
        state.toggle_selected(&5.into());
        state.toggle_selected(&7.into());

        let ticket = state.begin_load(false);
        state.finish_load(&ticket, Ok(response(&[7, 9], 2, None)));
        assert_eq!(state.selected_ids(), vec![NotificationId::Int(7)]);
    }

    #[test]
    fn test_toggle_ignores_ids_not_on_page() {
        let mut state = loaded(&[1], 1);
        state.toggle_selected(&42.into());
        assert_eq!(state.selected_count(), 0);
        state.toggle_selected(&1.into());
        state.toggle_selected(&1.into());
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_select_all_visible_respects_search() {
        let mut state = loaded(&[1, 2, 10], 3);
        state.set_search_text("title 1");
        state.select_all_visible();
        assert_eq!(
            state.selected_ids(),
            vec![NotificationId::Int(1), NotificationId::Int(10)]
        );
    }

    #[test]
    fn test_mutation_loading_and_selection() {
        let mut state = loaded(&[1, 2], 2);
        state.toggle_selected(&1.into());
        state.begin_mutation();
        assert!(state.is_loading());

        let ok = state.finish_mutation(
            Operation::MarkRead,
            Err(CoreError::Network(String::new())),
            true,
        );
        state.end_mutation();
        assert!(!ok);
        assert!(!state.is_loading());
        assert_eq!(state.selected_count(), 0);
        assert_eq!(
            state.error().unwrap().message(),
            "Failed to mark notifications as read"
        );
    }

    #[test]
    fn test_shrinking_count_clamps_page() {
        let mut state = loaded(&[1], 40);
        state.set_page(3);
        let ticket = state.begin_load(false);
        let outcome = state.finish_load(&ticket, Ok(response(&[], 20, Some(0))));
        assert_eq!(outcome, LoadOutcome::Clamped { unread_count: Some(0) });
        assert_eq!(state.total_pages(), 2);
        assert_eq!(state.page(), 2);
        assert_eq!(state.unread_count(), Some(0));

        // 取り直しは詰めたページを要求する
        let retry = state.begin_load(false);
        assert_eq!(retry.params.page, 2);
        let outcome = state.finish_load(&retry, Ok(response(&[5, 4], 20, Some(0))));
        assert_eq!(outcome, LoadOutcome::Applied { unread_count: Some(0) });
        assert_eq!(state.list().len(), 2);
    }
}

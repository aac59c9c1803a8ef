pub mod types;
pub mod config;
pub mod state;
pub mod poll;
pub mod api;
pub mod display;
pub mod countdown;
pub mod error;

use std::cell::{Cell, Ref, RefCell};
use std::future::Future;
use std::rc::Rc;

pub use error::{CoreError, Result};

use crate::api::NotificationApi;
use crate::config::InboxConfig;
use crate::poll::PollTimer;
use crate::state::{InboxViewState, LoadOutcome, Operation};
use crate::types::{NotificationId, Priority};

/// 取得スロットを解放するガード（キャンセル時も含め必ずローディングが解除される）
struct LoadGuard {
    state: Rc<RefCell<InboxViewState>>,
    generation: u64,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.release_load(self.generation);
        }
    }
}

/// 変更操作中のカウントを戻すガード
struct MutationGuard {
    state: Rc<RefCell<InboxViewState>>,
}

impl MutationGuard {
    fn new(state: Rc<RefCell<InboxViewState>>) -> Self {
        state.borrow_mut().begin_mutation();
        Self { state }
    }
}

impl Drop for MutationGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.end_mutation();
        }
    }
}

/// InboxController: UIから使用される受信箱のメインAPI
///
/// ユーザー向け・管理者向け・ダッシュボード埋め込みのいずれも
/// `InboxConfig` の違いだけで同じコントローラーを使う。
pub struct InboxController {
    config: InboxConfig,
    api: Rc<dyn NotificationApi>,
    state: Rc<RefCell<InboxViewState>>,
    poll: RefCell<PollTimer>,
    on_unread: RefCell<Option<Box<dyn Fn(u64)>>>,
    disposed: Cell<bool>,
}

impl InboxController {
    /// 初期化
    pub fn new(config: InboxConfig, api: Rc<dyn NotificationApi>) -> Result<Self> {
        config.validate()?;
        let state = InboxViewState::new(config.page_size_default)?;
        let poll = PollTimer::new(config.poll_interval_ms());

        Ok(Self {
            config,
            api,
            state: Rc::new(RefCell::new(state)),
            poll: RefCell::new(poll),
            on_unread: RefCell::new(None),
            disposed: Cell::new(false),
        })
    }

    pub fn config(&self) -> &InboxConfig {
        &self.config
    }

    /// 描画用に状態を参照（awaitをまたいで保持しないこと）
    pub fn state(&self) -> Ref<'_, InboxViewState> {
        self.state.borrow()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// 未読数の通知先を設定（ナビゲーションバーのバッジなど）
    pub fn set_unread_callback(&self, callback: impl Fn(u64) + 'static) {
        *self.on_unread.borrow_mut() = Some(Box::new(callback));
    }

    // === ライフサイクル ===

    /// マウント: 定期更新を開始（初回は即時）
    pub fn mount(&self, now_ms: f64) {
        if self.disposed.get() {
            return;
        }
        log::info!(
            "Inbox mounted ({:?}, every {}s)",
            self.config.scope,
            self.config.poll_interval_secs
        );
        self.poll.borrow_mut().start(now_ms);
    }

    /// アンマウント: タイマー停止、進行中のリクエストを中断
    pub fn unmount(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.poll.borrow_mut().stop();
        self.api.cancel_all();
        log::info!("Inbox unmounted ({:?})", self.config.scope);
    }

    /// 定期更新の時刻に達したか（達していれば次回を予約）
    pub fn poll_due(&self, now_ms: f64) -> bool {
        !self.disposed.get() && self.poll.borrow_mut().take_due(now_ms)
    }

    /// 定期処理
    pub async fn tick(&self, now_ms: f64) -> Option<LoadOutcome> {
        if self.poll_due(now_ms) {
            Some(self.load().await)
        } else {
            None
        }
    }

    // === 取得 ===

    /// 一覧を取得して状態を置き換える。エラーは状態に記録され、呼び出し元には返らない
    ///
    /// 件数が減って現在ページが範囲外になった場合は、詰めたページを1回だけ取り直す。
    pub async fn load(&self) -> LoadOutcome {
        let outcome = self.load_once().await;
        if !matches!(outcome, LoadOutcome::Clamped { .. }) {
            return outcome;
        }
        log::debug!("Page clamped to {}, reloading", self.state.borrow().page());
        self.load_once().await
    }

    async fn load_once(&self) -> LoadOutcome {
        if self.disposed.get() {
            return LoadOutcome::Disposed;
        }

        let ticket = self.state.borrow_mut().begin_load(self.config.include_stats);
        let _guard = LoadGuard {
            state: self.state.clone(),
            generation: ticket.generation,
        };
        log::debug!("load #{}: {}", ticket.generation, ticket.params.to_query());

        let result = self.api.list(&ticket.params).await;
        if self.disposed.get() {
            return LoadOutcome::Disposed;
        }

        let outcome = self.state.borrow_mut().finish_load(&ticket, result);
        match outcome {
            LoadOutcome::Applied { unread_count: Some(count) }
            | LoadOutcome::Clamped { unread_count: Some(count) } => {
                if let Some(callback) = self.on_unread.borrow().as_ref() {
                    callback(count);
                }
            }
            LoadOutcome::Stale => {
                log::debug!("load #{}: discarded stale response", ticket.generation);
            }
            LoadOutcome::Failed => {
                if let Some(failure) = self.state.borrow().error() {
                    log::warn!("load #{} failed: {}", ticket.generation, failure.message());
                }
            }
            _ => {}
        }
        outcome
    }

    // === フィルター・ページング ===

    pub async fn set_priority_filter(&self, priority: Option<Priority>) {
        let changed = self.state.borrow_mut().set_priority_filter(priority);
        if changed {
            self.load().await;
        }
    }

    pub async fn set_unread_only(&self, unread_only: bool) {
        let changed = self.state.borrow_mut().set_unread_only(unread_only);
        if changed {
            self.load().await;
        }
    }

    pub async fn set_page_size(&self, page_size: u32) -> Result<()> {
        let changed = self.state.borrow_mut().set_page_size(page_size)?;
        if changed {
            self.load().await;
        }
        Ok(())
    }

    pub async fn set_page(&self, page: u32) {
        let changed = self.state.borrow_mut().set_page(page);
        if changed {
            self.load().await;
        }
    }

    pub async fn next_page(&self) {
        let changed = self.state.borrow_mut().next_page();
        if changed {
            self.load().await;
        }
    }

    pub async fn prev_page(&self) {
        let changed = self.state.borrow_mut().prev_page();
        if changed {
            self.load().await;
        }
    }

    /// 現在ページ内の絞り込み（取得はしない）
    pub fn set_search_text(&self, text: impl Into<String>) {
        self.state.borrow_mut().set_search_text(text);
    }

    // === 選択 ===

    pub fn toggle_selected(&self, id: &NotificationId) {
        self.state.borrow_mut().toggle_selected(id);
    }

    pub fn select_all_visible(&self) {
        self.state.borrow_mut().select_all_visible();
    }

    pub fn clear_selection(&self) {
        self.state.borrow_mut().clear_selection();
    }

    pub fn dismiss_error(&self) {
        self.state.borrow_mut().dismiss_error();
    }

    // === 変更操作（完了後にサーバーと再同期） ===

    pub async fn mark_read(&self, ids: Vec<NotificationId>) -> bool {
        if ids.is_empty() {
            return false;
        }
        let api = self.api.clone();
        self.mutate(Operation::MarkRead, true, async move {
            api.mark_as_read(&ids).await
        })
        .await
    }

    pub async fn mark_selected_read(&self) -> bool {
        let ids = self.state.borrow().selected_ids();
        self.mark_read(ids).await
    }

    pub async fn mark_all_read(&self) -> bool {
        let api = self.api.clone();
        self.mutate(Operation::MarkAllRead, false, async move {
            api.mark_all_as_read().await
        })
        .await
    }

    pub async fn delete_read(&self) -> bool {
        let api = self.api.clone();
        self.mutate(Operation::DeleteRead, true, async move {
            api.delete_read_notifications().await
        })
        .await
    }

    pub async fn delete_one(&self, id: NotificationId) -> bool {
        let api = self.api.clone();
        self.mutate(Operation::DeleteOne, true, async move {
            api.delete_notification(&id).await
        })
        .await
    }

    async fn mutate<F>(&self, operation: Operation, clear_selection: bool, request: F) -> bool
    where
        F: Future<Output = Result<()>>,
    {
        if self.disposed.get() {
            return false;
        }

        let guard = MutationGuard::new(self.state.clone());
        let result = request.await;
        if self.disposed.get() {
            return false;
        }

        if let Err(e) = &result {
            log::warn!("{:?} failed: {}", operation, e);
        } else {
            log::info!("{:?} succeeded", operation);
        }
        let succeeded = self
            .state
            .borrow_mut()
            .finish_mutation(operation, result, clear_selection);
        drop(guard);

        if succeeded {
            self.load().await;
        }
        succeeded
    }
}

impl Drop for InboxController {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockNotificationApi, MockOp};
    use crate::state::InboxPhase;
    use crate::types::NotificationRecord;
    use chrono::{Duration, TimeZone, Utc};
    use std::cell::Cell;

    fn record(id: i64, priority: Priority, is_read: bool) -> NotificationRecord {
        NotificationRecord {
            id: id.into(),
            title: format!("Roulette #{}", id),
            message: "message".to_string(),
            notification_type: "roulette_started".to_string(),
            priority,
            is_read,
            roulette_id: Some(id.into()),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap() + Duration::minutes(id),
            extra_data: None,
        }
    }

    fn controller(api: &MockNotificationApi) -> InboxController {
        let api: Rc<dyn NotificationApi> = Rc::new(api.clone());
        InboxController::new(InboxConfig::user("https://api.example.com"), api).unwrap()
    }

    fn seeded(count: i64) -> MockNotificationApi {
        let records = (1..=count).map(|id| record(id, Priority::Normal, false));
        MockNotificationApi::with_records(records.collect())
    }

    #[tokio::test]
    async fn test_load_applies_response_and_fires_badge() {
        let api = MockNotificationApi::with_records(vec![record(1, Priority::Urgent, false)]);
        let ctrl = controller(&api);
        let badge = Rc::new(Cell::new(None));
        let badge_ref = badge.clone();
        ctrl.set_unread_callback(move |n| badge_ref.set(Some(n)));

        let outcome = ctrl.load().await;
        assert_eq!(outcome, LoadOutcome::Applied { unread_count: Some(1) });
        assert_eq!(badge.get(), Some(1));

        let state = ctrl.state();
        assert_eq!(state.total_pages(), 1);
        assert_eq!(state.list().len(), 1);
        assert!(!state.is_loading());
        assert_eq!(state.phase(), InboxPhase::Loaded);
    }

    #[tokio::test]
    async fn test_loading_clears_on_failure() {
        let api = seeded(3);
        let ctrl = controller(&api);
        ctrl.load().await;

        api.fail_next(MockOp::List, "boom");
        let outcome = ctrl.load().await;
        assert_eq!(outcome, LoadOutcome::Failed);

        let state = ctrl.state();
        assert!(!state.is_loading());
        assert_eq!(state.error().unwrap().message(), "boom");
        assert_eq!(state.list().len(), 3);
    }

    #[tokio::test]
    async fn test_loading_is_true_while_in_flight() {
        let api = seeded(1);
        let ctrl = controller(&api);
        let hold = api.hold_next_list();
        let observer = &ctrl;

        let (outcome, was_loading) = tokio::join!(ctrl.load(), async move {
            hold.entered.await.unwrap();
            let loading = observer.state().is_loading();
            hold.release.send(()).unwrap();
            loading
        });
        assert!(was_loading);
        assert!(matches!(outcome, LoadOutcome::Applied { .. }));
        assert!(!ctrl.state().is_loading());
    }

    #[tokio::test]
    async fn test_dropped_load_releases_loading() {
        let api = seeded(1);
        let ctrl = controller(&api);
        let _hold = api.hold_next_list();

        {
            let mut fut = Box::pin(ctrl.load());
            // 1回だけポーリングして保留状態にする
            let mut cx = std::task::Context::from_waker(std::task::Waker::noop());
            assert!(fut.as_mut().poll(&mut cx).is_pending());
            assert!(ctrl.state().is_loading());
        }
        assert!(!ctrl.state().is_loading());
    }

    #[tokio::test]
    async fn test_filter_change_reloads_from_first_page() {
        let api = seeded(40);
        let ctrl = controller(&api);
        ctrl.load().await;
        ctrl.set_page(3).await;
        assert_eq!(ctrl.state().page(), 3);

        ctrl.set_priority_filter(Some(Priority::Urgent)).await;
        assert_eq!(ctrl.state().page(), 1);
        match api.calls().last() {
            Some(crate::api::mock::MockCall::List(params)) => {
                assert_eq!(params.page, 1);
                assert_eq!(params.priority, Some(Priority::Urgent));
            }
            other => panic!("Expected list call, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unchanged_filter_does_not_fetch() {
        let api = seeded(2);
        let ctrl = controller(&api);
        ctrl.load().await;
        ctrl.set_unread_only(false).await;
        ctrl.set_page(1).await;
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_page_size_change() {
        let api = seeded(40);
        let ctrl = controller(&api);
        ctrl.load().await;
        assert_eq!(ctrl.state().total_pages(), 3);

        ctrl.set_page_size(50).await.unwrap();
        assert_eq!(ctrl.state().total_pages(), 1);
        assert_eq!(ctrl.state().list().len(), 40);
        assert!(ctrl.set_page_size(7).await.is_err());
    }

    #[tokio::test]
    async fn test_poll_fires_on_mount_and_interval() {
        let api = seeded(1);
        let ctrl = controller(&api);

        assert!(ctrl.tick(0.0).await.is_none());
        ctrl.mount(1_000.0);
        assert!(ctrl.tick(1_000.0).await.is_some());
        assert!(ctrl.tick(20_000.0).await.is_none());
        assert!(ctrl.tick(31_000.0).await.is_some());
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_unmount_stops_everything() {
        let api = seeded(1);
        let ctrl = controller(&api);
        ctrl.mount(0.0);
        ctrl.unmount();

        assert!(ctrl.tick(100_000.0).await.is_none());
        assert_eq!(ctrl.load().await, LoadOutcome::Disposed);
        assert!(!ctrl.mark_all_read().await);
        assert_eq!(api.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_unmount_during_load_ignores_response() {
        let api = seeded(2);
        let ctrl = controller(&api);
        let hold = api.hold_next_list();
        let observer = &ctrl;

        let (outcome, _) = tokio::join!(ctrl.load(), async move {
            hold.entered.await.unwrap();
            observer.unmount();
            hold.release.send(()).unwrap();
        });
        assert_eq!(outcome, LoadOutcome::Disposed);
        assert!(ctrl.state().list().is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_success_resyncs_and_clears_selection() {
        let api = seeded(3);
        let ctrl = controller(&api);
        ctrl.load().await;
        ctrl.toggle_selected(&1.into());
        ctrl.toggle_selected(&2.into());

        assert!(ctrl.mark_selected_read().await);
        assert_eq!(ctrl.state().selected_count(), 0);
        assert_eq!(ctrl.state().unread_count(), Some(1));
        assert_eq!(api.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_mark_read_empty_is_noop() {
        let api = seeded(1);
        let ctrl = controller(&api);
        assert!(!ctrl.mark_read(vec![]).await);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_list_and_skips_resync() {
        let api = seeded(2);
        let ctrl = controller(&api);
        ctrl.load().await;
        ctrl.toggle_selected(&1.into());

        api.fail_next(MockOp::DeleteOne, "");
        assert!(!ctrl.delete_one(1.into()).await);

        let state = ctrl.state();
        assert_eq!(state.error().unwrap().message(), "Failed to delete notification");
        assert_eq!(state.selected_count(), 0);
        assert_eq!(state.list().len(), 2);
        assert!(!state.is_loading());
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_mark_all_read_keeps_selection_until_resync() {
        let api = seeded(2);
        let ctrl = controller(&api);
        ctrl.load().await;
        ctrl.toggle_selected(&2.into());

        assert!(ctrl.mark_all_read().await);
        assert_eq!(ctrl.state().selected_ids(), vec![NotificationId::Int(2)]);
        assert_eq!(ctrl.state().unread_count(), Some(0));
    }

    #[tokio::test]
    async fn test_delete_read_on_last_page_reloads_clamped_page() {
        let records = (1..=40).map(|id| record(id, Priority::Normal, id <= 20));
        let api = MockNotificationApi::with_records(records.collect());
        let ctrl = controller(&api);
        ctrl.load().await;
        ctrl.set_page(3).await;
        assert_eq!(ctrl.state().list().len(), 10);

        assert!(ctrl.delete_read().await);

        let state = ctrl.state();
        assert_eq!(state.total_pages(), 2);
        assert_eq!(state.page(), 2);
        let ids: Vec<NotificationId> = state.list().iter().map(|r| r.id.clone()).collect();
        let expected: Vec<NotificationId> = (21..=25).rev().map(NotificationId::Int).collect();
        assert_eq!(ids, expected);
        assert!(state.list().iter().all(|r| !r.is_read));
        assert_eq!(state.unread_count(), Some(20));
        assert!(!state.is_loading());
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::api::NotificationApi;
use crate::error::{CoreError, Result};
use crate::types::{InboxStats, ListParams, ListResponse, NotificationId, NotificationRecord};

/// 失敗を注入する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    List,
    MarkRead,
    MarkAllRead,
    DeleteOne,
    DeleteRead,
}

/// 呼び出し履歴
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    List(ListParams),
    MarkRead(Vec<NotificationId>),
    MarkAllRead,
    DeleteOne(NotificationId),
    DeleteRead,
}

/// 次の一覧取得を止めておくためのハンドル
///
/// `entered` はリクエストが届いた（レスポンス内容が確定した）時点で完了し、
/// `release` を送るとレスポンスが返る。
pub struct ListHold {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

struct HeldList {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

#[derive(Default)]
struct MockServer {
    records: Vec<NotificationRecord>,
    failures: HashMap<MockOp, String>,
    calls: Vec<MockCall>,
    held: Option<HeldList>,
}

impl MockServer {
    /// 失敗が注入されていれば取り出す
    fn take_failure(&mut self, op: MockOp) -> Result<()> {
        match self.failures.remove(&op) {
            Some(message) => Err(CoreError::Network(message)),
            None => Ok(()),
        }
    }

    fn unread_count(&self) -> u64 {
        self.records.iter().filter(|r| !r.is_read).count() as u64
    }

    fn snapshot(&self, params: &ListParams) -> ListResponse {
        let mut matching: Vec<&NotificationRecord> = self
            .records
            .iter()
            .filter(|r| params.priority.map_or(true, |p| r.priority == p))
            .filter(|r| !params.unread_only || !r.is_read)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = (params.page.saturating_sub(1) as usize) * params.page_size as usize;
        ListResponse {
            count: matching.len() as u64,
            results: matching
                .into_iter()
                .skip(skip)
                .take(params.page_size as usize)
                .cloned()
                .collect(),
            stats: params.include_stats.then(|| InboxStats {
                unread_count: self.unread_count(),
            }),
        }
    }
}

/// テスト用のモック通知API（メモリ上のサーバー）
#[derive(Clone, Default)]
pub struct MockNotificationApi {
    server: Arc<Mutex<MockServer>>,
}

impl MockNotificationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<NotificationRecord>) -> Self {
        let api = Self::new();
        api.lock().records = records;
        api
    }

    fn lock(&self) -> MutexGuard<'_, MockServer> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// サーバー側に通知を追加
    pub fn push(&self, record: NotificationRecord) {
        self.lock().records.push(record);
    }

    pub fn records(&self) -> Vec<NotificationRecord> {
        self.lock().records.clone()
    }

    pub fn unread_count(&self) -> u64 {
        self.lock().unread_count()
    }

    /// 次の1回だけ失敗させる
    pub fn fail_next(&self, op: MockOp, message: impl Into<String>) {
        self.lock().failures.insert(op, message.into());
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, MockCall::List(_)))
            .count()
    }

    /// 次の一覧取得のレスポンスを保留する
    pub fn hold_next_list(&self) -> ListHold {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.lock().held = Some(HeldList {
            entered: entered_tx,
            release: release_rx,
        });
        ListHold {
            entered: entered_rx,
            release: release_tx,
        }
    }
}

#[async_trait(?Send)]
impl NotificationApi for MockNotificationApi {
    async fn list(&self, params: &ListParams) -> Result<ListResponse> {
        let (result, held) = {
            let mut server = self.lock();
            server.calls.push(MockCall::List(params.clone()));
            let result = server.take_failure(MockOp::List).map(|_| server.snapshot(params));
            (result, server.held.take())
        };

        if let Some(held) = held {
            let _ = held.entered.send(());
            let _ = held.release.await;
        }
        result
    }

    async fn mark_as_read(&self, ids: &[NotificationId]) -> Result<()> {
        let mut server = self.lock();
        server.calls.push(MockCall::MarkRead(ids.to_vec()));
        server.take_failure(MockOp::MarkRead)?;
        for record in server.records.iter_mut().filter(|r| ids.contains(&r.id)) {
            record.is_read = true;
        }
        Ok(())
    }

    async fn mark_all_as_read(&self) -> Result<()> {
        let mut server = self.lock();
        server.calls.push(MockCall::MarkAllRead);
        server.take_failure(MockOp::MarkAllRead)?;
        for record in server.records.iter_mut() {
            record.is_read = true;
        }
        Ok(())
    }

    async fn delete_notification(&self, id: &NotificationId) -> Result<()> {
        let mut server = self.lock();
        server.calls.push(MockCall::DeleteOne(id.clone()));
        server.take_failure(MockOp::DeleteOne)?;
        let before = server.records.len();
        server.records.retain(|r| &r.id != id);
        if server.records.len() == before {
            return Err(CoreError::Http {
                status: 404,
                message: format!("Notification {} not found", id),
            });
        }
        Ok(())
    }

    async fn delete_read_notifications(&self) -> Result<()> {
        let mut server = self.lock();
        server.calls.push(MockCall::DeleteRead);
        server.take_failure(MockOp::DeleteRead)?;
        server.records.retain(|r| !r.is_read);
        Ok(())
    }
}

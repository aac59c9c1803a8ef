pub mod fetch;
pub mod mock;

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{ListParams, ListResponse, NotificationId};

/// 通知APIの抽象trait
///
/// WASM環境ではシングルスレッドのため、Send + Sync要件なし
#[async_trait(?Send)]
pub trait NotificationApi {
    /// 一覧取得
    async fn list(&self, params: &ListParams) -> Result<ListResponse>;

    /// 指定IDを既読にする
    async fn mark_as_read(&self, ids: &[NotificationId]) -> Result<()>;

    /// すべて既読にする
    async fn mark_all_as_read(&self) -> Result<()>;

    /// 1件削除
    async fn delete_notification(&self, id: &NotificationId) -> Result<()>;

    /// 既読を一括削除
    async fn delete_read_notifications(&self) -> Result<()>;

    /// 進行中のリクエストをすべて中断
    fn cancel_all(&self) {}
}

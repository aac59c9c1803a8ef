use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, DomException, Request, RequestInit, RequestMode, Response};

use crate::api::NotificationApi;
use crate::config::{InboxConfig, InboxScope};
use crate::error::{CoreError, Result};
use crate::types::{ListParams, ListResponse, MarkReadRequest, NotificationId};

/// `/notifications/` 直下で意味を持つパス要素
const RESERVED_SEGMENTS: [&str; 7] = ["", ".", "..", "read", "admin", "mark-read", "mark-all-read"];

/// エンドポイントURLの組み立て

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    base_url: String,
    scope: InboxScope,
}

impl Routes {
    pub fn new(base_url: &str, scope: InboxScope) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            scope,
        }
    }

    pub fn list(&self, params: &ListParams) -> String {
        format!("{}{}?{}", self.base_url, self.scope.list_path(), params.to_query())
    }

    pub fn mark_read(&self) -> String {
        format!("{}/notifications/mark-read", self.base_url)
    }

    pub fn mark_all_read(&self) -> String {
        format!("{}/notifications/mark-all-read", self.base_url)
    }

    /// 1件削除のURL。IDはパス1要素としてエンコードし、他のルートと衝突する値は拒否する
    pub fn delete_one(&self, id: &NotificationId) -> Result<String> {
        let segment = id.to_string();
        if RESERVED_SEGMENTS.contains(&segment.as_str()) {
            return Err(CoreError::Other(format!(
                "Notification id {:?} collides with a reserved route",
                segment
            )));
        }
        Ok(format!(
            "{}/notifications/{}",
            self.base_url,
            urlencoding::encode(&segment)
        ))
    }

    pub fn delete_read(&self) -> String {
        format!("{}/notifications/read", self.base_url)
    }
}

/// エラーレスポンス本文からメッセージを取り出す
pub fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return String::new();
    };
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .unwrap_or("")
        .to_string()
}

/// fetch()によるAPI実装
pub struct FetchApi {
    routes: Routes,
    auth_token: Option<String>,
    // 一覧取得は常に最新の1件だけを生かす
    list_abort: RefCell<Option<(u64, AbortController)>>,
    mutations: RefCell<HashMap<u64, AbortController>>,
    next_request_id: Cell<u64>,
}

impl FetchApi {
    pub fn new(config: &InboxConfig) -> Self {
        Self {
            routes: Routes::new(&config.base_url, config.scope),
            auth_token: config.auth_token.clone(),
            list_abort: RefCell::new(None),
            mutations: RefCell::new(HashMap::new()),
            next_request_id: Cell::new(0),
        }
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// リクエストを組み立てる
    pub fn build_request(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
        controller: &AbortController,
    ) -> Result<Request> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        opts.set_signal(Some(&controller.signal()));
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(url, &opts)?;
        let headers = request.headers();
        headers.set("Accept", "application/json")?;
        if body.is_some() {
            headers.set("Content-Type", "application/json")?;
        }
        if let Some(token) = &self.auth_token {
            headers.set("Authorization", &format!("Bearer {}", token))?;
        }
        Ok(request)
    }

    /// 送信して本文を返す
    async fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&str>,
        controller: &AbortController,
    ) -> Result<String> {
        let request = self.build_request(method, url, body, controller)?;
        let window = web_sys::window().ok_or_else(|| CoreError::JsError("No window".to_string()))?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(map_fetch_error)?
            .dyn_into()?;
        let text = JsFuture::from(response.text()?)
            .await
            .map_err(map_fetch_error)?
            .as_string()
            .unwrap_or_default();

        if !response.ok() {
            log::warn!("{} {} -> {}", method, url, response.status());
            return Err(CoreError::Http {
                status: response.status(),
                message: extract_error_message(&text),
            });
        }
        Ok(text)
    }

    fn take_request_id(&self) -> u64 {
        let id = self.next_request_id.get();
        self.next_request_id.set(id + 1);
        id
    }

    /// 変更系リクエスト
    async fn mutate(&self, method: &str, url: &str, body: Option<String>) -> Result<()> {
        let controller = AbortController::new()?;
        let request_id = self.take_request_id();
        self.mutations
            .borrow_mut()
            .insert(request_id, controller.clone());

        let result = self.send(method, url, body.as_deref(), &controller).await;
        self.mutations.borrow_mut().remove(&request_id);
        result.map(|_| ())
    }
}

fn map_fetch_error(value: JsValue) -> CoreError {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        if exception.name() == "AbortError" {
            return CoreError::Aborted;
        }
        return CoreError::Network(exception.message());
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return CoreError::Network(String::from(error.message()));
    }
    CoreError::from(value)
}

#[async_trait(?Send)]
impl NotificationApi for FetchApi {
    async fn list(&self, params: &ListParams) -> Result<ListResponse> {
        let controller = AbortController::new()?;
        let request_id = self.take_request_id();
        let previous = self
            .list_abort
            .replace(Some((request_id, controller.clone())));
        if let Some((_, previous)) = previous {
            log::debug!("Aborting superseded list request");
            previous.abort();
        }

        let url = self.routes.list(params);
        let result = self.send("GET", &url, None, &controller).await;

        // 自分がまだ最新なら枠を空ける
        {
            let mut current = self.list_abort.borrow_mut();
            if matches!(current.as_ref(), Some((id, _)) if *id == request_id) {
                *current = None;
            }
        }

        let text = result?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn mark_as_read(&self, ids: &[NotificationId]) -> Result<()> {
        let body = serde_json::to_string(&MarkReadRequest { ids })?;
        self.mutate("POST", &self.routes.mark_read(), Some(body)).await
    }

    async fn mark_all_as_read(&self) -> Result<()> {
        self.mutate("POST", &self.routes.mark_all_read(), None).await
    }

    async fn delete_notification(&self, id: &NotificationId) -> Result<()> {
        let url = self.routes.delete_one(id)?;
        self.mutate("DELETE", &url, None).await
    }

    async fn delete_read_notifications(&self) -> Result<()> {
        self.mutate("DELETE", &self.routes.delete_read(), None).await
    }

    fn cancel_all(&self) {
        if let Some((_, controller)) = self.list_abort.borrow_mut().take() {
            controller.abort();
        }
        for (_, controller) in self.mutations.borrow_mut().drain() {
            controller.abort();
        }
    }
}

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use eframe::egui;
use inbox_core::api::fetch::FetchApi;
use inbox_core::api::NotificationApi;
use inbox_core::config::{InboxConfig, InboxLayout, PAGE_SIZE_OPTIONS};
use inbox_core::countdown::RouletteSchedule;
use inbox_core::display::{group_by_day, pretty_extra_data, relative_time, PageSummary};
use inbox_core::state::InboxViewState;
use inbox_core::types::{NotificationId, NotificationRecord, Priority};
use inbox_core::InboxController;

use crate::i18n::I18n;

/// 描画中に集めて、状態の借用を外してから実行する操作
#[derive(Debug, Clone, PartialEq)]
enum Action {
    Refresh,
    SetPriority(Option<Priority>),
    SetUnreadOnly(bool),
    SetPageSize(u32),
    SetPage(u32),
    NextPage,
    PrevPage,
    SetSearch(String),
    Toggle(NotificationId),
    SelectAllVisible,
    ClearSelection,
    DismissError,
    MarkRead(NotificationId),
    MarkSelectedRead,
    MarkAllRead,
    DeleteRead,
    DeleteOne(NotificationId),
}

/// 受信箱ビュー
///
/// コンパクト表示（ダッシュボード埋め込み）とフル表示は同じコントローラーを
/// 使い、テンプレートだけが異なる。
pub struct InboxView {
    controller: Rc<InboxController>,
    search_input: String,
}

impl InboxView {
    /// ビューを作成してマウントする（初回取得は次のフレームで開始）
    pub fn new(
        config: InboxConfig,
        unread: Rc<Cell<u64>>,
        ctx: &egui::Context,
    ) -> inbox_core::Result<Self> {
        let api: Rc<dyn NotificationApi> = Rc::new(FetchApi::new(&config));
        let controller = Rc::new(InboxController::new(config, api)?);

        let repaint = ctx.clone();
        controller.set_unread_callback(move |count| {
            unread.set(count);
            repaint.request_repaint();
        });
        controller.mount(js_sys::Date::now());

        Ok(Self {
            controller,
            search_input: String::new(),
        })
    }

    pub fn configured_layout(&self) -> InboxLayout {
        self.controller.config().layout
    }

    pub fn show(&mut self, ui: &mut egui::Ui, i18n: &I18n, layout: InboxLayout) {
        if self.controller.poll_due(js_sys::Date::now()) {
            self.spawn(ui.ctx(), |c| async move {
                c.load().await;
            });
        }

        let mut actions = Vec::new();
        {
            let state = self.controller.state();
            let now = Local::now();
            match layout {
                InboxLayout::Full => {
                    show_full(ui, &state, &now, i18n, &mut self.search_input, &mut actions);
                }
                InboxLayout::Compact => show_compact(ui, &state, &now, i18n, &mut actions),
            }
        }

        for action in actions {
            self.apply(ui.ctx(), action);
        }

        // 定期更新と相対時刻の表示のため
        ui.ctx().request_repaint_after(Duration::from_secs(1));
    }

    fn spawn<F, Fut>(&self, ctx: &egui::Context, task: F)
    where
        F: FnOnce(Rc<InboxController>) -> Fut,
        Fut: Future<Output = ()> + 'static,
    {
        let future = task(self.controller.clone());
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            future.await;
            ctx.request_repaint();
        });
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action) {
        log::debug!("Inbox action: {:?}", action);
        match action {
            Action::Refresh => self.spawn(ctx, |c| async move {
                c.load().await;
            }),
            Action::SetPriority(priority) => {
                self.spawn(ctx, move |c| async move { c.set_priority_filter(priority).await })
            }
            Action::SetUnreadOnly(unread_only) => {
                self.spawn(ctx, move |c| async move { c.set_unread_only(unread_only).await })
            }
            Action::SetPageSize(page_size) => self.spawn(ctx, move |c| async move {
                if let Err(e) = c.set_page_size(page_size).await {
                    log::warn!("Rejected page size: {}", e);
                }
            }),
            Action::SetPage(page) => {
                self.spawn(ctx, move |c| async move { c.set_page(page).await })
            }
            Action::NextPage => self.spawn(ctx, |c| async move { c.next_page().await }),
            Action::PrevPage => self.spawn(ctx, |c| async move { c.prev_page().await }),
            Action::SetSearch(text) => self.controller.set_search_text(text),
            Action::Toggle(id) => self.controller.toggle_selected(&id),
            Action::SelectAllVisible => self.controller.select_all_visible(),
            Action::ClearSelection => self.controller.clear_selection(),
            Action::DismissError => self.controller.dismiss_error(),
            Action::MarkRead(id) => self.spawn(ctx, move |c| async move {
                c.mark_read(vec![id]).await;
            }),
            Action::MarkSelectedRead => self.spawn(ctx, |c| async move {
                c.mark_selected_read().await;
            }),
            Action::MarkAllRead => self.spawn(ctx, |c| async move {
                c.mark_all_read().await;
            }),
            Action::DeleteRead => self.spawn(ctx, |c| async move {
                c.delete_read().await;
            }),
            Action::DeleteOne(id) => self.spawn(ctx, move |c| async move {
                c.delete_one(id).await;
            }),
        }
    }
}

impl Drop for InboxView {
    fn drop(&mut self) {
        self.controller.unmount();
    }
}

fn priority_color(priority: Priority) -> egui::Color32 {
    match priority {
        Priority::Urgent => egui::Color32::from_rgb(220, 53, 69),
        Priority::High => egui::Color32::from_rgb(253, 126, 20),
        Priority::Normal => egui::Color32::from_rgb(13, 110, 253),
        Priority::Low => egui::Color32::GRAY,
    }
}

/// extra_dataにルーレットの日程が含まれていれば取り出す
fn roulette_schedule(record: &NotificationRecord) -> Option<RouletteSchedule> {
    let extra = record.extra_data.as_ref()?;
    let schedule: RouletteSchedule = serde_json::from_value(extra.clone()).ok()?;
    if schedule == RouletteSchedule::default() {
        return None;
    }
    match schedule.validate() {
        Ok(()) => Some(schedule),
        Err(e) => {
            log::debug!("Notification {}: {}", record.id, e);
            None
        }
    }
}

fn show_full(
    ui: &mut egui::Ui,
    state: &InboxViewState,
    now: &DateTime<Local>,
    i18n: &I18n,
    search: &mut String,
    actions: &mut Vec<Action>,
) {
    let busy = state.is_loading();

    ui.horizontal(|ui| {
        let summary = PageSummary::from_records(state.list());
        ui.label(egui::RichText::new(i18n.page_summary(&summary)).small());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add_enabled(!busy, egui::Button::new(i18n.refresh())).clicked() {
                actions.push(Action::Refresh);
            }
            if busy {
                ui.spinner();
            }
        });
    });

    filter_bar(ui, state, i18n, search, actions);
    ui.separator();

    ui.horizontal_wrapped(|ui| {
        if ui.button(i18n.select_all_visible()).clicked() {
            actions.push(Action::SelectAllVisible);
        }
        if ui
            .add_enabled(state.selected_count() > 0, egui::Button::new(i18n.clear_selection()))
            .clicked()
        {
            actions.push(Action::ClearSelection);
        }
        let can_mark_selected = state.selected_count() > 0 && !busy;
        if ui
            .add_enabled(
                can_mark_selected,
                egui::Button::new(i18n.mark_selected_read(state.selected_count())),
            )
            .clicked()
        {
            actions.push(Action::MarkSelectedRead);
        }
        if ui.add_enabled(!busy, egui::Button::new(i18n.mark_all_read())).clicked() {
            actions.push(Action::MarkAllRead);
        }
        if ui.add_enabled(!busy, egui::Button::new(i18n.delete_read())).clicked() {
            actions.push(Action::DeleteRead);
        }
    });

    error_banner(ui, state, i18n, actions);

    let footer_height = 40.0;
    egui::ScrollArea::vertical()
        .max_height(ui.available_height() - footer_height)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let visible = state.visible();
            if !list_placeholder(ui, state, visible.is_empty(), i18n) {
                for (group, records) in group_by_day(&visible, now) {
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new(i18n.day_group(group)).strong());
                    for record in records {
                        let selected = state.is_selected(&record.id);
                        full_row(ui, record, selected, now, i18n, busy, actions);
                    }
                }
            }
        });

    ui.separator();
    pagination(ui, state, i18n, true, actions);
}

fn show_compact(
    ui: &mut egui::Ui,
    state: &InboxViewState,
    now: &DateTime<Local>,
    i18n: &I18n,
    actions: &mut Vec<Action>,
) {
    let busy = state.is_loading();

    ui.horizontal(|ui| {
        priority_combo(ui, state, i18n, actions);
        if ui.add_enabled(!busy, egui::Button::new(i18n.mark_all_read())).clicked() {
            actions.push(Action::MarkAllRead);
        }
        if busy {
            ui.spinner();
        }
    });

    error_banner(ui, state, i18n, actions);

    let visible = state.visible();
    if !list_placeholder(ui, state, visible.is_empty(), i18n) {
        for record in visible {
            compact_row(ui, record, now, i18n, busy, actions);
        }
    }

    pagination(ui, state, i18n, false, actions);
}

fn priority_combo(
    ui: &mut egui::Ui,
    state: &InboxViewState,
    i18n: &I18n,
    actions: &mut Vec<Action>,
) {
    let current = state.priority_filter();
    let mut priority = current;
    let selected_text = match current {
        Some(p) => i18n.priority_label(p),
        None => i18n.priority_all(),
    };
    egui::ComboBox::from_label(i18n.filter_priority())
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut priority, None, i18n.priority_all());
            for p in Priority::all() {
                ui.selectable_value(&mut priority, Some(*p), i18n.priority_label(*p));
            }
        });
    if priority != current {
        actions.push(Action::SetPriority(priority));
    }
}

fn filter_bar(
    ui: &mut egui::Ui,
    state: &InboxViewState,
    i18n: &I18n,
    search: &mut String,
    actions: &mut Vec<Action>,
) {
    ui.horizontal_wrapped(|ui| {
        priority_combo(ui, state, i18n, actions);

        let mut unread_only = state.unread_only();
        if ui.checkbox(&mut unread_only, i18n.filter_unread_only()).changed() {
            actions.push(Action::SetUnreadOnly(unread_only));
        }

        let mut page_size = state.page_size();
        egui::ComboBox::from_label(i18n.page_size_label())
            .selected_text(page_size.to_string())
            .show_ui(ui, |ui| {
                for option in PAGE_SIZE_OPTIONS {
                    ui.selectable_value(&mut page_size, option, option.to_string());
                }
            });
        if page_size != state.page_size() {
            actions.push(Action::SetPageSize(page_size));
        }

        let response = ui.add(
            egui::TextEdit::singleline(search)
                .hint_text(i18n.search_hint())
                .desired_width(220.0),
        );
        if response.changed() {
            actions.push(Action::SetSearch(search.clone()));
        }
    });
}

fn error_banner(ui: &mut egui::Ui, state: &InboxViewState, i18n: &I18n, actions: &mut Vec<Action>) {
    let Some(failure) = state.error() else {
        return;
    };
    egui::Frame::new()
        .fill(egui::Color32::from_rgb(88, 21, 28))
        .corner_radius(4.0)
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                crate::emoji_label::emoji_label(
                    ui,
                    egui::RichText::new(format!("⚠️ {}", i18n.failure_message(failure)))
                        .color(egui::Color32::from_rgb(255, 200, 200)),
                );
                if ui.button(i18n.error_retry()).clicked() {
                    actions.push(Action::Refresh);
                }
                if ui.button(i18n.error_dismiss()).clicked() {
                    actions.push(Action::DismissError);
                }
            });
        });
}

/// 一覧が空のときの表示。何か表示したら true
fn list_placeholder(
    ui: &mut egui::Ui,
    state: &InboxViewState,
    visible_empty: bool,
    i18n: &I18n,
) -> bool {
    if !visible_empty {
        return false;
    }
    ui.add_space(20.0);
    ui.vertical_centered(|ui| {
        if state.list().is_empty() {
            if state.is_loading() {
                ui.spinner();
                ui.label(i18n.loading());
            } else {
                ui.label(i18n.list_empty());
            }
        } else {
            ui.label(i18n.search_no_match());
        }
    });
    true
}

fn full_row(
    ui: &mut egui::Ui,
    record: &NotificationRecord,
    selected: bool,
    now: &DateTime<Local>,
    i18n: &I18n,
    busy: bool,
    actions: &mut Vec<Action>,
) {
    let kind = record.kind();
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            let mut checked = selected;
            if ui.checkbox(&mut checked, "").changed() {
                actions.push(Action::Toggle(record.id.clone()));
            }
            crate::emoji_label::emoji_label(ui, kind.icon());

            let mut title = egui::RichText::new(&record.title);
            if !record.is_read {
                title = title.strong();
            }
            if record.priority.is_elevated() {
                title = title.color(priority_color(record.priority));
            }
            ui.label(title);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!busy, egui::Button::new(i18n.delete()).small()).clicked() {
                    actions.push(Action::DeleteOne(record.id.clone()));
                }
                if !record.is_read
                    && ui.add_enabled(!busy, egui::Button::new(i18n.mark_read()).small()).clicked()
                {
                    actions.push(Action::MarkRead(record.id.clone()));
                }
                ui.label(
                    egui::RichText::new(i18n.relative_time(relative_time(&record.created_at, now)))
                        .small()
                        .weak(),
                );
            });
        });

        ui.label(&record.message);

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(i18n.priority_label(record.priority))
                    .small()
                    .color(priority_color(record.priority)),
            );
            ui.label(egui::RichText::new(i18n.kind_label(kind)).small().weak());
            if let Some(schedule) = roulette_schedule(record) {
                let phase = schedule.phase(now.with_timezone(&Utc));
                let text = egui::RichText::new(i18n.roulette_phase(&phase)).small();
                crate::emoji_label::emoji_label(ui, text);
            }
        });

        if let Some(text) = record.extra_data.as_ref().and_then(pretty_extra_data) {
            egui::CollapsingHeader::new(i18n.details())
                .id_salt(("extra_data", record.id.to_string()))
                .show(ui, |ui| {
                    ui.monospace(text);
                });
        }
    });
}

fn compact_row(
    ui: &mut egui::Ui,
    record: &NotificationRecord,
    now: &DateTime<Local>,
    i18n: &I18n,
    busy: bool,
    actions: &mut Vec<Action>,
) {
    ui.horizontal(|ui| {
        crate::emoji_label::emoji_label(ui, record.kind().icon());
        let mut title = egui::RichText::new(&record.title).color(priority_color(record.priority));
        if !record.is_read {
            title = title.strong();
        }
        ui.label(title).on_hover_text(&record.message);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if !record.is_read
                && ui.add_enabled(!busy, egui::Button::new("✔").small()).clicked()
            {
                actions.push(Action::MarkRead(record.id.clone()));
            }
            ui.label(
                egui::RichText::new(i18n.relative_time(relative_time(&record.created_at, now)))
                    .small()
                    .weak(),
            );
        });
    });
}

fn pagination(
    ui: &mut egui::Ui,
    state: &InboxViewState,
    i18n: &I18n,
    full: bool,
    actions: &mut Vec<Action>,
) {
    ui.horizontal(|ui| {
        if full && ui.add_enabled(state.has_prev_page(), egui::Button::new("⏮")).clicked() {
            actions.push(Action::SetPage(1));
        }
        if ui
            .add_enabled(state.has_prev_page(), egui::Button::new(i18n.prev_page()))
            .clicked()
        {
            actions.push(Action::PrevPage);
        }
        ui.label(i18n.page_of(state.page(), state.total_pages()));
        if ui
            .add_enabled(state.has_next_page(), egui::Button::new(i18n.next_page()))
            .clicked()
        {
            actions.push(Action::NextPage);
        }
        if full && ui.add_enabled(state.has_next_page(), egui::Button::new("⏭")).clicked() {
            actions.push(Action::SetPage(state.total_pages()));
        }
        if full {
            ui.label(
                egui::RichText::new(i18n.showing(
                    state.visible_count(),
                    state.list().len(),
                    state.total_count(),
                ))
                    .small()
                    .weak(),
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(extra_data: Option<serde_json::Value>) -> NotificationRecord {
        NotificationRecord {
            id: 1.into(),
            title: "Roulette started".to_string(),
            message: String::new(),
            notification_type: "roulette_started".to_string(),
            priority: Priority::Normal,
            is_read: false,
            roulette_id: Some(7.into()),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
            extra_data,
        }
    }

    #[test]
    fn test_roulette_schedule_from_extra_data() {
        let schedule = roulette_schedule(&record(Some(serde_json::json!({
            "participation_end": "2026-10-20T12:00:00Z",
            "scheduled_draw": "2026-10-21T12:00:00Z",
            "prize": "PS5"
        }))))
        .unwrap();
        assert_eq!(
            schedule.participation_end,
            Some(Utc.with_ymd_and_hms(2026, 10, 20, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_roulette_schedule_ignores_unrelated_or_inconsistent_data() {
        assert!(roulette_schedule(&record(None)).is_none());
        assert!(roulette_schedule(&record(Some(serde_json::json!({"prize": "PS5"})))).is_none());
        assert!(roulette_schedule(&record(Some(serde_json::json!({
            "participation_end": "2026-10-20T12:00:00Z",
            "scheduled_draw": "2026-10-19T12:00:00Z"
        }))))
        .is_none());
    }
}

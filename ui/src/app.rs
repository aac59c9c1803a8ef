use std::cell::Cell;
use std::rc::Rc;

use eframe::egui;
use inbox_core::config::{InboxConfig, InboxScope};
use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::i18n::{I18n, Language};
use crate::inbox_view::InboxView;
use crate::preferences::Preferences;
use crate::settings::SettingsView;

/// ページから渡される起動設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub user: InboxConfig,
    /// 管理者権限がある場合のみ
    pub admin: Option<InboxConfig>,
    pub language: Option<Language>,
}

impl AppConfig {
    pub fn validate(&self) -> inbox_core::Result<()> {
        self.user.validate()?;
        if let Some(admin) = &self.admin {
            admin.validate()?;
        }
        Ok(())
    }

    /// JSの設定オブジェクトを読み込む（未指定なら既定値）
    pub fn from_js(value: JsValue) -> inbox_core::Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_wasm_bindgen::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> inbox_core::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// メインアプリケーション
pub struct InboxApp {
    user_config: InboxConfig,
    admin_config: Option<InboxConfig>,
    scope: InboxScope,
    view: Option<InboxView>,
    unread: Rc<Cell<u64>>,
    settings: SettingsView,
    i18n: I18n,
    show_settings: bool,
    error_message: Option<String>,
}

impl InboxApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let preferences = Preferences::load();
        let language = preferences.language.or(config.language).unwrap_or_default();
        log::info!("Inbox language: {}", language.code());

        Self {
            user_config: config.user,
            admin_config: config.admin,
            scope: InboxScope::User,
            view: None,
            unread: Rc::new(Cell::new(0)),
            settings: SettingsView::new(preferences),
            i18n: I18n::new(language),
            show_settings: false,
            error_message: None,
        }
    }

    /// 表示中のスコープのビューがなければ作成してマウント
    fn ensure_view(&mut self, ctx: &egui::Context) {
        if self.view.is_some() || self.error_message.is_some() {
            return;
        }

        let config = match (self.scope, &self.admin_config) {
            (InboxScope::Admin, Some(admin)) => admin.clone(),
            _ => {
                self.scope = InboxScope::User;
                self.user_config.clone()
            }
        };

        match InboxView::new(config, self.unread.clone(), ctx) {
            Ok(view) => self.view = Some(view),
            Err(e) => {
                log::error!("Failed to create inbox view: {}", e);
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// スコープ切り替え（古いビューは破棄時にアンマウントされる）
    fn switch_scope(&mut self, scope: InboxScope) {
        if self.scope == scope {
            return;
        }
        log::info!("Switching inbox scope to {:?}", scope);
        self.scope = scope;
        self.view = None;
        self.unread.set(0);
    }
}

impl eframe::App for InboxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_view(ctx);

        let mut next_scope = self.scope;

        // トップバー
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                crate::emoji_label::emoji_heading(ui, self.i18n.app_title());
                crate::emoji_label::unread_badge(
                    ui,
                    self.unread.get(),
                    self.i18n.unread_badge(self.unread.get()),
                );

                if self.admin_config.is_some() {
                    ui.separator();
                    ui.selectable_value(&mut next_scope, InboxScope::User, self.i18n.tab_user());
                    ui.selectable_value(&mut next_scope, InboxScope::Admin, self.i18n.tab_admin());
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(self.i18n.button_settings()).clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
        });

        // 設定モーダル
        if self.show_settings {
            egui::Window::new(self.i18n.settings_title())
                .collapsible(false)
                .resizable(true)
                .default_width(400.0)
                .show(ctx, |ui| {
                    self.settings.show(ui, &mut self.i18n);

                    ui.add_space(10.0);
                    if ui.button(self.i18n.button_close()).clicked() {
                        self.show_settings = false;
                    }
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = &self.error_message {
                ui.colored_label(egui::Color32::from_rgb(255, 100, 100), message);
            } else if let Some(view) = self.view.as_mut() {
                let layout = self
                    .settings
                    .preferences()
                    .effective_layout(view.configured_layout());
                view.show(ui, &self.i18n, layout);
            }
        });

        self.switch_scope(next_scope);
    }
}

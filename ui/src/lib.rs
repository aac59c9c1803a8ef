mod app;
mod emoji_label;
mod i18n;
mod inbox_view;
mod preferences;
mod settings;

pub use app::{AppConfig, InboxApp};
pub use i18n::Language;

use wasm_bindgen::prelude::*;

/// WASM初期化とパニックフック設定
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // パニック時にコンソールにスタックトレースを表示
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Debug)
        .map_err(|e| JsValue::from_str(&format!("Failed to init logger: {}", e)))?;

    log::info!("Inbox WASM initialized");
    Ok(())
}

/// Webアプリケーションのエントリーポイント
///
/// `config` は `{ user, admin?, language? }` 形式のオブジェクト
#[wasm_bindgen]
pub async fn start_app(canvas_id: String, config: JsValue) -> Result<(), JsValue> {
    use wasm_bindgen::JsCast;

    let config = AppConfig::from_js(config)?;

    let document = web_sys::window()
        .ok_or("No window")?
        .document()
        .ok_or("No document")?;

    let canvas = document
        .get_element_by_id(&canvas_id)
        .ok_or("Canvas not found")?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;

    let web_options = eframe::WebOptions::default();

    eframe::WebRunner::new()
        .start(
            canvas,
            web_options,
            Box::new(move |cc| {
                // カラー絵文字の画像読み込み
                egui_extras::install_image_loaders(&cc.egui_ctx);

                let mut style = (*cc.egui_ctx.style()).clone();
                style.text_styles = [
                    (egui::TextStyle::Heading, egui::FontId::proportional(24.0)),
                    (egui::TextStyle::Body, egui::FontId::proportional(16.0)),
                    (egui::TextStyle::Button, egui::FontId::proportional(16.0)),
                    (egui::TextStyle::Small, egui::FontId::proportional(12.0)),
                    (egui::TextStyle::Monospace, egui::FontId::monospace(14.0)),
                ]
                .into();
                style.spacing.item_spacing = egui::vec2(8.0, 6.0);
                style.spacing.button_padding = egui::vec2(10.0, 4.0);
                cc.egui_ctx.set_style(style);

                Ok(Box::new(InboxApp::new(cc, config)))
            }),
        )
        .await?;

    Ok(())
}

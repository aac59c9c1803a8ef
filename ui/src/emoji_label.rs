use egui_twemoji::EmojiLabel;

/// カラー絵文字をサポートするラベルを表示
pub fn emoji_label(ui: &mut egui::Ui, text: impl Into<egui::RichText>) {
    EmojiLabel::new(text.into()).show(ui);
}

/// カラー絵文字をサポートするヘッダーを表示
pub fn emoji_heading(ui: &mut egui::Ui, text: impl Into<String>) {
    let rich_text = egui::RichText::new(text.into()).heading();
    EmojiLabel::new(rich_text).show(ui);
}

/// 未読バッジ（0件なら表示しない）
pub fn unread_badge(ui: &mut egui::Ui, count: u64, text: String) {
    if count == 0 {
        return;
    }
    egui::Frame::new()
        .fill(egui::Color32::from_rgb(220, 53, 69))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(8, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE).strong());
        });
}

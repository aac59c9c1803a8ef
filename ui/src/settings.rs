use inbox_core::config::InboxLayout;

use crate::i18n::{I18n, Language};
use crate::preferences::Preferences;

/// 設定画面
pub struct SettingsView {
    preferences: Preferences,
    saved: bool,
}

impl SettingsView {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences,
            saved: false,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// 設定画面を表示。変更があれば true
    pub fn show(&mut self, ui: &mut egui::Ui, i18n: &mut I18n) -> bool {
        let mut changed = false;

        ui.group(|ui| {
            crate::emoji_label::emoji_label(ui, i18n.settings_language());
            ui.add_space(10.0);

            let mut language = i18n.language();
            ui.horizontal(|ui| {
                for option in Language::all() {
                    ui.selectable_value(&mut language, *option, option.name());
                }
            });
            if language != i18n.language() {
                log::info!("Language changed to {}", language.code());
                i18n.set_language(language);
                self.preferences.language = Some(language);
                changed = true;
            }
        });

        ui.add_space(20.0);

        ui.group(|ui| {
            crate::emoji_label::emoji_label(ui, i18n.settings_layout());
            ui.add_space(10.0);

            let mut layout = self.preferences.layout;
            let selected_text = match layout {
                Some(l) => i18n.layout_name(l),
                None => i18n.layout_from_config(),
            };
            egui::ComboBox::from_id_salt("settings_layout")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut layout, None, i18n.layout_from_config());
                    for option in [InboxLayout::Full, InboxLayout::Compact] {
                        ui.selectable_value(&mut layout, Some(option), i18n.layout_name(option));
                    }
                });
            if layout != self.preferences.layout {
                self.preferences.layout = layout;
                changed = true;
            }
        });

        if changed {
            self.preferences.save();
            self.saved = true;
        }
        if self.saved {
            ui.add_space(10.0);
            crate::emoji_label::emoji_label(ui, i18n.settings_saved());
        }
        changed
    }
}

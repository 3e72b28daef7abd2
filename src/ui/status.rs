//! Player status side panel

use eframe::egui::{self, Color32, RichText};

use super::money;
use crate::app::DeliverySimApp;
use crate::core::state::{GameState, PlayerAttributes};

/// Status side panel
pub struct StatusPanel;

impl StatusPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        egui::ScrollArea::vertical()
            .id_salt("status_scroll")
            .show(ui, |ui| {
                Self::player(ui, &app.session.state);
                ui.separator();
                Self::finances(ui, &app.session.state);
                ui.separator();
                Self::condition(ui, app);
                ui.separator();
                Self::today(ui, &app.session.state);
                ui.separator();
                Self::actions(ui, app);
            });
    }

    fn player(ui: &mut egui::Ui, state: &GameState) {
        let attrs = &state.attributes;
        ui.heading(&state.player_name);
        ui.label(format!("Level {}", attrs.level));
        ui.add(
            egui::ProgressBar::new(
                attrs.experience as f32 / PlayerAttributes::EXPERIENCE_PER_LEVEL as f32,
            )
            .text(format!(
                "{}/{} XP",
                attrs.experience,
                PlayerAttributes::EXPERIENCE_PER_LEVEL
            )),
        );
        let credit_color = if attrs.credit_score < 80 {
            Color32::from_rgb(230, 90, 80)
        } else {
            ui.visuals().text_color()
        };
        ui.colored_label(credit_color, format!("Credit score: {}", attrs.credit_score));
        if let Some(career) = state.career {
            ui.label(format!("Career: {career}"));
        }
    }

    fn finances(ui: &mut egui::Ui, state: &GameState) {
        ui.strong("Finances");
        egui::Grid::new("finances_grid").num_columns(2).show(ui, |ui| {
            ui.label("Delivery coins");
            ui.label(RichText::new(money(state.finances.delivery_coins)).strong());
            ui.end_row();
            ui.label("Savings");
            ui.label(money(state.finances.savings));
            ui.end_row();
            ui.label("Debt");
            ui.colored_label(Color32::from_rgb(230, 90, 80), money(state.finances.debt));
            ui.end_row();
            ui.label("Insurance");
            ui.label(if state.finances.medical_insurance {
                "Active"
            } else {
                "None"
            });
            ui.end_row();
        });
    }

    fn condition(ui: &mut egui::Ui, app: &DeliverySimApp) {
        let state = &app.session.state;
        ui.strong("Status");
        ui.label(format!("Time: {}", app.session.clock.full_string()));
        ui.label(format!("Weather: {}", state.weather));
        ui.label(format!("Location: {}", state.current_location));

        let stamina = state.attributes.stamina;
        ui.add(
            egui::ProgressBar::new(stamina as f32 / PlayerAttributes::MAX_STAMINA as f32)
                .text(format!("Stamina {stamina}/{}", PlayerAttributes::MAX_STAMINA)),
        );
        let battery = state.battery_percent();
        ui.add(
            egui::ProgressBar::new(battery as f32 / 100.0).text(format!(
                "Battery {battery}% of {}",
                state.equipment.battery_capacity
            )),
        );
        ui.add(
            egui::ProgressBar::new(state.fatigue_level as f32 / 100.0)
                .text(format!("Fatigue {}%", state.fatigue_level)),
        );
    }

    fn today(ui: &mut egui::Ui, state: &GameState) {
        let stats = &state.stats;
        ui.strong("Today");
        egui::Grid::new("today_grid").num_columns(2).show(ui, |ui| {
            ui.label("Earnings");
            ui.label(money(stats.today_earnings));
            ui.end_row();
            ui.label("Tips");
            ui.label(money(stats.today_tips));
            ui.end_row();
            ui.label("Delivered");
            ui.label(format!(
                "{} of {}",
                stats.successful_deliveries, stats.total_orders
            ));
            ui.end_row();
            ui.label("Complaints");
            ui.label(stats.complaints.to_string());
            ui.end_row();
        });
    }

    fn actions(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.strong("Actions");
        if ui
            .button(format!("Rest (¥{:.0}, 1 hour)", GameState::REST_COST))
            .clicked()
        {
            let result = app.session.rest();
            app.handle(result, |_| "Rested for an hour and feel better".to_string());
        }
        ui.horizontal_wrapped(|ui| {
            if ui.button("Messages").clicked() {
                app.dialogs.messages = true;
            }
            if ui.button("Equipment").clicked() {
                app.dialogs.equipment = true;
            }
            if ui.button("Traffic").clicked() {
                app.dialogs.traffic = true;
            }
            if ui.button("Pay Debt").clicked() {
                app.dialogs.pay_debt = true;
            }
        });

        ui.add_space(6.0);
        if let Some(message) = app.session.messages().last() {
            ui.weak(format!("{} {}", message.time.format("%H:%M"), message.text));
        }
    }
}

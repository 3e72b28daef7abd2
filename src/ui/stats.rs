//! Statistics charts and the game report

use eframe::egui;
use strum::IntoEnumIterator;

use super::charts::{self, Slice, PALETTE};
use super::{money, priority_color};
use crate::app::DeliverySimApp;
use crate::core::state::Skill;
use crate::orders::OrderPriority;

/// Statistics panel
pub struct StatsPanel;

impl StatsPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.horizontal(|ui| {
            ui.heading("Statistics");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Export...").clicked() {
                    app.export_statistics();
                }
                if ui.button("Game Report").clicked() {
                    app.generate_report();
                }
            });
        });
        ui.separator();

        let state = &app.session.state;
        let stats = &state.stats;
        egui::ScrollArea::vertical()
            .id_salt("stats_scroll")
            .show(ui, |ui| {
                egui::Grid::new("stats_summary").num_columns(4).show(ui, |ui| {
                    ui.label("Orders");
                    ui.strong(stats.total_orders.to_string());
                    ui.label("Success rate");
                    ui.strong(format!("{:.1}%", stats.success_rate() * 100.0));
                    ui.end_row();
                    ui.label("Earnings");
                    ui.strong(money(stats.total_earnings));
                    ui.label("Tips");
                    ui.strong(money(stats.total_tips));
                    ui.end_row();
                    ui.label("Five stars");
                    ui.strong(stats.five_star_ratings.to_string());
                    ui.label("Complaint rate");
                    ui.strong(format!("{:.1}%", stats.complaint_rate() * 100.0));
                    ui.end_row();
                });

                ui.add_space(8.0);
                ui.strong("Daily earnings");
                let mut trend = stats.daily_earnings.clone();
                trend.push(stats.today_earnings);
                charts::line_chart(ui, &trend, 140.0, PALETTE[0]);

                ui.add_space(8.0);
                ui.columns(2, |columns| {
                    columns[0].strong("Orders by class");
                    let slices: Vec<Slice> = OrderPriority::iter()
                        .map(|priority| Slice {
                            label: format!("Class {priority}"),
                            value: f64::from(match priority {
                                OrderPriority::S => stats.s_orders,
                                OrderPriority::A => stats.a_orders,
                                OrderPriority::D => stats.d_orders,
                            }),
                            color: priority_color(priority),
                        })
                        .collect();
                    charts::pie_chart(&mut columns[0], &slices, 70.0);

                    columns[1].strong("Ratings");
                    let ratings = [
                        ("Five stars".to_string(), f64::from(stats.five_star_ratings)),
                        ("Complaints".to_string(), f64::from(stats.complaints)),
                        ("Failed".to_string(), f64::from(stats.failed_deliveries)),
                    ];
                    let max = ratings.iter().map(|(_, v)| *v).fold(1.0, f64::max);
                    charts::bar_chart(&mut columns[1], &ratings, max, PALETTE[3]);
                });

                ui.add_space(8.0);
                ui.strong("Skills");
                let skills: Vec<(String, f64)> = Skill::iter()
                    .map(|skill| (skill.to_string(), f64::from(state.attributes.skill(skill))))
                    .collect();
                let max = skills.iter().map(|(_, v)| *v).fold(5.0, f64::max);
                charts::bar_chart(ui, &skills, max, PALETTE[4]);
            });
    }
}

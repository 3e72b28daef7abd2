//! Talking to customers at the door

use eframe::egui::{self, RichText};

use super::money;
use crate::app::DeliverySimApp;
use crate::customer::{DialogueMode, PendingInteraction};

/// Customer interaction panel
pub struct CustomerPanel;

impl CustomerPanel {
    const LOG_LENGTH: usize = 20;

    pub fn show(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        ui.horizontal(|ui| {
            ui.heading("Customers");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Patterns").clicked() {
                    app.dialogs.patterns = true;
                }
                if ui.button("History").clicked() {
                    app.dialogs.interaction_history = true;
                }
                let mode = app.session.customers.mode;
                let hint = match mode {
                    DialogueMode::Offline => "Scripted replies",
                    DialogueMode::Online => "Assistant generated replies",
                };
                if ui
                    .button(format!("Mode: {mode}"))
                    .on_hover_text(hint)
                    .clicked()
                {
                    app.toggle_dialogue_mode();
                }
            });
        });
        ui.separator();

        let pending = app.session.customers.pending().cloned();
        match pending {
            Some(pending) => Self::conversation(ui, app, &pending),
            None => {
                ui.weak("No one is waiting. Deliver an order to meet a customer.");
            }
        }

        ui.add_space(12.0);
        ui.strong("Recent conversations");
        egui::ScrollArea::vertical()
            .id_salt("dialogue_log")
            .stick_to_bottom(true)
            .show(ui, |ui| {
                let history = app.session.customers.history(Self::LOG_LENGTH);
                if history.is_empty() {
                    ui.weak("Nothing yet");
                }
                for record in history {
                    ui.label(
                        RichText::new(format!(
                            "{} {} ({})",
                            record.timestamp.format("%H:%M"),
                            record.customer_name,
                            record.customer
                        ))
                        .weak(),
                    );
                    ui.label(format!("You: {}", record.choice));
                    ui.label(format!("Customer: {}", record.response));
                    ui.add_space(4.0);
                }
            });
    }

    fn conversation(ui: &mut egui::Ui, app: &mut DeliverySimApp, pending: &PendingInteraction) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.strong(&pending.customer_name);
                ui.label(format!("{} in {}", pending.customer, pending.district));
            });
            ui.label(format!("Situation: {}", pending.trigger));
            if !pending.context.is_empty() {
                egui::CollapsingHeader::new("Context")
                    .id_salt("dialogue_context")
                    .show(ui, |ui| {
                        ui.label(&pending.context);
                    });
            }
            ui.add_space(6.0);
            ui.label("How do you respond?");

            let mut chosen = None;
            for (index, option) in pending.options.iter().enumerate() {
                let mut hover = option.impact.summary();
                if let Some((skill, level)) = option.requirement {
                    hover.push_str(&format!(", uses {skill} {level}"));
                }
                if ui.button(&option.text).on_hover_text(hover).clicked() {
                    chosen = Some(index);
                }
            }

            if let Some(index) = chosen {
                let result = app.session.choose_reply(index);
                app.handle(result, |reply| {
                    let mut text = format!("Customer: \"{}\"", reply.response);
                    if reply.bonus_tip > 0.0 {
                        text.push_str(&format!(" Extra tip {}", money(reply.bonus_tip)));
                    }
                    if reply.complaint {
                        text.push_str(" They filed a complaint.");
                    }
                    text
                });
            }
        });
    }
}

//! Night school and career change

use eframe::egui;
use strum::IntoEnumIterator;

use super::charts;
use super::money;
use crate::app::DeliverySimApp;
use crate::core::state::{GameState, Skill};
use crate::skills::{Career, CourseKind, CourseProgress, NightSchool};

fn requirement_text(requirements: &[(Skill, u32)]) -> String {
    if requirements.is_empty() {
        return "None".to_string();
    }
    requirements
        .iter()
        .map(|(skill, level)| format!("{skill} {level}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Skills panel
pub struct SkillsPanel;

impl SkillsPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        egui::ScrollArea::vertical()
            .id_salt("skills_scroll")
            .show(ui, |ui| {
                ui.heading("Night School");
                Self::courses(ui, app);
                ui.add_space(6.0);
                Self::course_actions(ui, app);
                ui.separator();
                ui.heading("Career");
                Self::careers(ui, app);
                ui.separator();
                ui.heading("Skill Profile");
                Self::radar(ui, &app.session.state);
            });
    }

    fn status_text(progress: Option<&CourseProgress>, required: u32) -> String {
        match progress {
            Some(p) if p.completed => "Completed".to_string(),
            Some(p) if p.enrolled => format!("Enrolled {}/{} min", p.studied_minutes(), required),
            _ => "Not enrolled".to_string(),
        }
    }

    fn courses(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        egui::Grid::new("course_grid")
            .striped(true)
            .num_columns(6)
            .show(ui, |ui| {
                for title in ["Course", "Hours", "Fee", "Difficulty", "Requires", "Status"] {
                    ui.strong(title);
                }
                ui.end_row();
                for course in NightSchool::courses() {
                    let selected = app.forms.course == course.kind;
                    if ui
                        .selectable_label(selected, course.name)
                        .on_hover_text(course.description)
                        .clicked()
                    {
                        app.forms.course = course.kind;
                    }
                    ui.label(course.hours.to_string());
                    ui.label(money(course.cost));
                    ui.label(course.difficulty.to_string());
                    let met = course.check_requirements(&app.session.state).is_ok();
                    let requires = requirement_text(course.requirements);
                    if met {
                        ui.label(requires);
                    } else {
                        ui.colored_label(super::PROFIT, requires);
                    }
                    ui.label(Self::status_text(
                        app.session.school.progress(course.kind),
                        course.required_minutes(),
                    ));
                    ui.end_row();
                }
            });
    }

    fn course_actions(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        let kind: CourseKind = app.forms.course;
        let course = kind.course();
        ui.strong(course.name);
        ui.label(course.description);
        ui.label(format!("Teaches: {}", requirement_text(course.bonuses)));

        let progress = app.session.school.progress(kind).cloned();
        let enrolled = progress.as_ref().is_some_and(|p| p.enrolled);
        let completed = progress.as_ref().is_some_and(|p| p.completed);

        ui.horizontal(|ui| {
            if !enrolled && !completed && ui.button(format!("Enroll ({})", money(course.cost))).clicked() {
                let result = app.session.enroll(kind);
                app.handle(result, |()| format!("Enrolled in {}", course.name));
            }
            if enrolled {
                ui.add(
                    egui::DragValue::new(&mut app.forms.study_minutes)
                        .range(10..=NightSchool::MAX_SESSION_MINUTES)
                        .speed(5)
                        .suffix(" min"),
                );
                let minutes = app.forms.study_minutes;
                let effectiveness = NightSchool::effectiveness(minutes, &app.session.state);
                if ui
                    .button("Study")
                    .on_hover_text(format!("Effectiveness {:.0}%", effectiveness * 100.0))
                    .clicked()
                {
                    let result = app.session.study(kind, minutes);
                    app.handle(result, |report| {
                        format!(
                            "Studied {} min at {:.0}% effectiveness, +{} XP ({}/{} min)",
                            report.minutes,
                            report.effectiveness * 100.0,
                            report.experience,
                            report.total_minutes,
                            course.required_minutes()
                        )
                    });
                }
                if let Some(progress) = &progress {
                    let chance = NightSchool::pass_probability(progress, &app.session.state);
                    if ui
                        .button("Take Exam")
                        .on_hover_text(format!("Pass chance {:.0}%", chance * 100.0))
                        .clicked()
                    {
                        let result = app.session.take_exam(kind);
                        app.handle(result, |exam| {
                            if exam.passed {
                                format!("Passed the {} exam!", course.name)
                            } else {
                                format!(
                                    "Failed the {} exam ({:.0}% chance), study more",
                                    course.name,
                                    exam.probability * 100.0
                                )
                            }
                        });
                    }
                }
            }
        });
        if completed {
            ui.label("You have graduated from this course");
        }
        ui.weak(format!(
            "{} of {} courses completed",
            app.session.school.completed_count(),
            NightSchool::courses().len()
        ));
    }

    fn careers(ui: &mut egui::Ui, app: &mut DeliverySimApp) {
        if let Some(current) = app.session.state.career {
            ui.label(format!("Working as {current}, paid daily"));
        }

        let career = app.forms.career;
        egui::ComboBox::from_id_salt("career_choice")
            .selected_text(career.to_string())
            .show_ui(ui, |ui| {
                for option in Career::iter() {
                    ui.selectable_value(&mut app.forms.career, option, option.to_string());
                }
            });

        let state = &app.session.state;
        egui::Grid::new("career_grid").num_columns(2).show(ui, |ui| {
            ui.label("Income");
            ui.label(career.income().describe());
            ui.end_row();
            ui.label("Perk");
            ui.label(career.perk());
            ui.end_row();
            ui.label("Difficulty");
            ui.label(career.difficulty().to_string());
            ui.end_row();
            for &(skill, level) in career.requirements() {
                ui.label(skill.to_string());
                let current = state.attributes.skill(skill);
                let text = format!("{current}/{level}");
                if current >= level {
                    ui.colored_label(super::LOSS, text);
                } else {
                    ui.colored_label(super::PROFIT, text);
                }
                ui.end_row();
            }
        });

        let eligibility = career.check_eligibility(state);
        let rate = career.success_rate(state);
        ui.horizontal(|ui| {
            match &eligibility {
                Ok(()) => ui.label(format!("Success chance {:.0}%", rate * 100.0)),
                Err(e) => ui.weak(e.to_string()),
            };
            if ui.button("Apply").clicked() {
                let result = app.session.attempt_career(career);
                app.handle(result, |hired| {
                    if hired {
                        format!("Hired as {career}!")
                    } else {
                        format!("The {career} application was turned down")
                    }
                });
            }
        });
    }

    fn radar(ui: &mut egui::Ui, state: &GameState) {
        let axes: Vec<(String, f64)> = Skill::iter()
            .map(|skill| (skill.to_string(), f64::from(state.attributes.skill(skill))))
            .collect();
        let max = axes.iter().map(|(_, v)| *v).fold(5.0, f64::max);
        charts::radar_chart(ui, &axes, max, 110.0, charts::PALETTE[0]);
    }
}

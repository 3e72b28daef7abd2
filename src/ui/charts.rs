//! Small charts painted directly with the egui painter

use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, StrokeKind, Vec2};

pub const PALETTE: [Color32; 9] = [
    Color32::from_rgb(66, 133, 244),
    Color32::from_rgb(234, 67, 53),
    Color32::from_rgb(251, 188, 5),
    Color32::from_rgb(52, 168, 83),
    Color32::from_rgb(171, 71, 188),
    Color32::from_rgb(0, 172, 193),
    Color32::from_rgb(255, 112, 67),
    Color32::from_rgb(158, 157, 36),
    Color32::from_rgb(120, 144, 156),
];

/// One share of a pie chart
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub color: Color32,
}

/// Largest arc covered by one polygon
const MAX_SEGMENT: f32 = 0.5;

fn frame(ui: &egui::Ui, rect: Rect) {
    ui.painter().rect_stroke(
        rect,
        2.0,
        Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color),
        StrokeKind::Inside,
    );
}

fn empty_note(ui: &egui::Ui, rect: Rect, text: &str) {
    ui.painter().text(
        rect.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(13.0),
        ui.visuals().weak_text_color(),
    );
}

/// Line chart over the full available width
pub fn line_chart(ui: &mut egui::Ui, values: &[f64], height: f32, color: Color32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), height), Sense::hover());
    frame(ui, rect);
    if values.len() < 2 {
        empty_note(ui, rect, "Not enough data yet");
        return;
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = (max - min).max(f64::EPSILON);
    let inner = rect.shrink2(Vec2::new(40.0, 10.0));
    let last = (values.len() - 1) as f32;
    let points: Vec<Pos2> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = inner.left() + inner.width() * i as f32 / last;
            let y = inner.bottom() - inner.height() * ((v - min) / span) as f32;
            egui::pos2(x, y)
        })
        .collect();

    let painter = ui.painter_at(rect);
    let weak = ui.visuals().weak_text_color();
    painter.text(
        egui::pos2(rect.left() + 4.0, inner.top()),
        Align2::LEFT_CENTER,
        format!("{max:.0}"),
        FontId::proportional(11.0),
        weak,
    );
    painter.text(
        egui::pos2(rect.left() + 4.0, inner.bottom()),
        Align2::LEFT_CENTER,
        format!("{min:.0}"),
        FontId::proportional(11.0),
        weak,
    );
    for point in &points {
        painter.circle_filled(*point, 2.5, color);
    }
    painter.add(Shape::line(points, Stroke::new(2.0, color)));
}

/// Pie chart with a legend on the right
pub fn pie_chart(ui: &mut egui::Ui, slices: &[Slice], radius: f32) {
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(radius * 2.0 + 8.0), Sense::hover());
        if total <= 0.0 {
            empty_note(ui, rect, "No data");
            return;
        }

        let center = rect.center();
        let painter = ui.painter_at(rect);
        let mut start = -FRAC_PI_2;
        for slice in slices {
            let sweep = (slice.value.max(0.0) / total) as f32 * TAU;
            let pieces = (sweep / MAX_SEGMENT).ceil().max(1.0) as usize;
            for piece in 0..pieces {
                let from = start + sweep * piece as f32 / pieces as f32;
                let to = start + sweep * (piece + 1) as f32 / pieces as f32;
                let mut points = vec![center];
                for step in 0..=4 {
                    let angle = from + (to - from) * step as f32 / 4.0;
                    points.push(center + radius * Vec2::angled(angle));
                }
                painter.add(Shape::convex_polygon(points, slice.color, Stroke::NONE));
            }
            start += sweep;
        }

        ui.vertical(|ui| {
            for slice in slices {
                ui.horizontal(|ui| {
                    let (swatch, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
                    ui.painter().rect_filled(swatch, 2.0, slice.color);
                    ui.label(format!(
                        "{} {:.1}%",
                        slice.label,
                        slice.value.max(0.0) / total * 100.0
                    ));
                });
            }
        });
    });
}

/// Horizontal bars scaled to `max`
pub fn bar_chart(ui: &mut egui::Ui, bars: &[(String, f64)], max: f64, color: Color32) {
    const ROW: f32 = 22.0;
    const LABEL_WIDTH: f32 = 150.0;
    const VALUE_WIDTH: f32 = 50.0;

    let size = Vec2::new(ui.available_width(), ROW * bars.len().max(1) as f32);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    if bars.is_empty() || max <= 0.0 {
        empty_note(ui, rect, "No data");
        return;
    }

    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let track = ui.visuals().extreme_bg_color;
    let bar_width = (rect.width() - LABEL_WIDTH - VALUE_WIDTH).max(10.0);
    for (i, (label, value)) in bars.iter().enumerate() {
        let top = rect.top() + ROW * i as f32;
        let mid = top + ROW / 2.0;
        painter.text(
            egui::pos2(rect.left(), mid),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(13.0),
            text_color,
        );
        let left = rect.left() + LABEL_WIDTH;
        let full = Rect::from_min_size(egui::pos2(left, top + 4.0), Vec2::new(bar_width, ROW - 8.0));
        painter.rect_filled(full, 3.0, track);
        let fraction = (value / max).clamp(0.0, 1.0) as f32;
        let filled = Rect::from_min_size(full.min, Vec2::new(bar_width * fraction, full.height()));
        painter.rect_filled(filled, 3.0, color);
        painter.text(
            egui::pos2(full.right() + 6.0, mid),
            Align2::LEFT_CENTER,
            format!("{value:.0}"),
            FontId::proportional(13.0),
            text_color,
        );
    }
}

/// Radar chart with one spoke per axis
pub fn radar_chart(ui: &mut egui::Ui, axes: &[(String, f64)], max: f64, radius: f32, color: Color32) {
    let margin = 70.0;
    let (rect, _) = ui.allocate_exact_size(Vec2::splat((radius + margin) * 2.0), Sense::hover());
    if axes.len() < 3 || max <= 0.0 {
        empty_note(ui, rect, "No data");
        return;
    }

    let painter = ui.painter_at(rect);
    let center = rect.center();
    let grid = Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color);
    let spoke = |i: usize| -FRAC_PI_2 + TAU * i as f32 / axes.len() as f32;

    for ring in 1..=4 {
        let r = radius * ring as f32 / 4.0;
        let points: Vec<Pos2> = (0..axes.len())
            .map(|i| center + r * Vec2::angled(spoke(i)))
            .collect();
        painter.add(Shape::closed_line(points, grid));
    }

    let values: Vec<Pos2> = axes
        .iter()
        .enumerate()
        .map(|(i, (_, value))| {
            let r = radius * (value / max).clamp(0.0, 1.0) as f32;
            center + r * Vec2::angled(spoke(i))
        })
        .collect();

    // Fan of triangles, the outline itself may be concave
    let fill = color.gamma_multiply(0.35);
    for i in 0..values.len() {
        let next = values[(i + 1) % values.len()];
        painter.add(Shape::convex_polygon(
            vec![center, values[i], next],
            fill,
            Stroke::NONE,
        ));
    }
    painter.add(Shape::closed_line(values.clone(), Stroke::new(2.0, color)));

    let text_color = ui.visuals().text_color();
    for (i, (label, value)) in axes.iter().enumerate() {
        let direction = Vec2::angled(spoke(i));
        painter.line_segment([center, center + radius * direction], grid);
        let anchor = if direction.x > 0.3 {
            Align2::LEFT_CENTER
        } else if direction.x < -0.3 {
            Align2::RIGHT_CENTER
        } else {
            Align2::CENTER_CENTER
        };
        painter.text(
            center + (radius + 8.0) * direction,
            anchor,
            format!("{label} {value:.0}"),
            FontId::proportional(12.0),
            text_color,
        );
    }
}

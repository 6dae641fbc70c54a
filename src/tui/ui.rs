use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table};

use crate::features::{field_bounds, Field};
use crate::normalize::ScalingConfig;
use crate::output::format_prediction;
use crate::tui::app::{App, FlashKind, InputMode};

const TITLE: &str = "Diabetes Progression Predictor";

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 16 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Form(fill) + Result(3) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_form(frame, chunks[1], app);
    render_result(frame, chunks[2], app);
    render_status_bar(frame, chunks[3], app);

    match app.input_mode {
        InputMode::Editing => render_edit_popup(frame, app),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Breakdown => render_breakdown_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(TITLE, Style::default().fg(theme.title_color).bold())];

    let scale_text = scale_label(&app.scaling);
    let padding_len = (area.width as usize).saturating_sub(TITLE.len() + scale_text.len());
    spans.push(Span::raw(" ".repeat(padding_len)));
    // Approximate constants stay visible for the whole form session
    let scale_color = if app.scaling.approximate {
        theme.clamped_color
    } else {
        theme.muted
    };
    spans.push(Span::styled(scale_text, Style::default().fg(scale_color)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn scale_label(scaling: &ScalingConfig) -> String {
    if scaling.approximate {
        format!("inputs: {} (approximate scaling)", scaling.input.label())
    } else {
        format!("inputs: {}", scaling.input.label())
    }
}

fn render_form(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = app.theme.clone();
    let kind = app.scaling.input;

    let rows: Vec<Row> = Field::ALL
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let bounds = field_bounds(*field, kind);
            let value_cell = match app.inputs.get(*field) {
                Some(value) => Cell::from(value.to_string()),
                None => Cell::from("missing").style(Style::default().fg(theme.missing_color)),
            };
            let range = if *field == Field::Sex && bounds.unit == "Male/Female" {
                "Male | Female".to_string()
            } else {
                format!("{} .. {}", bounds.min, bounds.max)
            };

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(field.name().to_uppercase()).style(Style::default().fg(theme.field_color)),
                value_cell,
                Cell::from(bounds.unit).style(Style::default().fg(theme.unit_color)),
                Cell::from(range).style(Style::default().fg(theme.muted)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(6),  // Field
        Constraint::Length(12), // Value
        Constraint::Length(12), // Unit
        Constraint::Fill(1),    // Range
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Field", "Value", "Unit", "Range"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::bordered().title(" Prediction ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = match app.session.last() {
        Some(record) => {
            let mut spans = vec![
                Span::raw("Predicted diabetes progression: "),
                Span::styled(
                    format_prediction(record.prediction),
                    Style::default().fg(theme.prediction_color).bold(),
                ),
            ];
            if record.was_clamped() {
                spans.push(Span::styled(
                    format!("  (model returned {}, floored at 0)", format_prediction(record.raw_prediction)),
                    Style::default().fg(theme.clamped_color),
                ));
            }
            spans.push(Span::styled(
                format!("  at {}", record.predicted_at.with_timezone(&chrono::Local).format("%H:%M:%S")),
                Style::default().fg(theme.muted),
            ));
            Line::from(spans)
        }
        None => Line::from(Span::styled(
            "No prediction yet. Press p to predict.",
            Style::default().fg(theme.muted),
        )),
    };

    frame.render_widget(Paragraph::new(line), inner);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, kind, _)) = app.flash_message {
        let msg_color = match kind {
            FlashKind::Success => theme.flash_success,
            FlashKind::Error => theme.flash_error,
            FlashKind::Info => theme.flash_info,
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints = [
            ("j/k", ":nav "),
            ("Enter", ":edit "),
            ("+/-", ":step "),
            ("p", ":predict "),
            ("s", ":save "),
            ("b", ":breakdown "),
            ("?", ":help "),
            ("q", ":quit"),
        ];

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn popup_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::bordered()
        .title(Span::styled(title, app.theme.popup_title))
        .border_style(Style::default().fg(app.theme.popup_border))
        .style(Style::default().bg(app.theme.popup_bg))
}

fn render_edit_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(44, 4, frame.area());
    frame.render_widget(Clear, popup_area);

    let field = app.selected_field();
    let title = format!(" Edit {} ", field.name().to_uppercase());
    let block = popup_block(app, &title);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    frame.render_widget(Paragraph::new(format!("{}|", app.edit_buffer)), chunks[0]);
    frame.render_widget(
        Paragraph::new("Enter: confirm | Esc: cancel | empty = clear")
            .style(Style::default().fg(app.theme.muted)),
        chunks[1],
    );
}

fn render_help_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(50, 15, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(app, " Keyboard Shortcuts ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(app.theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Next field"),
        ("k / Up        ", "Previous field"),
        ("Enter / e     ", "Edit value (toggles sex label)"),
        ("+ / Right     ", "Step value up"),
        ("- / Left      ", "Step value down"),
        ("R             ", "Reset form to defaults"),
        ("p             ", "Predict"),
        ("s             ", "Save last prediction to log"),
        ("b             ", "Show normalization breakdown"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];

    let mut lines: Vec<Line> = entries
        .iter()
        .map(|(k, desc)| Line::from(vec![Span::styled(*k, key_style), Span::raw(*desc)]))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let Some(result) = app.session.last_breakdown() else {
        return;
    };

    let popup_area = centered_rect_fixed(60, (result.steps.len() + 4) as u16, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(app, " Normalization ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = result
        .steps
        .iter()
        .map(|step| {
            Line::from(vec![
                Span::styled(
                    format!("{:<4}", step.field.name()),
                    Style::default().fg(app.theme.field_color),
                ),
                Span::raw(format!("{:>10}  ", step.raw)),
                Span::styled(
                    format!("{:<22}", step.transform),
                    Style::default().fg(app.theme.muted),
                ),
                Span::raw(format!("{:>10.4}", step.scaled)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc / b: close",
        Style::default().fg(app.theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect_fixed(50, 10, area);
        assert_eq!(rect, Rect::new(25, 15, 50, 10));
    }

    #[test]
    fn test_scale_label_marks_approximate() {
        assert_eq!(scale_label(&ScalingConfig::default()), "inputs: standardized");
        assert_eq!(
            scale_label(&ScalingConfig::clinical_starter()),
            "inputs: clinical (approximate scaling)"
        );
    }

    #[test]
    fn test_centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 30, 5);
        let rect = centered_rect_fixed(50, 10, area);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 5);
    }
}

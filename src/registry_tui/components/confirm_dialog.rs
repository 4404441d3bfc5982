//! Yes/no confirmation popup

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::registry_tui::ui::{centered_rect, Styles};

pub fn render_confirm_dialog(f: &mut Frame, area: Rect, title: &str, question: &str) {
    let popup_area = centered_rect(50, 25, area);
    f.render_widget(Clear, popup_area);

    let text = vec![
        Line::from(""),
        Line::from(question.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y]", Styles::success()),
            Span::raw(" Yes    "),
            Span::styled("[n]", Styles::error()),
            Span::raw(" No"),
        ]),
    ];

    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Styles::warning()),
        );

    f.render_widget(dialog, popup_area);
}

//! Patient table with sortable column headers

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::models::Patient;
use crate::registry::display_date;
use crate::registry::view::{SortColumn, ViewState};
use crate::registry_tui::ui::{truncate_to_width, Styles};

const COLUMN_WIDTHS: [u16; 5] = [28, 14, 8, 13, 15];

/// Header text, e.g. "[1] Name ▲"
pub fn header_label(index: usize, column: SortColumn, view: &ViewState) -> String {
    let indicator = view.sort_indicator(column);
    if indicator.is_empty() {
        format!("[{}] {}", index + 1, column.as_str())
    } else {
        format!("[{}] {} {}", index + 1, column.as_str(), indicator)
    }
}

/// Cell texts of one row
pub fn row_cells(patient: &Patient) -> [String; 5] {
    [
        patient.full_name(),
        display_date(&patient.date_of_birth),
        patient.gender.to_string(),
        patient.payment_type.to_string(),
        format!("${}", patient.payment_amount),
    ]
}

pub fn render_patient_table(
    f: &mut Frame,
    area: Rect,
    patients: &[&Patient],
    view: &ViewState,
    state: &mut TableState,
) {
    let header = Row::new(
        SortColumn::ALL
            .iter()
            .enumerate()
            .map(|(i, column)| Cell::from(header_label(i, *column, view))),
    )
    .style(Styles::title())
    .bottom_margin(1);

    let rows = patients.iter().map(|patient| {
        let cells = row_cells(patient);
        Row::new(
            cells
                .into_iter()
                .zip(COLUMN_WIDTHS)
                .map(|(text, width)| Cell::from(truncate_to_width(&text, width as usize))),
        )
    });

    let widths = COLUMN_WIDTHS.map(Constraint::Length);
    let title = format!("Patients ({})", patients.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        )
        .highlight_style(Styles::selected())
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::patient;
    use crate::models::{Gender, PaymentType};

    #[test]
    fn test_header_shows_arrow_on_sorted_column_only() {
        let mut view = ViewState::default();
        view.toggle_sort(SortColumn::FirstName);
        view.toggle_sort(SortColumn::FirstName);

        assert_eq!(header_label(0, SortColumn::FirstName, &view), "[1] Name ▼");
        assert_eq!(header_label(4, SortColumn::PaymentAmount, &view), "[5] Payment Amount");
    }

    #[test]
    fn test_row_cells_show_raw_values() {
        let mut record = patient("1", "Ann", "Lee", Gender::Female, PaymentType::Cash);
        record.payment_amount = 12.5;

        let cells = row_cells(&record);
        assert_eq!(cells[0], "Ann Lee");
        assert_eq!(cells[1], "1990-01-01");
        assert_eq!(cells[4], "$12.5");
    }
}

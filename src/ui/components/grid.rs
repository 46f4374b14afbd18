use std::ops::Range;

use tui::{
    backend::Backend,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::models::{Bill, Customer};

/// Rows shown per page.
pub const PAGE_SIZE: usize = 5;

pub struct Column {
    pub header: &'static str,
    /// Share of the table width, in percent.
    pub width: u16,
}

/// How a record maps onto grid columns.
pub trait GridRow {
    fn columns() -> &'static [Column];
    fn cells(&self) -> Vec<String>;
}

impl GridRow for Customer {
    fn columns() -> &'static [Column] {
        &[
            Column { header: "Name", width: 22 },
            Column { header: "Email", width: 22 },
            Column { header: "Phone", width: 22 },
            Column { header: "Address", width: 34 },
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.email.clone(),
            self.phone.clone().unwrap_or_default(),
            self.address.clone().unwrap_or_default(),
        ]
    }
}

impl GridRow for Bill {
    fn columns() -> &'static [Column] {
        &[
            Column { header: "Bill Number", width: 22 },
            Column { header: "Customer", width: 18 },
            Column { header: "Bill Date", width: 14 },
            Column { header: "Due Date", width: 14 },
            Column { header: "Total Amount", width: 16 },
            Column { header: "Status", width: 16 },
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.bill_number.clone(),
            self.customer_name.clone(),
            self.bill_date.format("%Y-%m-%d").to_string(),
            self.due_date.format("%Y-%m-%d").to_string(),
            self.total_amount.to_string(),
            self.status.to_string(),
        ]
    }
}

/// Page and row selection for a grid of `len` rows.
#[derive(Default)]
pub struct GridState {
    page: usize,
    table_state: TableState,
}

impl GridState {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(len: usize) -> usize {
        len.div_ceil(PAGE_SIZE).max(1)
    }

    pub fn visible_range(&self, len: usize) -> Range<usize> {
        let start = (self.page * PAGE_SIZE).min(len);
        start..(start + PAGE_SIZE).min(len)
    }

    /// Keep page and selection in bounds after the rows changed.
    pub fn clamp(&mut self, len: usize) {
        self.page = self.page.min(Self::page_count(len) - 1);
        let visible = self.visible_range(len).len();
        let selected = match self.table_state.selected() {
            _ if visible == 0 => None,
            Some(i) => Some(i.min(visible - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    pub fn next_row(&mut self, len: usize) {
        let visible = self.visible_range(len).len();
        if visible == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < visible => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self, len: usize) {
        let visible = self.visible_range(len).len();
        if visible == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => visible - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn next_page(&mut self, len: usize) {
        if self.page + 1 < Self::page_count(len) {
            self.page += 1;
            self.table_state.select(Some(0));
        }
    }

    pub fn previous_page(&mut self, len: usize) {
        if self.page > 0 {
            self.page -= 1;
            self.table_state.select(Some(0));
        }
        self.clamp(len);
    }
}

pub fn render_grid<B: Backend, R: GridRow>(
    frame: &mut Frame<B>,
    area: Rect,
    title: &str,
    rows: &[R],
    state: &mut GridState,
) {
    let columns = R::columns();
    state.clamp(rows.len());

    let header = Row::new(columns.iter().map(|c| Cell::from(c.header)))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    let body = rows[state.visible_range(rows.len())]
        .iter()
        .map(|row| Row::new(row.cells().into_iter().map(Cell::from)));
    let widths: Vec<Constraint> = columns
        .iter()
        .map(|c| Constraint::Percentage(c.width))
        .collect();

    let title = format!(
        "{} (page {}/{})",
        title,
        state.page + 1,
        GridState::page_count(rows.len())
    );
    let table = Table::new(body)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&widths);

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{bill_json, customer_json};

    impl GridState {
        /// Index into the full row list of the highlighted row.
        fn selected_index(&self, len: usize) -> Option<usize> {
            let range = self.visible_range(len);
            self.table_state
                .selected()
                .map(|i| range.start + i)
                .filter(|i| range.contains(i))
        }
    }

    #[test]
    fn test_pages_hold_five_rows() {
        let mut state = GridState::default();
        assert_eq!(GridState::page_count(0), 1);
        assert_eq!(GridState::page_count(5), 1);
        assert_eq!(GridState::page_count(12), 3);

        assert_eq!(state.visible_range(12), 0..5);
        state.next_page(12);
        state.next_page(12);
        assert_eq!(state.visible_range(12), 10..12);
        state.next_page(12);
        assert_eq!(state.page(), 2);
    }

    #[test]
    fn test_row_selection_wraps_within_page() {
        let mut state = GridState::default();
        state.clamp(7);
        assert_eq!(state.selected_index(7), Some(0));
        state.previous_row(7);
        assert_eq!(state.selected_index(7), Some(4));
        state.next_page(7);
        state.next_row(7);
        assert_eq!(state.selected_index(7), Some(6));
        state.next_row(7);
        assert_eq!(state.selected_index(7), Some(5));
    }

    #[test]
    fn test_clamp_after_rows_shrink() {
        let mut state = GridState::default();
        state.next_page(12);
        state.next_page(12);
        state.clamp(3);
        assert_eq!(state.page(), 0);
        assert_eq!(state.selected_index(0), None);
        state.clamp(0);
        assert_eq!(state.selected_index(0), None);
    }

    #[test]
    fn test_bill_columns_format_amount_and_status() {
        let bill: Bill = serde_json::from_value(bill_json(1, 2, "20.5")).unwrap();
        let cells = bill.cells();
        assert_eq!(cells.len(), Bill::columns().len());
        assert_eq!(cells[1], "Customer 2");
        assert_eq!(cells[4], "$20.50");
        assert_eq!(cells[5], "PENDING");
    }

    #[test]
    fn test_customer_columns_match_headers() {
        let customer: Customer = serde_json::from_value(customer_json(1, "Ada")).unwrap();
        let headers: Vec<&str> = Customer::columns().iter().map(|c| c.header).collect();
        assert_eq!(headers, vec!["Name", "Email", "Phone", "Address"]);
        assert_eq!(customer.cells()[1], "ada@example.com");
    }
}

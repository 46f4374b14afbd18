use chrono::Local;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{format_currency, BillDraft, BillItemDraft, Customer, CustomerId};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::{centered_rect, render_message};

// Represents a field in the bill form
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum BillField {
    Customer,
    BillDate,
    DueDate,
    Items,
}

// Represents the part of a line item being typed
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ItemField {
    Description,
    Quantity,
    UnitPrice,
}

pub enum BillWizardAction {
    Cancel,
    Save,
}

/// The "Create New Bill" modal.
pub struct BillWizardState {
    pub draft: BillDraft,
    customers: Vec<(CustomerId, String)>,
    customer_cursor: usize,
    bill_date: DateInputState,
    due_date: DateInputState,
    current_field: BillField,
    editing: bool,
    items_list_state: ListState,
    editing_item: Option<(usize, ItemField, String)>, // (index, field, current text)
    /// Text and whether it is only a warning.
    pub message: Option<(String, bool)>,
}

impl BillWizardState {
    pub fn new(customers: &[Customer]) -> Self {
        let today = Local::now().date_naive();
        let mut items_list_state = ListState::default();
        items_list_state.select(Some(0));

        let mut state = Self {
            draft: BillDraft::default(),
            customers: Vec::new(),
            customer_cursor: 0,
            bill_date: DateInputState::new(today),
            due_date: DateInputState::new(today + chrono::Duration::days(30)),
            current_field: BillField::Customer,
            editing: false,
            items_list_state,
            editing_item: None,
            message: None,
        };
        state.set_customers(customers);
        state
    }

    /// Refresh the picker options, keeping the chosen customer if it still
    /// exists.
    pub fn set_customers(&mut self, customers: &[Customer]) {
        self.customers = customers.iter().map(|c| (c.id, c.name.clone())).collect();
        if let Some(chosen) = self.draft.customer {
            match self.customers.iter().position(|(id, _)| *id == chosen) {
                Some(index) => self.customer_cursor = index,
                None => self.draft.customer = None,
            }
        }
        self.customer_cursor = self.customer_cursor.min(self.customers.len().saturating_sub(1));
    }

    fn customer_name(&self, id: CustomerId) -> Option<&str> {
        self.customers
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, name)| name.as_str())
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
        match self.current_field {
            BillField::Customer => {}
            BillField::BillDate => self.bill_date.start_editing(),
            BillField::DueDate => self.due_date.start_editing(),
            BillField::Items => {
                if self.items_list_state.selected().is_none() && !self.draft.items.is_empty() {
                    self.items_list_state.select(Some(0));
                }
            }
        }
    }

    /// Leave the field; dates and the customer choice are committed.
    pub fn finish_editing(&mut self) {
        match self.current_field {
            BillField::Customer => {
                self.draft.customer = self.customers.get(self.customer_cursor).map(|(id, _)| *id);
            }
            BillField::BillDate => {
                self.bill_date.confirm();
                self.draft.bill_date = self.bill_date.value;
            }
            BillField::DueDate => {
                self.due_date.confirm();
                self.draft.due_date = self.due_date.value;
            }
            BillField::Items => self.editing_item = None,
        }
        self.editing = false;
    }

    pub fn cancel_editing(&mut self) {
        self.bill_date.cancel();
        self.due_date.cancel();
        self.editing_item = None;
        self.editing = false;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            BillField::Customer => BillField::BillDate,
            BillField::BillDate => BillField::DueDate,
            BillField::DueDate => BillField::Items,
            BillField::Items => BillField::Customer,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            BillField::Customer => BillField::Items,
            BillField::BillDate => BillField::Customer,
            BillField::DueDate => BillField::BillDate,
            BillField::Items => BillField::DueDate,
        };
    }

    fn cycle_customer(&mut self, forward: bool) {
        let len = self.customers.len();
        if len == 0 {
            return;
        }
        self.customer_cursor = if forward {
            (self.customer_cursor + 1) % len
        } else {
            (self.customer_cursor + len - 1) % len
        };
    }

    pub fn add_item(&mut self) {
        self.draft.items.push(BillItemDraft::default());
        let index = self.draft.items.len() - 1;
        self.items_list_state.select(Some(index));
        self.editing_item = Some((index, ItemField::Description, String::new()));
    }

    pub fn edit_item(&mut self) {
        if let Some(index) = self.items_list_state.selected() {
            if let Some(item) = self.draft.items.get(index) {
                self.editing_item = Some((index, ItemField::Description, item.description.clone()));
            }
        }
    }

    pub fn delete_item(&mut self) {
        let Some(selected) = self.items_list_state.selected() else {
            return;
        };
        if selected >= self.draft.items.len() {
            return;
        }
        self.draft.items.remove(selected);
        let selection = if self.draft.items.is_empty() {
            None
        } else {
            Some(selected.min(self.draft.items.len() - 1))
        };
        self.items_list_state.select(selection);
        self.editing_item = None;
    }

    fn move_item_selection(&mut self, forward: bool) {
        let len = self.draft.items.len();
        if len == 0 {
            return;
        }
        let i = match self.items_list_state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.items_list_state.select(Some(i));
    }

    /// Store the text typed for the current item part and move on.
    pub fn commit_item_field(&mut self) {
        let Some((index, field, text)) = self.editing_item.take() else {
            return;
        };
        let Some(item) = self.draft.items.get_mut(index) else {
            return;
        };

        match field {
            ItemField::Description => {
                item.description = text;
                self.editing_item = Some((index, ItemField::Quantity, item.quantity.to_string()));
            }
            ItemField::Quantity => match text.trim().parse::<f64>() {
                Ok(quantity) => {
                    item.quantity = quantity;
                    self.editing_item = Some((index, ItemField::UnitPrice, item.unit_price.to_string()));
                }
                Err(_) => {
                    self.message = Some(("Invalid quantity. Please enter a number.".to_string(), false));
                    self.editing_item = Some((index, field, text));
                }
            },
            ItemField::UnitPrice => match text.trim().parse::<f64>() {
                Ok(unit_price) => item.unit_price = unit_price,
                Err(_) => {
                    self.message = Some(("Invalid unit price. Please enter a number.".to_string(), false));
                    self.editing_item = Some((index, field, text));
                }
            },
        }
    }

    pub fn type_key(&mut self, key: KeyCode) {
        match self.current_field {
            BillField::Customer => match key {
                KeyCode::Right | KeyCode::Down => self.cycle_customer(true),
                KeyCode::Left | KeyCode::Up => self.cycle_customer(false),
                _ => {}
            },
            BillField::BillDate => self.bill_date.handle_input(key),
            BillField::DueDate => self.due_date.handle_input(key),
            BillField::Items => {
                if let Some((_, field, text)) = &mut self.editing_item {
                    match key {
                        KeyCode::Char(c) if *field == ItemField::Description => text.push(c),
                        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => text.push(c),
                        KeyCode::Backspace => {
                            text.pop();
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

pub fn render_bill_wizard<B: Backend>(frame: &mut Frame<B>, state: &mut BillWizardState) {
    let area = centered_rect(80, 85, frame.size());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Customer
                Constraint::Length(3), // Dates
                Constraint::Min(6),    // Items
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(area);

    let highlight = |field: BillField| {
        if state.current_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let customer_value = if state.current_field == BillField::Customer && state.editing {
        match state.customers.get(state.customer_cursor) {
            Some((_, name)) => format!("< {} >", name),
            None => "No customers loaded".to_string(),
        }
    } else {
        state
            .draft
            .customer
            .and_then(|id| state.customer_name(id))
            .unwrap_or("(none selected)")
            .to_string()
    };
    let customer = Paragraph::new(Spans::from(vec![
        Span::styled("Customer *: ", highlight(BillField::Customer)),
        Span::raw(customer_value),
    ]))
    .block(Block::default().title("Create New Bill").borders(Borders::ALL));
    frame.render_widget(customer, chunks[0]);

    let date_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[1]);
    let bill_date = Paragraph::new(Spans::from(vec![
        Span::styled("Bill Date *: ", highlight(BillField::BillDate)),
        Span::raw(state.bill_date.display()),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(bill_date, date_chunks[0]);
    let due_date = Paragraph::new(Spans::from(vec![
        Span::styled("Due Date *: ", highlight(BillField::DueDate)),
        Span::raw(state.due_date.display()),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(due_date, date_chunks[1]);

    render_items(frame, state, chunks[2]);

    let help_text = match (state.editing, state.current_field) {
        (false, _) => "Enter - Edit field | Up/Down - Navigate | S - Create bill | Esc - Cancel",
        (true, BillField::Customer) => "Left/Right - Choose customer | Enter - Select | Esc - Back",
        (true, BillField::BillDate | BillField::DueDate) => {
            "Type digits | Left/Right - Switch date part | Enter - Set date | Esc - Back"
        }
        (true, BillField::Items) if state.editing_item.is_some() => {
            "Enter/Tab - Next part | Esc - Stop editing item"
        }
        (true, BillField::Items) => "A - Add item | E - Edit | D - Delete | Enter - Done | Esc - Back",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);

    if let Some((message, warning)) = &state.message {
        render_message(frame, centered_rect(70, 20, area), message, *warning);
    }
}

fn render_items<B: Backend>(frame: &mut Frame<B>, state: &mut BillWizardState, area: Rect) {
    let title = format!(
        "Bill Items (preview total {})",
        format_currency(state.draft.preview_total())
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(if state.current_field == BillField::Items {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });

    let items: Vec<ListItem> = state
        .draft
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let line = match &state.editing_item {
                Some((editing, field, text)) if *editing == index => {
                    let part = |this: ItemField, committed: String| {
                        if this == *field {
                            Span::styled(format!("{}|", text), Style::default().add_modifier(Modifier::BOLD))
                        } else {
                            Span::raw(committed)
                        }
                    };
                    Spans::from(vec![
                        Span::raw("Description: "),
                        part(ItemField::Description, item.description.clone()),
                        Span::raw("  Qty: "),
                        part(ItemField::Quantity, item.quantity.to_string()),
                        Span::raw("  Unit Price: "),
                        part(ItemField::UnitPrice, item.unit_price.to_string()),
                    ])
                }
                _ => {
                    let description = if item.description.is_empty() {
                        "(no description)"
                    } else {
                        item.description.as_str()
                    };
                    Spans::from(format!(
                        "{} x {} @ {} = {}",
                        description,
                        item.quantity,
                        format_currency(item.unit_price),
                        format_currency(item.line_total())
                    ))
                }
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    if state.current_field == BillField::Items && state.editing {
        frame.render_stateful_widget(list, area, &mut state.items_list_state);
    } else {
        frame.render_widget(list, area);
    }
}

pub fn handle_key(state: &mut BillWizardState, key: KeyCode) -> Option<BillWizardAction> {
    // Any key dismisses the message box
    if state.message.take().is_some() {
        return None;
    }

    match key {
        KeyCode::Esc => {
            if state.editing_item.is_some() {
                state.editing_item = None;
            } else if state.editing {
                state.cancel_editing();
            } else {
                return Some(BillWizardAction::Cancel);
            }
        }
        KeyCode::Enter | KeyCode::Tab if state.editing_item.is_some() => state.commit_item_field(),
        KeyCode::Enter => {
            if state.editing {
                state.finish_editing();
            } else {
                state.start_editing();
            }
        }
        KeyCode::Char('s') if !state.editing => {
            let missing = state.draft.missing_fields();
            if missing.is_empty() {
                return Some(BillWizardAction::Save);
            }
            state.message = Some((format!("Required: {}", missing.join(", ")), false));
        }
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        _ if state.editing && state.current_field == BillField::Items && state.editing_item.is_none() => {
            match key {
                KeyCode::Char('a') => state.add_item(),
                KeyCode::Char('e') => state.edit_item(),
                KeyCode::Char('d') => state.delete_item(),
                KeyCode::Down => state.move_item_selection(true),
                KeyCode::Up => state.move_item_selection(false),
                _ => {}
            }
        }
        _ if state.editing => state.type_key(key),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::customer_json;
    use chrono::NaiveDate;

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn customers() -> Vec<Customer> {
        vec![
            serde_json::from_value(customer_json(1, "Ada")).unwrap(),
            serde_json::from_value(customer_json(2, "Bo")).unwrap(),
        ]
    }

    fn press(state: &mut BillWizardState, keys: &[KeyCode]) {
        for key in keys {
            handle_key(state, *key);
        }
    }

    fn type_text(state: &mut BillWizardState, text: &str) {
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
    }

    fn fill_dates(state: &mut BillWizardState) {
        state.bill_date = DateInputState::new(fixed_day());
        state.due_date = DateInputState::new(fixed_day());
        // Bill date
        press(state, &[KeyCode::Down, KeyCode::Enter, KeyCode::Enter]);
        // Due date
        press(state, &[KeyCode::Down, KeyCode::Enter]);
        type_text(state, "20260630");
        press(state, &[KeyCode::Enter]);
    }

    #[test]
    fn test_customer_picker_cycles_and_commits() {
        let mut state = BillWizardState::new(&customers());
        press(&mut state, &[KeyCode::Enter, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(state.draft.customer, Some(2));

        press(&mut state, &[KeyCode::Enter, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(state.draft.customer, Some(1));
    }

    #[test]
    fn test_dates_are_set_only_when_confirmed() {
        let mut state = BillWizardState::new(&customers());
        assert_eq!(state.draft.bill_date, None);
        fill_dates(&mut state);
        assert_eq!(state.draft.bill_date, Some(fixed_day()));
        assert_eq!(state.draft.due_date, NaiveDate::from_ymd_opt(2026, 6, 30));
    }

    #[test]
    fn test_items_are_typed_part_by_part() {
        let mut state = BillWizardState::new(&customers());
        state.current_field = BillField::Items;
        press(&mut state, &[KeyCode::Enter, KeyCode::Char('e')]);
        type_text(&mut state, "Design");
        press(&mut state, &[KeyCode::Enter, KeyCode::Backspace]);
        type_text(&mut state, "3");
        press(&mut state, &[KeyCode::Tab, KeyCode::Backspace]);
        type_text(&mut state, "12.5");
        press(&mut state, &[KeyCode::Enter]);

        let item = &state.draft.items[0];
        assert_eq!(item.description, "Design");
        assert_eq!(item.quantity, 3.0);
        assert_eq!(item.unit_price, 12.5);
        assert_eq!(state.draft.preview_total(), 37.5);

        press(&mut state, &[KeyCode::Char('a')]);
        assert_eq!(state.draft.items.len(), 2);
        press(&mut state, &[KeyCode::Esc, KeyCode::Char('d')]);
        assert_eq!(state.draft.items.len(), 1);
    }

    #[test]
    fn test_save_blocked_until_required_fields_present() {
        let mut state = BillWizardState::new(&customers());
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        let (message, warning) = state.message.clone().unwrap();
        assert!(message.contains("customer"));
        assert!(!warning);

        // Dismiss the message
        handle_key(&mut state, KeyCode::Char('x'));
        press(&mut state, &[KeyCode::Enter, KeyCode::Enter]);
        fill_dates(&mut state);
        state.draft.items[0].description = "Audit".to_string();

        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('s')),
            Some(BillWizardAction::Save)
        ));
    }

    #[test]
    fn test_reloaded_customers_drop_missing_choice() {
        let mut state = BillWizardState::new(&customers());
        state.draft.customer = Some(2);
        state.set_customers(&customers()[..1]);
        assert_eq!(state.draft.customer, None);
    }
}

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::models::CustomerDraft;
use crate::ui::components::{centered_rect, render_message};

pub enum CustomerWizardAction {
    Cancel,
    Save,
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum CustomerField {
    Name,
    Email,
    Phone,
    Address,
}

impl CustomerField {
    const ALL: [CustomerField; 4] = [
        CustomerField::Name,
        CustomerField::Email,
        CustomerField::Phone,
        CustomerField::Address,
    ];

    fn label(self) -> &'static str {
        match self {
            CustomerField::Name => "Name *",
            CustomerField::Email => "Email *",
            CustomerField::Phone => "Phone",
            CustomerField::Address => "Address",
        }
    }
}

/// The "Add New Customer" modal.
pub struct CustomerWizardState {
    pub draft: CustomerDraft,
    pub current_field: CustomerField,
    pub editing: bool,
    pub error: Option<String>,
}

impl Default for CustomerWizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerWizardState {
    pub fn new() -> Self {
        Self {
            draft: CustomerDraft::default(),
            current_field: CustomerField::Name,
            editing: false,
            error: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            CustomerField::Name => CustomerField::Email,
            CustomerField::Email => CustomerField::Phone,
            CustomerField::Phone => CustomerField::Address,
            CustomerField::Address => CustomerField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            CustomerField::Name => CustomerField::Address,
            CustomerField::Email => CustomerField::Name,
            CustomerField::Phone => CustomerField::Email,
            CustomerField::Address => CustomerField::Phone,
        };
    }

    fn field_mut(&mut self, field: CustomerField) -> &mut String {
        match field {
            CustomerField::Name => &mut self.draft.name,
            CustomerField::Email => &mut self.draft.email,
            CustomerField::Phone => &mut self.draft.phone,
            CustomerField::Address => &mut self.draft.address,
        }
    }

    fn field(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Name => &self.draft.name,
            CustomerField::Email => &self.draft.email,
            CustomerField::Phone => &self.draft.phone,
            CustomerField::Address => &self.draft.address,
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let value = self.field_mut(self.current_field);
        match key {
            KeyCode::Char(c) => value.push(c),
            KeyCode::Backspace => {
                value.pop();
            }
            _ => {}
        }
    }
}

pub fn render_customer_wizard<B: Backend>(f: &mut Frame<B>, state: &CustomerWizardState) {
    let area = centered_rect(60, 60, f.size());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(6),
                Constraint::Length(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_form(f, state, chunks[0]);

    if let Some(error) = &state.error {
        render_message(f, chunks[1], error, false);
    }

    let help_text = if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate | S - Add customer | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &CustomerWizardState, area: Rect) {
    let items: Vec<ListItem> = CustomerField::ALL
        .iter()
        .map(|&field| {
            let value = state.field(field);
            let selected = field == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let content = if selected && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", field.label()), label_style),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Spans::from(vec![
                    Span::styled(format!("{}: ", field.label()), label_style),
                    Span::raw(value.to_string()),
                ])
            };
            ListItem::new(content)
        })
        .collect();

    let form = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Add New Customer"),
    );
    f.render_widget(form, area);
}

pub fn handle_key(state: &mut CustomerWizardState, key: KeyCode) -> Option<CustomerWizardAction> {
    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Some(CustomerWizardAction::Cancel);
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => {
            let missing = state.draft.missing_fields();
            if missing.is_empty() {
                state.error = None;
                return Some(CustomerWizardAction::Save);
            }
            state.error = Some(format!("Required: {}", missing.join(", ")));
        }
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }
    None
}

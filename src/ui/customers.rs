use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::api::{BillingApi, ResourceClient};
use crate::models::Customer;
use crate::sync::{create_customer, ListSync, ViewScope};
use crate::ui::components::grid::{render_grid, GridState};
use crate::ui::components::render_status;
use crate::ui::customer_wizard::{
    handle_key as handle_wizard_key, render_customer_wizard, CustomerWizardAction,
    CustomerWizardState,
};
use crate::ui::{navigation_key, ViewAction};

// Represents the state of the customer list screen
pub struct CustomersState {
    customers: ListSync<Customer>,
    grid: GridState,
    wizard: Option<CustomerWizardState>,
    scope: ViewScope,
    mounted: bool,
}

impl Default for CustomersState {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomersState {
    pub fn new() -> Self {
        Self {
            customers: ListSync::new(),
            grid: GridState::default(),
            wizard: None,
            scope: ViewScope::new(),
            mounted: false,
        }
    }

    pub fn customers(&self) -> &ListSync<Customer> {
        &self.customers
    }

    pub fn wizard(&self) -> Option<&CustomerWizardState> {
        self.wizard.as_ref()
    }

    pub fn wizard_mut(&mut self) -> Option<&mut CustomerWizardState> {
        self.wizard.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn open_wizard(&mut self) {
        if self.wizard.is_none() {
            self.wizard = Some(CustomerWizardState::new());
        }
    }

    /// First fetch after the view appears. Runs once.
    pub async fn mount<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.reload(api).await;
    }

    pub async fn reload<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        let mut token = self.scope.token();
        self.customers.load(api, &mut token).await;
        self.grid.clamp(self.customers.items().len());
    }

    /// Send the open draft. On success the modal closes, the draft is
    /// dropped and the list is reloaded; otherwise the modal stays open with
    /// the draft and the error.
    pub async fn submit<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        match create_customer(api, &wizard.draft).await {
            Ok(_) => {
                self.wizard = None;
                self.reload(api).await;
            }
            Err(err) => {
                if let Some(wizard) = self.wizard.as_mut() {
                    wizard.error = Some(err.to_string());
                }
            }
        }
    }
}

pub fn render_customers<B: Backend>(frame: &mut Frame<B>, state: &mut CustomersState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let len = state.customers.items().len();
    render_grid(frame, chunks[0], "Customers", state.customers.items(), &mut state.grid);

    let hint = if state.customers.is_pending() {
        "Loading customers...".to_string()
    } else {
        format!(
            "{} customers | <N> Add Customer | <R> Reload | <Left/Right> Page | <1> Summary <3> Bills | <Q> Quit",
            len
        )
    };
    render_status(frame, chunks[1], state.customers.last_error(), &hint);

    if let Some(wizard) = &state.wizard {
        render_customer_wizard(frame, wizard);
    }
}

pub fn handle_key(state: &mut CustomersState, key: KeyCode) -> Option<ViewAction> {
    if let Some(wizard) = &mut state.wizard {
        match handle_wizard_key(wizard, key) {
            Some(CustomerWizardAction::Cancel) => state.wizard = None,
            Some(CustomerWizardAction::Save) => return Some(ViewAction::Submit),
            None => {}
        }
        return None;
    }

    let len = state.customers.items().len();
    match key {
        KeyCode::Char('n') | KeyCode::Char('a') => state.open_wizard(),
        KeyCode::Char('r') => return Some(ViewAction::Reload),
        KeyCode::Down => state.grid.next_row(len),
        KeyCode::Up => state.grid.previous_row(len),
        KeyCode::Right => state.grid.next_page(len),
        KeyCode::Left => state.grid.previous_page(len),
        _ => return navigation_key(key),
    }
    None
}

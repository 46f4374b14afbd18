use chrono::Utc;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::api::{BillingApi, ResourceClient};
use crate::models::{generate_bill_number, Bill, Customer};
use crate::sync::{create_bill, ListSync, ViewScope};
use crate::ui::bill_wizard::{
    handle_key as handle_wizard_key, render_bill_wizard, BillWizardAction, BillWizardState,
};
use crate::ui::components::grid::{render_grid, GridState};
use crate::ui::components::render_status;
use crate::ui::{navigation_key, ViewAction};

// Represents the state of the bill list screen
pub struct BillsState {
    bills: ListSync<Bill>,
    // Options for the customer picker
    customers: ListSync<Customer>,
    grid: GridState,
    wizard: Option<BillWizardState>,
    scope: ViewScope,
    mounted: bool,
}

impl Default for BillsState {
    fn default() -> Self {
        Self::new()
    }
}

impl BillsState {
    pub fn new() -> Self {
        Self {
            bills: ListSync::new(),
            customers: ListSync::new(),
            grid: GridState::default(),
            wizard: None,
            scope: ViewScope::new(),
            mounted: false,
        }
    }

    pub fn bills(&self) -> &ListSync<Bill> {
        &self.bills
    }

    pub fn customers(&self) -> &ListSync<Customer> {
        &self.customers
    }

    pub fn wizard(&self) -> Option<&BillWizardState> {
        self.wizard.as_ref()
    }

    pub fn wizard_mut(&mut self) -> Option<&mut BillWizardState> {
        self.wizard.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn open_wizard(&mut self) {
        if self.wizard.is_none() {
            self.wizard = Some(BillWizardState::new(self.customers.items()));
        }
    }

    pub async fn mount<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.reload(api).await;
    }

    /// Fetch bills and customers side by side.
    pub async fn reload<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        let mut bills_token = self.scope.token();
        let mut customers_token = self.scope.token();
        tokio::join!(
            self.bills.load(api, &mut bills_token),
            self.customers.load(api, &mut customers_token),
        );
        self.grid.clamp(self.bills.items().len());
        if let Some(wizard) = self.wizard.as_mut() {
            wizard.set_customers(self.customers.items());
        }
    }

    /// Send the open draft with a fresh bill number.
    ///
    /// A failed item write leaves the modal open with a warning, and the list
    /// is reloaded since the server may still hold the bill.
    pub async fn submit<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        let bill_number = generate_bill_number(Utc::now());
        match create_bill(api, &wizard.draft, bill_number).await {
            Ok(_) => {
                self.wizard = None;
                self.reload(api).await;
            }
            Err(err) => {
                let partial = err.is_partial_write();
                if let Some(wizard) = self.wizard.as_mut() {
                    wizard.message = Some((err.to_string(), partial));
                }
                if partial {
                    self.reload(api).await;
                }
            }
        }
    }
}

pub fn render_bills<B: Backend>(frame: &mut Frame<B>, state: &mut BillsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)].as_ref())
        .split(frame.size());

    let len = state.bills.items().len();
    render_grid(frame, chunks[0], "Bills", state.bills.items(), &mut state.grid);

    let hint = if state.bills.is_pending() {
        "Loading bills...".to_string()
    } else {
        format!(
            "{} bills | <N> Create Bill | <R> Reload | <Left/Right> Page | <1> Summary <2> Customers | <Q> Quit",
            len
        )
    };
    let error = state.bills.last_error().or(state.customers.last_error());
    render_status(frame, chunks[1], error, &hint);

    if let Some(wizard) = state.wizard.as_mut() {
        render_bill_wizard(frame, wizard);
    }
}

pub fn handle_key(state: &mut BillsState, key: KeyCode) -> Option<ViewAction> {
    if let Some(wizard) = &mut state.wizard {
        match handle_wizard_key(wizard, key) {
            Some(BillWizardAction::Cancel) => state.wizard = None,
            Some(BillWizardAction::Save) => return Some(ViewAction::Submit),
            None => {}
        }
        return None;
    }

    let len = state.bills.items().len();
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

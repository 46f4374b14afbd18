use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::{BillingApi, ResourceClient};
use crate::sync::{Summary, ViewScope};
use crate::ui::components::render_status;
use crate::ui::{navigation_key, ViewAction};

// Represents the state of the summary dashboard
pub struct SummaryState {
    summary: Summary,
    scope: ViewScope,
    mounted: bool,
}

impl Default for SummaryState {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryState {
    pub fn new() -> Self {
        Self {
            summary: Summary::default(),
            scope: ViewScope::new(),
            mounted: false,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub async fn mount<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.reload(api).await;
    }

    pub async fn reload<C: ResourceClient>(&mut self, api: &BillingApi<C>) {
        self.summary.load(api, &self.scope).await;
    }
}

fn render_card<B: Backend>(frame: &mut Frame<B>, area: Rect, title: &str, value: String) {
    let text = vec![
        Spans::from(""),
        Spans::from(Span::styled(
            value,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
    ];
    let card = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(card, area);
}

pub fn render_summary<B: Backend>(frame: &mut Frame<B>, state: &SummaryState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title = Paragraph::new("Billing Summary")
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(chunks[1]);

    let stats = state.summary.stats();
    render_card(frame, cards[0], "Total Customers", stats.customer_count.to_string());
    render_card(frame, cards[1], "Total Bills", stats.bill_count.to_string());
    render_card(frame, cards[2], "Total Revenue", stats.revenue_display());

    let errors = state.summary.errors().join(" | ");
    let pending = state.summary.customers.is_pending() || state.summary.bills.is_pending();
    let hint = if pending {
        "Loading summary..."
    } else {
        "<R> Reload | <2> Customers <3> Bills | <Q> Quit"
    };
    render_status(
        frame,
        chunks[3],
        (!errors.is_empty()).then_some(errors.as_str()),
        hint,
    );
}

pub fn handle_key(_state: &mut SummaryState, key: KeyCode) -> Option<ViewAction> {
    match key {
        KeyCode::Char('r') => Some(ViewAction::Reload),
        _ => navigation_key(key),
    }
}

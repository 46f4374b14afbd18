use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::pin::pin;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use billing_admin::api::{BillingApi, HttpResourceClient, TokenStore};
use billing_admin::cli::{run_report, run_token, Cli, Command};
use billing_admin::config::Config;
use billing_admin::ui::{
    bills::{handle_key as handle_bills_key, render_bills, BillsState},
    customers::{handle_key as handle_customers_key, render_customers, CustomersState},
    key_presses,
    summary::{handle_key as handle_summary_key, render_summary, SummaryState},
    until_leaving, Screen, ViewAction,
};

type Api = BillingApi<HttpResourceClient<TokenStore>>;

// Represents the current screen in the app. Each variant owns its view state,
// so replacing it closes the old view's scope.
enum AppScreen {
    Summary(SummaryState),
    Customers(CustomersState),
    Bills(BillsState),
}

impl AppScreen {
    fn open(screen: Screen) -> Self {
        match screen {
            Screen::Summary => AppScreen::Summary(SummaryState::new()),
            Screen::Customers => AppScreen::Customers(CustomersState::new()),
            Screen::Bills => AppScreen::Bills(BillsState::new()),
        }
    }

    fn screen(&self) -> Screen {
        match self {
            AppScreen::Summary(_) => Screen::Summary,
            AppScreen::Customers(_) => Screen::Customers,
            AppScreen::Bills(_) => Screen::Bills,
        }
    }

    fn is_mounted(&self) -> bool {
        match self {
            AppScreen::Summary(state) => state.is_mounted(),
            AppScreen::Customers(state) => state.is_mounted(),
            AppScreen::Bills(state) => state.is_mounted(),
        }
    }

    async fn mount(&mut self, api: &Api) {
        match self {
            AppScreen::Summary(state) => state.mount(api).await,
            AppScreen::Customers(state) => state.mount(api).await,
            AppScreen::Bills(state) => state.mount(api).await,
        }
    }

    async fn reload(&mut self, api: &Api) {
        match self {
            AppScreen::Summary(state) => state.reload(api).await,
            AppScreen::Customers(state) => state.reload(api).await,
            AppScreen::Bills(state) => state.reload(api).await,
        }
    }

    async fn submit(&mut self, api: &Api) {
        match self {
            AppScreen::Summary(_) => {}
            AppScreen::Customers(state) => state.submit(api).await,
            AppScreen::Bills(state) => state.submit(api).await,
        }
    }
}

// Main application state
struct AppState {
    api: Api,
    screen: AppScreen,
}

impl AppState {
    fn new(api: Api) -> Self {
        Self {
            api,
            screen: AppScreen::open(Screen::Summary),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Logs go to a file while the UI owns the terminal.
fn init_file_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let store = config.token_store()?;
    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url.clone());
    let command = cli.command.unwrap_or(Command::Tui);

    if let Command::Token { action } = &command {
        init_stderr_tracing();
        println!("{}", run_token(&store, action)?);
        return Ok(());
    }

    let api = BillingApi::new(HttpResourceClient::new(&api_url, store)?);

    if let Some(report) = command.report() {
        init_stderr_tracing();
        print!("{}", run_report(&api, report).await?);
        return Ok(());
    }

    init_file_tracing(&config.log_file)?;
    info!(api_url = %api.client().base_url(), "starting billing admin");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(api);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        println!("Error: {}", err);
    }
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    let mut keys = pin!(key_presses());

    loop {
        // Render current screen
        terminal.draw(|f| match &mut app_state.screen {
            AppScreen::Summary(state) => render_summary(f, state),
            AppScreen::Customers(state) => render_customers(f, state),
            AppScreen::Bills(state) => render_bills(f, state),
        })?;

        let current = app_state.screen.screen();
        let screen = &mut app_state.screen;
        let api = &app_state.api;

        // Loads keep listening for quit and switch keys. A fresh view has
        // been drawn in its loading state before its first fetch.
        let action = if !screen.is_mounted() {
            until_leaving(current, screen.mount(api), &mut keys).await?
        } else {
            let Some(key) = keys.next().await.transpose()? else {
                break;
            };
            let action = match &mut *screen {
                AppScreen::Summary(state) => handle_summary_key(state, key),
                AppScreen::Customers(state) => handle_customers_key(state, key),
                AppScreen::Bills(state) => handle_bills_key(state, key),
            };
            match action {
                Some(ViewAction::Reload) => until_leaving(current, screen.reload(api), &mut keys).await?,
                // Writes run to completion so a failed bill is always compensated.
                Some(ViewAction::Submit) => {
                    screen.submit(api).await;
                    None
                }
                other => other,
            }
        };

        match action {
            Some(ViewAction::Quit) => break,
            // Dropping the old view closes its scope and discards its loads.
            Some(ViewAction::Switch(next)) if next != current => {
                app_state.screen = AppScreen::open(next);
            }
            _ => {}
        }
    }

    Ok(())
}

pub mod bill_wizard;
pub mod bills;
pub mod components;
pub mod customer_wizard;
pub mod customers;
pub mod summary;

use std::future::Future;
use std::io;
use std::pin::pin;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures::{future, Stream, StreamExt};

// The three top-level views
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Summary,
    Customers,
    Bills,
}

/// What a view asks the app loop to do after a key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ViewAction {
    Quit,
    Switch(Screen),
    Reload,
    Submit,
}

/// Keys shared by every view when no modal is open.
pub fn navigation_key(key: KeyCode) -> Option<ViewAction> {
    match key {
        KeyCode::Char('1') => Some(ViewAction::Switch(Screen::Summary)),
        KeyCode::Char('2') => Some(ViewAction::Switch(Screen::Customers)),
        KeyCode::Char('3') => Some(ViewAction::Switch(Screen::Bills)),
        KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Quit),
        _ => None,
    }
}

/// Key presses from the terminal. Other events are skipped.
pub fn key_presses() -> impl Stream<Item = io::Result<KeyCode>> {
    EventStream::new().filter_map(|event| {
        future::ready(match event {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Some(Ok(key.code)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
    })
}

/// Drive a view's pending load while still listening to the keyboard.
///
/// A quit, or a switch away from `current`, stops the load and is returned;
/// the caller then drops the view, which closes its scope. Other keys typed
/// meanwhile are ignored.
pub async fn until_leaving<F, S>(current: Screen, work: F, keys: &mut S) -> io::Result<Option<ViewAction>>
where
    F: Future<Output = ()>,
    S: Stream<Item = io::Result<KeyCode>> + Unpin,
{
    let mut work = pin!(work);
    loop {
        tokio::select! {
            () = &mut work => return Ok(None),
            key = keys.next() => match key {
                Some(Ok(key)) => match navigation_key(key) {
                    Some(ViewAction::Quit) => return Ok(Some(ViewAction::Quit)),
                    Some(ViewAction::Switch(screen)) if screen != current => {
                        return Ok(Some(ViewAction::Switch(screen)));
                    }
                    _ => {}
                },
                Some(Err(err)) => return Err(err),
                // Input is gone; let the load finish.
                None => {
                    work.await;
                    return Ok(None);
                }
            },
        }
    }
}

//! Terminal presentation surface for the review session.
//!
//! Read-only composition of the query record and the draft: the views
//! render what the session holds, user actions mutate the draft or dispatch
//! the controllers, and control never flows back from the views.

mod app;
mod event;
mod runner;
mod ui;

pub use app::{App, Focus};
pub use event::{Event, EventHandler};
pub use runner::{restore_terminal, run_tui};

//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the current view, input
//! and fetched data. `app::view` turns it into typed view models for `ui`.

mod model;
mod view;

pub use model::*;
pub use view::*;

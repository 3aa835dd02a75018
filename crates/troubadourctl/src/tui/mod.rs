//! TUI Module - the terminal presenter
//!
//! - terminal: raw-mode setup/restore and the `Presenter` impl
//! - input: key map from terminal keys to operator intents
//! - render: one screen per wizard phase
//! - layout: review grid and dialog placement
//! - patterns: display test colour fields and calibration pattern

mod input;
mod layout;
mod patterns;
mod render;
mod terminal;

pub use input::map_key;
pub use terminal::TuiPresenter;

//! Troubadour Control - terminal front end for the hardware qualification wizard
//!
//! The binary wires configuration, tracing, the system probe and the OS
//! power commands into `runtime::Wizard`, and renders it through the
//! ratatui presenter in `tui`.

pub mod errors;
pub mod logging;
pub mod power;
pub mod runtime;
pub mod tui;

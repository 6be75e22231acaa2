//! Terminal front end for ProfNetwork: configuration, the console seam and
//! the menu state machine.

pub mod config;
pub mod console;
pub mod menu;
pub mod views;

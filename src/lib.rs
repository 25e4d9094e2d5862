pub mod commands;
pub mod error;
pub mod git;
pub mod model;
pub mod picker;
pub mod profile;
pub mod store;
pub mod tui;
pub mod ui;

#[cfg(test)]
pub mod test_utils;

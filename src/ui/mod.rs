//! egui front-end: one window, one primary control, the conversation.

pub mod app;
pub mod components;
pub mod theme;

pub use app::MazraApp;

mod components;
mod controller;
mod create_dashboard;
mod state;

pub use components::Dashboard;

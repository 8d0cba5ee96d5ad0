pub mod api;
pub mod campaign;
pub mod cli;
pub mod config;
pub mod editor;
pub mod resource;
pub mod ui;

// docshelf library - exposes all core modules for the CLI and tests

pub mod config;
pub mod model;
pub mod services;
pub mod view;

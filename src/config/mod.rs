//! Project configuration (`.notpass.toml`).

pub mod settings;

pub use settings::Settings;

pub mod common;
pub mod phone;
pub mod settings;

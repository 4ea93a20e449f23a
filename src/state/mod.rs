pub mod phone;
pub mod ui;

pub use phone::*;
pub use ui::*;

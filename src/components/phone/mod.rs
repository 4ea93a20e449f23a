mod dialer;
mod incoming;
mod screen;
mod session;

pub use dialer::*;
pub use incoming::*;
pub use screen::*;
pub use session::*;

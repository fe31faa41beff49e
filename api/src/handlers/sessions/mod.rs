mod session_handlers;

pub use session_handlers::*;

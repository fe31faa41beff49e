mod saved_event_handlers;

pub use saved_event_handlers::*;

pub mod contacts;
pub mod devices;
pub mod events;
pub mod friends;
pub mod saved_events;
pub mod sessions;
pub mod users;

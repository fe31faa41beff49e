mod device;
mod event;
mod friend;
mod notification;
mod user;

pub use device::*;
pub use event::*;
pub use friend::*;
pub use notification::*;
pub use user::*;

mod device;
mod event;
mod friend;
mod user;

pub(crate) use device::*;
pub(crate) use event::*;
pub(crate) use friend::*;
pub(crate) use user::*;

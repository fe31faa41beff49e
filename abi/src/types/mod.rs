use crate::errors::Error;

mod device;
mod event;
mod friend;
mod user;

/// checks a request body before it reaches a repository
pub trait Validator {
    fn validate(&self) -> Result<(), Error>;
}

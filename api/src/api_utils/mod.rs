pub mod custom_extract;
pub mod social;

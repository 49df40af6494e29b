//! Resource Server Types
//!
//! Records, scope sets, configuration and the request shape.

pub mod authorization;
pub mod code;
pub mod config;
pub mod request;
pub mod scope;
pub mod token;

pub use authorization::*;
pub use code::*;
pub use config::*;
pub use request::*;
pub use scope::*;
pub use token::*;

pub mod command;
pub mod controller;
pub mod error;
pub mod fields;
pub mod profile;
pub mod session;

pub use command::*;
pub use controller::*;
pub use error::*;
pub use fields::*;
pub use profile::*;
pub use session::*;

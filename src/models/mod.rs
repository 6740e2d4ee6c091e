pub mod admin;
pub mod booking;
pub mod common;
pub mod expense;
pub mod fleet;
pub mod pagination;
pub mod staff;
pub mod verification;

pub use admin::*;
pub use booking::*;
pub use common::*;
pub use expense::*;
pub use fleet::*;
pub use pagination::*;
pub use staff::*;
pub use verification::*;

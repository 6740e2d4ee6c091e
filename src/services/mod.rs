pub mod admin_service;
pub mod booking_service;
pub mod expense_service;
pub mod fleet_service;
pub mod record_store;
pub mod staff_service;
pub mod verification_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin_service::*;
pub use booking_service::*;
pub use expense_service::*;
pub use fleet_service::*;
pub use staff_service::*;
pub use verification_service::*;

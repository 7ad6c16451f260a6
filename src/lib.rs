pub mod aggregation;
pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod extraction;
pub mod identity_rotation;
pub mod price_normalizer;
pub mod session_management;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::Controller;

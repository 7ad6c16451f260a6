//! Identity rotation core module.
//!
//! An identity is a named network egress location (a VPN country). Only one can be
//! active on the machine at a time, so the rotator is owned by the run controller and
//! driven strictly sequentially.
//!
//! - `identity`: the [`Identity`] name type and listing parser
//! - `command_runner`: [`CommandRunner`] seam over the external control program
//! - `egress`: [`AddressLookup`] for the current public address
//! - `rotator`: [`IdentityRotator`], list/activate/deactivate

pub mod command_runner;
pub mod egress;
pub mod identity;
pub mod rotator;

pub use command_runner::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use egress::{AddressLookup, HttpAddressLookup};
pub use identity::{parse_identity_list, Identity};
pub use rotator::IdentityRotator;

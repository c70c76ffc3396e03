//! `stockledger-auth` — role-based access policy evaluation.
//!
//! The policy matrix is fixed (not data-driven) and the decision function is
//! pure: no IO, no panics, no business logic. Callers check before mutating;
//! the store re-checks (defense in depth) and surfaces denials as errors.

pub mod policy;
pub mod principal;
pub mod profile;
pub mod roles;

pub use policy::{authorize, AuthzError, Operation, Resource};
pub use principal::Principal;
pub use profile::Profile;
pub use roles::Role;

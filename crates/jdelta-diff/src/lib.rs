//! Diff engine for jdelta.
//!
//! Compares two value graphs and produces an ordered changeset. Objects are
//! compared member by member; arrays are compared by an identity key looked
//! up in caller-supplied [`IdentityRules`], falling back to position.
//!
//! # Key Types
//!
//! - [`diff`] -- Entry point
//! - [`IdentityRules`] -- Key-path to identity strategy table
//! - [`IdentityResolver`] / [`FieldIdentity`] / [`FnIdentity`] -- Element identity capabilities

pub mod array;
pub mod compare;
pub mod error;
pub mod identity;

pub use array::index_elements;
pub use compare::{diff, Members};
pub use error::{DiffError, DiffResult};
pub use identity::{FieldIdentity, FnIdentity, IdentityResolver, IdentityRules, IdentityStrategy};

//! Catalog data model
//!
//! Three fixed levels: [`Category`] → [`SubCategory`] → [`Disease`]. Each
//! child carries a typed, non-owning back-reference to its parent, which
//! [`flatten`] follows to build [`MedicalCode`] rows.

mod entry;
mod record;

pub use entry::{Category, Child, Disease, Entry, Listing, SubCategory};
pub use record::{flatten, MedicalCode};

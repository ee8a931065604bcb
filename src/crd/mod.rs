//! Velero custom resource types (`velero.io/v1`)
//!
//! The schemas are owned by Velero; these types only cover the fields the
//! dashboard reads or writes. Unknown fields are ignored on deserialization.

mod backup;
mod repository;
mod restore;
mod schedule;
mod storage_location;

pub use backup::*;
pub use repository::*;
pub use restore::*;
pub use schedule::*;
pub use storage_location::*;


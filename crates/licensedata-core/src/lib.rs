pub mod collation;
pub mod options;
pub mod records;
pub mod shape;

pub use collation::{compare_ids, dedup_by_id, sort_by_id};
pub use options::OutputOptions;
pub use records::{
    CrossRef, Exception, ExceptionDetails, ExceptionsDocument, License, LicenseDetails,
    LicensesDocument, RegistryEntry,
};
pub use shape::Shape;

//! # Bank
//!
//! Domain types shared by the server: the site config document, the form
//! schema engine, the registration validator and the registration record.
//!
//! Everything here is pure. Storage and HTTP live in the `server` crate.
pub mod config;
pub mod content;
pub mod error;
pub mod fields;
pub mod ordered;
pub mod registration;
pub mod validate;

pub use config::{ConfigReplacement, Section, SectionUpdate, SiteConfig};
pub use error::{SchemaError, ValidationError};
pub use fields::{FieldDescriptor, FieldType, FormSchema};
pub use ordered::{Direction, Ordered, OrderedList};
pub use registration::{Registration, RegistrationQuery, Stats, Status};
pub use validate::{Submission, validate};

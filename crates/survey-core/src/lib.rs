//! Core types, validation and the submission path for the survey engine.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::SurveyStore`]; the HTTP layer calls
//! [`submit::submit`] and the store's read methods.

// Native `async fn` in traits; the trait spells out `Send` bounds itself.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod fingerprint;
pub mod hierarchy;
pub mod response;
pub mod store;
pub mod submit;
pub mod survey;
pub mod validate;

pub use error::{Error, Result, StorageErrorKind, StorageFault, ValidationError};

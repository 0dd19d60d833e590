//! Student records domain.
//!
//! # Data Flow
//! ```text
//! JSON body
//!     → validation.rs (typed StudentInput or ValidationError)
//!     → service.rs (one store call per operation)
//!     → model.rs (Document ⇄ StudentRecord)
//! ```

pub mod model;
pub mod service;
pub mod validation;

pub use model::{Marks, StudentInput, StudentRecord};
pub use service::StudentService;
pub use validation::{validate_search_term, validate_student, ValidationError};

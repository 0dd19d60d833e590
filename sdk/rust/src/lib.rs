//! Typed client for the student records API.

mod client;

pub use client::{Envelope, NewStudent, RecordsClient, Reply, Student};

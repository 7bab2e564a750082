//! Job postings and applications.

pub mod handlers;
pub mod models;

// Main library entry point for Logweaver.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

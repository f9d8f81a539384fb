//! Minimal upload/download HTTP fixture.
//!
//! `GET /<name>` serves a file from the uploads directory and `PUT /<name>`
//! stores the request body there. Client test suites point their upload
//! tools at it.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;

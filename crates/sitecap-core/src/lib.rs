pub mod config;
pub mod logging;

// Capture pipeline, leaves first.
pub mod batch;
pub mod capture;
pub mod extract;
pub mod http;
pub mod metadata;
pub mod storage;
pub mod target;
pub mod url_model;

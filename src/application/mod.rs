// Application layer - Use cases and ports
pub mod cache;
pub mod dashboard_service;
pub mod sheet_loader;
pub mod sheet_source;

// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_decoder;
pub mod http_sheet_source;

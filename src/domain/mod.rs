// Domain layer - Tables, aggregation and dashboard views
pub mod aggregate;
pub mod dashboard;
pub mod ranking;
pub mod series;
pub mod table;
pub mod template;

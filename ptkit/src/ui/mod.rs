// ptkit/src/ui/mod.rs
pub mod output_format;
pub mod stats_table;
pub mod theme;

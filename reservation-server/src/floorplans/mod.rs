//! 平面图模块

pub mod data;

pub use data::{availability, catalog, find, find_table_label};

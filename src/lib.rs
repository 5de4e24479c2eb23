pub mod config;
pub mod core;
pub mod export;
pub mod layout;
pub mod ocr;
pub mod pipeline;

pub use config::LayoutConfig;
pub use crate::core::model::{ClassBlock, ClockTime, ScheduleDocument, ScheduleLayout, TextBox, Weekday};
pub use layout::{build_layout, GridLayoutEngine, LayoutEngine};

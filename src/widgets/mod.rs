pub mod analytics;
pub mod chart;
pub mod controls;
pub mod debug;
pub mod select;
pub mod sidebar;
pub mod table;
pub mod text_input;
pub mod text_input_common;

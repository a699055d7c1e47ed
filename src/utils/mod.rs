pub mod net_utils;
pub mod ui;

pub mod deal;
pub mod menu;
pub mod order;

pub mod catalog;
pub mod customers;
pub mod inventory;
pub mod mechanics;
pub mod ticket_cost;
pub mod tickets;
pub mod vehicles;

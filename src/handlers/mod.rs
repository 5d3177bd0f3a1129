pub mod auth;
pub mod catalog;
pub mod customers;
pub mod inventory;
pub mod mechanics;
pub mod tickets;
pub mod vehicles;

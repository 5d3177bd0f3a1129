pub mod customer;
pub mod mechanic;
pub mod mechanic_certification;
pub mod part;
pub mod service;
pub mod service_package;
pub mod service_package_item;
pub mod service_ticket;
pub mod specialization;
pub mod ticket_assignment;
pub mod ticket_line_item;
pub mod ticket_part_usage;
pub mod vehicle;

pub mod booking;
pub mod booking_add_on;
pub mod booking_extension;
pub mod booking_return;
pub mod customer;
pub mod driver;
pub mod location;
pub mod user;
pub mod vehicle;
pub mod vehicle_category;
pub mod vehicle_sub_category;

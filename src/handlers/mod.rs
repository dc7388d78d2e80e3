pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod customers;
pub mod drivers;
pub mod locations;
pub mod vehicles;

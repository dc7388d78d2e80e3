pub mod availability;
pub mod bookings;
pub mod lifecycle;
pub mod vehicle_lock;

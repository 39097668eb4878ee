pub mod bookings;
pub mod search;
pub mod stations;

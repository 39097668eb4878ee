pub mod booking;
pub mod departure;
pub mod passenger;
pub mod station;
pub mod train;

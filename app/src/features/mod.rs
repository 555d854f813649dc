//! One reducer per view

pub mod bus_list;
pub mod bus_seats;
pub mod login;
pub mod register;
pub mod user_bookings;

pub mod socket_guard;
pub mod steam_pages;

pub mod blogs;
pub mod clients;
pub mod events;
pub mod health;
pub mod news;
pub mod tailor;

pub mod account;
pub mod answer;
pub mod assistant;
pub mod authentication;
pub mod image;
pub mod question;
pub mod vote;

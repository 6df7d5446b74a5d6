pub mod account;
pub mod analytics;
pub mod answer;
pub mod pagination;
pub mod question;
pub mod vote;

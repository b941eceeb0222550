pub mod company;
pub mod job;
pub mod profile;
pub mod question;

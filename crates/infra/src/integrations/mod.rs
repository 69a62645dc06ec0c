//! External directory integrations

pub mod google_people;

pub use google_people::GooglePeopleDirectory;

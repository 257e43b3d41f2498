pub mod announcements;
pub mod applications;
pub mod auth;
pub mod chat;
pub mod documents;
pub mod drives;
pub mod export;
pub mod health;
pub mod helpdesk;
pub mod interviews;
pub mod mentors;
pub mod offers;
pub mod pages;
pub mod profile;
pub mod stories;

pub mod account;
pub mod announcement;
pub mod application;
pub mod drive;
pub mod helpdesk_ticket;
pub mod interview_slot;
pub mod mentor;
pub mod offer_letter;
pub mod session;
pub mod staff;
pub mod student_document;
pub mod success_story;

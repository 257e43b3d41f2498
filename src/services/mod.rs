pub mod ai_service;
pub mod announcement_service;
pub mod application_service;
pub mod document_service;
pub mod drive_service;
pub mod export_service;
pub mod identity_service;
pub mod interview_service;
pub mod mail_service;
pub mod mentor_service;
pub mod offer_service;
pub mod profile_service;
pub mod session_service;
pub mod storage_service;
pub mod story_service;
pub mod ticket_service;
pub mod verification;

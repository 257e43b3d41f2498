pub mod application_dto;
pub mod auth_dto;
pub mod drive_dto;
pub mod portal_dto;
pub mod profile_dto;

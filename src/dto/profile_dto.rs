use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Text fields of the profile form. The resume arrives as a separate
/// multipart part.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub branch: Option<String>,
    pub cgpa: Option<Decimal>,
    #[validate(range(min = 0, message = "Backlogs cannot be negative."))]
    pub backlogs: Option<i32>,
    pub batch_year: Option<i32>,
    pub skills: Option<String>,
    pub linkedin_url: Option<String>,
}

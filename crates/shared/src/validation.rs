//! Common validation utilities.
//!
//! The `validate_*` functions plug into `#[validate(custom(function = ...))]`.

use std::borrow::Cow;

use validator::ValidationError;

lazy_static::lazy_static! {
    /// Login names: 4-20 characters, lowercase letters, digits and underscores.
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9_]{4,20}$").unwrap();

    /// Korean mobile and landline numbers, with or without hyphens.
    pub static ref PHONE_REGEX: regex::Regex =
        regex::Regex::new(r"^0\d{1,2}-?\d{3,4}-?\d{4}$").unwrap();

    /// Business registration numbers (XXX-XX-XXXXX).
    pub static ref BUSINESS_NO_REGEX: regex::Regex =
        regex::Regex::new(r"^\d{3}-?\d{2}-?\d{5}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "필수 항목을 입력해주세요."))
    } else {
        Ok(())
    }
}

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if USERNAME_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(error(
            "username_format",
            "아이디는 4~20자의 영문 소문자, 숫자, 밑줄만 사용할 수 있습니다.",
        ))
    }
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(value.trim()) {
        Ok(())
    } else {
        Err(error("phone_format", "올바른 전화번호 형식이 아닙니다."))
    }
}

pub fn validate_business_no(value: &str) -> Result<(), ValidationError> {
    if BUSINESS_NO_REGEX.is_match(value.trim()) {
        Ok(())
    } else {
        Err(error(
            "business_no_format",
            "사업자등록번호 형식이 올바르지 않습니다.",
        ))
    }
}

/// Trims an optional free-text value and drops it when nothing is left.
///
/// ```
/// use shared::validation::non_blank;
///
/// assert_eq!(non_blank(Some("  재고 없음 ")), Some("재고 없음".to_string()));
/// assert_eq!(non_blank(Some("   ")), None);
/// assert_eq!(non_blank(None), None);
/// ```
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

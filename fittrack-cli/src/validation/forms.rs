use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::ValidationErrors;
use crate::api::{LoginRequest, RegisterRequest, ResetPasswordRequest};
use crate::models::{GoalType, NewGoal};

static USERNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is a valid regex")
});

static LETTER_AND_DIGIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:.*[A-Za-z].*[0-9]|.*[0-9].*[A-Za-z]).*$")
        .expect("password pattern is a valid regex")
});

const DATE_MESSAGE: &str = "Deadline must be a date (YYYY-MM-DD)";

fn check<T: Validate>(form: &T, order: &[&str]) -> Result<(), ValidationErrors> {
    form.validate()
        .map_err(|report| ValidationErrors::from_report(&report, order))
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn iso_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| failure("date", DATE_MESSAGE))
}

fn finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(failure("finite", "Target must be a number"))
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email must be a valid email address")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    const FIELDS: [&'static str; 2] = ["email", "password"];

    pub fn to_request(&self) -> Result<LoginRequest, ValidationErrors> {
        let form = Self {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        check(&form, &Self::FIELDS)?;

        Ok(LoginRequest {
            email: form.email,
            password: form.password,
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RegisterForm {
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3 to 30 characters"),
        regex(
            path = *USERNAME,
            message = "Username may only contain letters, digits and underscores"
        )
    )]
    pub username: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email must be a valid email address")
    )]
    pub email: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        regex(
            path = *LETTER_AND_DIGIT,
            message = "Password must contain at least one letter and one digit"
        )
    )]
    pub password: String,
    #[validate(
        length(min = 1, message = "Password confirmation is required"),
        must_match(other = "password", message = "Password confirmation must match the password")
    )]
    pub confirm_password: String,
    #[validate(length(max = 50, message = "First name must be at most 50 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 50, message = "Last name must be at most 50 characters"))]
    pub last_name: Option<String>,
}

impl RegisterForm {
    const FIELDS: [&'static str; 6] = [
        "username",
        "email",
        "password",
        "confirm_password",
        "first_name",
        "last_name",
    ];

    pub fn to_request(&self) -> Result<RegisterRequest, ValidationErrors> {
        let form = Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            first_name: non_blank(&self.first_name),
            last_name: non_blank(&self.last_name),
        };
        check(&form, &Self::FIELDS)?;

        Ok(RegisterRequest {
            username: form.username,
            email: form.email,
            password: form.password,
            first_name: form.first_name,
            last_name: form.last_name,
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ResetPasswordForm {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email must be a valid email address")
    )]
    pub email: String,
}

impl ResetPasswordForm {
    pub fn to_request(&self) -> Result<ResetPasswordRequest, ValidationErrors> {
        let form = Self {
            email: self.email.trim().to_string(),
        };
        check(&form, &["email"])?;

        Ok(ResetPasswordRequest { email: form.email })
    }
}

/// Goal input as collected by the prompts
#[derive(Debug, Clone, Validate)]
pub struct GoalForm {
    #[validate(length(min = 3, max = 100, message = "Title must be 3 to 100 characters"))]
    pub title: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    pub goal_type: GoalType,
    #[validate(
        range(min = 0.01, max = 1_000_000.0, message = "Target must be between 0.01 and 1000000"),
        custom(function = "finite")
    )]
    pub target_value: f64,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1 to 20 characters"))]
    pub unit: String,
    #[validate(custom(function = "iso_date"))]
    pub deadline: String,
}

impl GoalForm {
    const FIELDS: [&'static str; 5] = ["title", "description", "target_value", "unit", "deadline"];

    /// Validate against `today`: the deadline may not be in the past
    pub fn to_new_goal(&self, today: NaiveDate) -> Result<NewGoal, ValidationErrors> {
        let form = Self {
            title: self.title.trim().to_string(),
            description: non_blank(&self.description),
            goal_type: self.goal_type,
            target_value: self.target_value,
            unit: self.unit.trim().to_string(),
            deadline: self.deadline.trim().to_string(),
        };

        let mut errors = match check(&form, &Self::FIELDS) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let deadline = NaiveDate::parse_from_str(&form.deadline, "%Y-%m-%d").ok();
        if let Some(date) = deadline {
            // Deadline is the last field, so appending keeps form order
            if date < today {
                errors.add("deadline", "Deadline cannot be in the past");
            }
        }
        errors.into_result()?;

        let deadline = deadline.ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add("deadline", DATE_MESSAGE);
            errors
        })?;

        Ok(NewGoal {
            title: form.title,
            description: form.description,
            goal_type: form.goal_type,
            target_value: form.target_value,
            unit: form.unit,
            deadline,
        })
    }
}

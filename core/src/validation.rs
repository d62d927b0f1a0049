//! Form-level validation.
//!
//! RULE: Validation runs before anything reaches a store or the user
//! service. Stores accept whatever they are handed.
//! Every failing rule is reported, not just the first.

use crate::{
    auth::{LoginData, RegisterData},
    case_store::CaseDraft,
    config::ValidationConfig,
    error::{DeskError, DeskResult},
    transaction_store::TransactionDraft,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_transaction(draft: &TransactionDraft, limits: &ValidationConfig) -> DeskResult<()> {
    let mut errors = Vec::new();
    min_len(&mut errors, "sender", &draft.sender, limits.min_party_len);
    min_len(&mut errors, "recipient", &draft.recipient, limits.min_party_len);
    if !draft.amount.is_finite() || draft.amount <= 0.0 {
        errors.push(FieldError::new("amount", "Amount must be a positive number"));
    }
    finish(errors)
}

pub fn validate_case(draft: &CaseDraft, limits: &ValidationConfig) -> DeskResult<()> {
    let mut errors = Vec::new();
    min_len(&mut errors, "title", &draft.title, limits.min_case_title_len);
    min_len(&mut errors, "description", &draft.description, limits.min_case_description_len);
    if draft.ml_confidence > 100 {
        errors.push(FieldError::new("mlConfidence", "Confidence must be between 0 and 100"));
    }
    finish(errors)
}

pub fn validate_registration(data: &RegisterData, limits: &ValidationConfig) -> DeskResult<()> {
    let mut errors = Vec::new();
    min_len(&mut errors, "name", &data.name, limits.min_name_len);
    check_email(&mut errors, &data.email);
    if data.password.chars().count() < limits.min_password_len {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", limits.min_password_len),
        ));
    }
    min_len(&mut errors, "organization", &data.organization, limits.min_organization_len);
    finish(errors)
}

pub fn validate_login(data: &LoginData) -> DeskResult<()> {
    let mut errors = Vec::new();
    check_email(&mut errors, &data.email);
    if data.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    finish(errors)
}

pub fn validate_email(email: &str) -> DeskResult<()> {
    let mut errors = Vec::new();
    check_email(&mut errors, email);
    finish(errors)
}

fn min_len(errors: &mut Vec<FieldError>, field: &str, value: &str, min: usize) {
    if value.trim().chars().count() < min {
        errors.push(FieldError::new(
            field,
            format!("Must be at least {min} characters"),
        ));
    }
}

fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    let well_formed = email
        .trim()
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        errors.push(FieldError::new("email", "Please enter a valid email address"));
    }
}

fn finish(errors: Vec<FieldError>) -> DeskResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DeskError::Validation(errors))
    }
}

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::dto::{LoginRequest, SignupRequest};
use crate::error::FieldErrors;
use crate::users::dto::UserDetailsRequest;
use crate::users::repo::UserPatch;

const MUST_NOT_BE_EMPTY: &str = "Must not be empty";

pub fn is_empty(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn is_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Field-keyed problems with a signup body; empty when it is acceptable.
pub fn validate_signup(req: &SignupRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_empty(&req.email) {
        errors.insert("email", MUST_NOT_BE_EMPTY);
    } else if !is_email(req.email.trim()) {
        errors.insert("email", "Must be a valid email address");
    }

    if is_empty(&req.password) {
        errors.insert("password", MUST_NOT_BE_EMPTY);
    }
    if req.password != req.confirm_password {
        errors.insert("confirmPassword", "Passwords must match");
    }
    if is_empty(&req.handle) {
        errors.insert("handle", MUST_NOT_BE_EMPTY);
    }

    errors
}

pub fn validate_login(req: &LoginRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if is_empty(&req.email) {
        errors.insert("email", MUST_NOT_BE_EMPTY);
    }
    if is_empty(&req.password) {
        errors.insert("password", MUST_NOT_BE_EMPTY);
    }
    errors
}

/// Keeps only the editable profile fields that carry a value.
pub fn reduce_user_details(req: &UserDetailsRequest) -> UserPatch {
    let present = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };

    UserPatch {
        bio: present(&req.bio),
        website: present(&req.website).map(|w| {
            if w.starts_with("http") {
                w
            } else {
                format!("http://{w}")
            }
        }),
        location: present(&req.location),
        image_url: None,
    }
}

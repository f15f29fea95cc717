//! Credential form validation.
//!
//! DESIGN
//! ======
//! Validation is a pure function of the field values: `validate(form) ->
//! ErrorSet`. [`FormState`] reruns it after every edit, so the
//! password/confirm cross-field rule is recomputed whenever either side
//! changes and nothing ever mutates a stored error flag.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;

const MAX_EMAIL_LEN: usize = 254;
const MAX_EMAIL_LOCAL_LEN: usize = 64;

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .ok()
});

static NO_ERRORS: ErrorSet = ErrorSet(BTreeSet::new());

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirm password",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum FieldError {
    #[error("is required")]
    Required,
    #[error("must be a valid email address")]
    InvalidEmail,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("does not match password")]
    Mismatch,
}

/// Every failing rule of a form, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet(BTreeSet<(Field, FieldError)>);

impl ErrorSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, field: Field, error: FieldError) -> bool {
        self.0.contains(&(field, error))
    }

    #[must_use]
    pub fn field_is_invalid(&self, field: Field) -> bool {
        self.0.iter().any(|(f, _)| *f == field)
    }

    pub fn for_field(&self, field: Field) -> impl Iterator<Item = FieldError> + '_ {
        self.0
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, e)| *e)
    }

    fn insert(&mut self, field: Field, error: FieldError) {
        self.0.insert((field, error));
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {error}", field.label())?;
        }
        Ok(())
    }
}

// =============================================================================
// RULES
// =============================================================================

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.split_once('@') else {
        return false;
    };
    email.len() <= MAX_EMAIL_LEN
        && local.len() <= MAX_EMAIL_LOCAL_LEN
        && EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(email))
}

fn check_email(value: &str, errors: &mut ErrorSet) {
    if value.is_empty() {
        errors.insert(Field::Email, FieldError::Required);
    } else if !is_valid_email(value) {
        errors.insert(Field::Email, FieldError::InvalidEmail);
    }
}

fn check_password(value: &str, errors: &mut ErrorSet) {
    if value.is_empty() {
        errors.insert(Field::Password, FieldError::Required);
    } else if value.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(Field::Password, FieldError::TooShort { min: MIN_PASSWORD_LEN });
    }
}

/// The mismatch flag is only raised once the confirm field passes its own
/// rules, so `Required` is never shadowed or duplicated.
fn check_confirmation(password: &str, confirm: &str, errors: &mut ErrorSet) {
    if confirm.is_empty() {
        errors.insert(Field::ConfirmPassword, FieldError::Required);
        return;
    }
    if password != confirm {
        errors.insert(Field::ConfirmPassword, FieldError::Mismatch);
    }
}

// =============================================================================
// FORMS
// =============================================================================

pub trait Validate {
    fn validate(&self) -> ErrorSet;
}

/// Single-email form (forgot password, resend verification).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailForm {
    pub email: String,
}

impl Validate for EmailForm {
    fn validate(&self) -> ErrorSet {
        let mut errors = ErrorSet::default();
        check_email(&self.email, &mut errors);
        errors
    }
}

/// New password plus confirmation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResetPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

impl fmt::Debug for ResetPasswordForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordForm")
            .field("password_len", &self.password.len())
            .field("matches", &(self.password == self.confirm_password))
            .finish()
    }
}

impl Validate for ResetPasswordForm {
    fn validate(&self) -> ErrorSet {
        let mut errors = ErrorSet::default();
        check_password(&self.password, &mut errors);
        check_confirmation(&self.password, &self.confirm_password, &mut errors);
        errors
    }
}

/// Field values, their current errors, and whether a submit was attempted.
#[derive(Debug, Clone)]
pub struct FormState<F> {
    fields: F,
    errors: ErrorSet,
    submitted: bool,
}

impl<F: Validate + Default> Default for FormState<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: Validate> FormState<F> {
    #[must_use]
    pub fn new(fields: F) -> Self {
        let errors = fields.validate();
        Self { fields, errors, submitted: false }
    }

    #[must_use]
    pub fn fields(&self) -> &F {
        &self.fields
    }

    /// Apply an edit and revalidate the whole form.
    pub fn update(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.fields);
        self.errors = self.fields.validate();
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Errors to display: empty until the first submit attempt.
    #[must_use]
    pub fn visible_errors(&self) -> &ErrorSet {
        if self.submitted { &self.errors } else { &NO_ERRORS }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;

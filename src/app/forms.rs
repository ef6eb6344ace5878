//! Registration and profile forms
//!
//! Forms hold raw text as typed. Validation collects one message per field
//! into [`FormErrors`] and returns the typed result only when every field
//! passes.

use crate::core::entity::UserProfile;
use crate::validators::{
    Civility, MaritalStatus, sanitize_text, validate_birth_date, validate_child_name,
    validate_children_count, validate_email, validate_full_name, validate_password,
    validate_phone, validate_required,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Form validation errors for individual fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub civility: Option<String>,
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub profession: Option<String>,
    pub marital_status: Option<String>,
    pub children_count: Option<String>,
    /// One slot per declared child, in order
    pub children: Vec<Option<String>>,
    pub terms: Option<String>,
}

impl FormErrors {
    pub fn child(&self, index: usize) -> Option<&str> {
        self.children.get(index).and_then(|e| e.as_deref())
    }
}

/// Stores the error of a failed field check and flags the form.
fn record<T>(result: Result<T, String>, slot: &mut Option<String>, has_errors: &mut bool) {
    if let Err(message) = result {
        *slot = Some(message);
        *has_errors = true;
    }
}

/// Wizard step
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    strum::Display,
    strum::EnumIter,
)]
pub enum Step {
    #[default]
    #[strum(serialize = "Personal details")]
    Identity,
    #[strum(serialize = "Situation")]
    Situation,
    #[strum(serialize = "Children and terms")]
    Family,
}

impl Step {
    pub fn number(self) -> usize {
        match self {
            Step::Identity => 1,
            Step::Situation => 2,
            Step::Family => 3,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Step::Identity => Some(Step::Situation),
            Step::Situation => Some(Step::Family),
            Step::Family => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Step::Identity => None,
            Step::Situation => Some(Step::Identity),
            Step::Family => Some(Step::Situation),
        }
    }
}

/// A validated registration, ready to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub civility: Civility,
    pub birth_date: NaiveDate,
    pub address: String,
    pub profession: String,
    pub marital_status: MaritalStatus,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub civility: Option<Civility>,
    pub birth_date: String,
    pub address: String,
    pub profession: String,
    pub marital_status: Option<MaritalStatus>,
    pub children_count: String,
    pub children: Vec<String>,
    pub accepted_terms: bool,
}

impl RegistrationForm {
    fn declares_children(&self) -> bool {
        self.marital_status
            .is_some_and(MaritalStatus::declares_children)
    }

    /// Number of child name fields to show
    pub fn child_slots(&self) -> usize {
        if !self.declares_children() {
            return 0;
        }
        validate_children_count(&self.children_count).map_or(0, usize::from)
    }

    /// Switching to single drops the children; other statuses keep them.
    pub fn set_marital_status(&mut self, status: MaritalStatus) {
        self.marital_status = Some(status);
        if !status.declares_children() {
            self.children_count.clear();
            self.children.clear();
        }
    }

    /// Resizes the child name list to match the typed count.
    pub fn set_children_count(&mut self, count: String) {
        self.children_count = count;
        let slots = self.child_slots();
        self.children.resize(slots, String::new());
    }

    pub fn set_child_name(&mut self, index: usize, name: String) {
        if let Some(slot) = self.children.get_mut(index) {
            *slot = name;
        }
    }

    /// Validates the fields of one step
    ///
    /// Returns `None` if validation passed
    pub fn validate_step(&self, step: Step) -> Option<FormErrors> {
        let mut errors = FormErrors::default();
        let mut has_errors = false;

        match step {
            Step::Identity => {
                self.validate_identity(&mut errors, &mut has_errors);
            }
            Step::Situation => {
                self.validate_situation(&mut errors, &mut has_errors);
            }
            Step::Family => {
                self.validate_children(&mut errors, &mut has_errors);
                self.validate_terms(&mut errors, &mut has_errors);
            }
        }

        if has_errors { Some(errors) } else { None }
    }

    fn validate_identity(&self, errors: &mut FormErrors, has_errors: &mut bool) {
        record(validate_full_name(&self.full_name), &mut errors.full_name, has_errors);
        record(validate_phone(&self.phone), &mut errors.phone, has_errors);
        record(validate_email(&self.email), &mut errors.email, has_errors);
        record(validate_password(&self.password), &mut errors.password, has_errors);
        if self.civility.is_none() {
            errors.civility = Some("Civility is required".to_string());
            *has_errors = true;
        }
        record(validate_birth_date(&self.birth_date), &mut errors.birth_date, has_errors);
    }

    fn validate_situation(&self, errors: &mut FormErrors, has_errors: &mut bool) {
        record(
            validate_required(&self.address, "Address is required"),
            &mut errors.address,
            has_errors,
        );
        record(
            validate_required(&self.profession, "Profession is required"),
            &mut errors.profession,
            has_errors,
        );
        let Some(status) = self.marital_status else {
            errors.marital_status = Some("Marital status is required".to_string());
            *has_errors = true;
            return;
        };
        if status.declares_children() {
            record(
                validate_children_count(&self.children_count),
                &mut errors.children_count,
                has_errors,
            );
        }
    }

    fn validate_children(&self, errors: &mut FormErrors, has_errors: &mut bool) {
        if !self.declares_children() {
            return;
        }
        errors.children = self
            .children
            .iter()
            .enumerate()
            .map(|(i, name)| validate_child_name(i + 1, name).err())
            .collect();
        if errors.children.iter().any(Option::is_some) {
            *has_errors = true;
        }
    }

    fn validate_terms(&self, errors: &mut FormErrors, has_errors: &mut bool) {
        if !self.accepted_terms {
            errors.terms = Some("You must accept the terms and conditions".to_string());
            *has_errors = true;
        }
    }

    /// Validates every step and builds the registration.
    ///
    /// # Errors
    ///
    /// Returns the first failing step with its errors.
    pub fn submit(&self) -> Result<Registration, (Step, FormErrors)> {
        for step in [Step::Identity, Step::Situation, Step::Family] {
            if let Some(errors) = self.validate_step(step) {
                return Err((step, errors));
            }
        }
        let fail = |step: Step| (step, FormErrors::default());

        let marital_status = self.marital_status.ok_or_else(|| fail(Step::Situation))?;
        let children = if marital_status.declares_children() {
            self.children
                .iter()
                .map(|name| sanitize_text(name, 128))
                .collect()
        } else {
            Vec::new()
        };
        Ok(Registration {
            full_name: validate_full_name(&self.full_name).map_err(|_| fail(Step::Identity))?,
            phone: validate_phone(&self.phone).map_err(|_| fail(Step::Identity))?,
            email: validate_email(&self.email).map_err(|_| fail(Step::Identity))?,
            password: self.password.clone(),
            civility: self.civility.ok_or_else(|| fail(Step::Identity))?,
            birth_date: validate_birth_date(&self.birth_date).map_err(|_| fail(Step::Identity))?,
            address: sanitize_text(&self.address, 256),
            profession: sanitize_text(&self.profession, 128),
            marital_status,
            children,
        })
    }
}

/// Editable copy of the signed-in customer's profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub full_name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
    pub image: Option<String>,
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            address: profile.address.clone(),
            phone: profile.phone.clone(),
            image: profile.image.clone(),
        }
    }

    /// Returns `None` if validation passed
    pub fn validate(&self) -> Option<FormErrors> {
        let mut errors = FormErrors::default();
        let mut has_errors = false;

        record(validate_full_name(&self.full_name), &mut errors.full_name, &mut has_errors);
        record(validate_email(&self.email), &mut errors.email, &mut has_errors);
        // Phone is optional on the profile page
        if !self.phone.trim().is_empty() {
            record(validate_phone(&self.phone), &mut errors.phone, &mut has_errors);
        }

        if has_errors { Some(errors) } else { None }
    }

    /// Applies the edited fields on top of `profile`.
    pub fn apply(&self, profile: &UserProfile) -> UserProfile {
        UserProfile {
            full_name: sanitize_text(&self.full_name, 128),
            email: self.email.trim().to_string(),
            address: sanitize_text(&self.address, 256),
            phone: self.phone.trim().to_string(),
            image: self.image.clone(),
            ..profile.clone()
        }
    }
}

//! Profile page: view and edit the signed-in customer's details

use crate::app::forms::{FormErrors, ProfileForm};
use crate::core::entity::UserProfile;
use crate::core::error::Result;
use crate::core::source::{FetchState, ViewBranch};
use std::sync::Arc;

#[derive(Debug)]
pub enum Message {
    Loaded(Result<Arc<UserProfile>>),
    EditToggled,
    FullNameChanged(String),
    EmailChanged(String),
    AddressChanged(String),
    PhoneChanged(String),
    ImageChanged(Option<String>),
    Submit,
    /// Result of the save started by [`Outcome::Save`]
    Saved(Result<Arc<UserProfile>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    None,
    /// Send the updated profile to the backend
    Save(UserProfile),
}

#[derive(Debug)]
pub struct ProfileEditor {
    profile: FetchState<Arc<UserProfile>>,
    form: ProfileForm,
    errors: FormErrors,
    editing: bool,
    saving: bool,
    save_error: Option<String>,
}

impl Default for ProfileEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileEditor {
    pub fn new() -> Self {
        Self {
            profile: FetchState::Loading,
            form: ProfileForm::default(),
            errors: FormErrors::default(),
            editing: false,
            saving: false,
            save_error: None,
        }
    }

    pub fn branch(&self) -> ViewBranch<'_, Arc<UserProfile>> {
        self.profile.branch(|_| false)
    }

    /// The loaded profile, if any
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.ready().map(AsRef::as_ref)
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    fn reset_form(&mut self) {
        self.form = self
            .profile
            .ready()
            .map(|p| ProfileForm::from_profile(p))
            .unwrap_or_default();
        self.errors = FormErrors::default();
    }

    pub fn update(&mut self, message: Message) -> Outcome {
        match message {
            Message::Loaded(result) => {
                self.profile = FetchState::from_result(result);
                self.editing = false;
                self.reset_form();
            }
            Message::EditToggled => {
                if self.profile.ready().is_none() {
                    return Outcome::None;
                }
                if self.editing {
                    // Cancel drops unsaved edits
                    self.reset_form();
                }
                self.editing = !self.editing;
                self.save_error = None;
            }
            Message::FullNameChanged(v) if self.editing => self.form.full_name = v,
            Message::EmailChanged(v) if self.editing => self.form.email = v,
            Message::AddressChanged(v) if self.editing => self.form.address = v,
            Message::PhoneChanged(v) if self.editing => self.form.phone = v,
            Message::ImageChanged(v) if self.editing => self.form.image = v,
            Message::Submit => {
                if !self.editing || self.saving {
                    return Outcome::None;
                }
                let Some(profile) = self.profile.ready() else {
                    return Outcome::None;
                };
                if let Some(errors) = self.form.validate() {
                    self.errors = errors;
                    return Outcome::None;
                }
                let updated = self.form.apply(profile);
                self.errors = FormErrors::default();
                self.saving = true;
                return Outcome::Save(updated);
            }
            Message::Saved(Ok(profile)) => {
                tracing::info!("Profile of client {} updated", profile.client_id);
                self.saving = false;
                self.editing = false;
                self.save_error = None;
                self.profile = FetchState::Ready(profile);
                self.reset_form();
            }
            Message::Saved(Err(e)) => {
                tracing::warn!("Profile update failed: {e}");
                self.saving = false;
                self.save_error = Some(e.to_string());
            }
            // Field edits outside edit mode
            _ => {}
        }
        Outcome::None
    }
}

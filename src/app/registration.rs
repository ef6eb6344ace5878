//! Three-step registration wizard
//!
//! "Next" validates the current step and only advances when it passes.
//! "Previous" always goes back and clears the shown errors. A successful
//! submit hands the registration to the caller and resets the wizard.

use crate::app::forms::{FormErrors, Registration, RegistrationForm, Step};
use crate::validators::{Civility, MaritalStatus};

#[derive(Debug, Clone)]
pub enum Message {
    FullNameChanged(String),
    PhoneChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    CivilitySelected(Civility),
    BirthDateChanged(String),
    AddressChanged(String),
    ProfessionChanged(String),
    MaritalStatusSelected(MaritalStatus),
    ChildrenCountChanged(String),
    ChildNameChanged(usize, String),
    TermsToggled(bool),
    Next,
    Previous,
    Submit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    None,
    Submitted(Registration),
}

#[derive(Debug, Default)]
pub struct RegistrationWizard {
    step: Step,
    form: RegistrationForm,
    errors: FormErrors,
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn update(&mut self, message: Message) -> Outcome {
        match message {
            Message::FullNameChanged(v) => self.form.full_name = v,
            Message::PhoneChanged(v) => self.form.phone = v,
            Message::EmailChanged(v) => self.form.email = v,
            Message::PasswordChanged(v) => self.form.password = v,
            Message::CivilitySelected(c) => self.form.civility = Some(c),
            Message::BirthDateChanged(v) => self.form.birth_date = v,
            Message::AddressChanged(v) => self.form.address = v,
            Message::ProfessionChanged(v) => self.form.profession = v,
            Message::MaritalStatusSelected(status) => {
                self.form.set_marital_status(status);
                if !status.declares_children() {
                    self.errors.children_count = None;
                    self.errors.children.clear();
                }
            }
            Message::ChildrenCountChanged(v) => self.form.set_children_count(v),
            Message::ChildNameChanged(index, name) => self.form.set_child_name(index, name),
            Message::TermsToggled(accepted) => self.form.accepted_terms = accepted,
            Message::Next => {
                if let Some(errors) = self.form.validate_step(self.step) {
                    tracing::debug!("Registration step {} has errors", self.step.number());
                    self.errors = errors;
                } else if let Some(next) = self.step.next() {
                    self.errors = FormErrors::default();
                    self.step = next;
                }
            }
            Message::Previous => {
                self.errors = FormErrors::default();
                if let Some(previous) = self.step.previous() {
                    self.step = previous;
                }
            }
            Message::Submit => {
                if self.step != Step::Family {
                    return Outcome::None;
                }
                match self.form.submit() {
                    Ok(registration) => {
                        tracing::info!("Registration submitted for {}", registration.email);
                        *self = Self::default();
                        return Outcome::Submitted(registration);
                    }
                    Err((step, errors)) => {
                        self.step = step;
                        self.errors = errors;
                    }
                }
            }
        }
        Outcome::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_identity(wizard: &mut RegistrationWizard) {
        for message in [
            Message::FullNameChanged("Amira Trabelsi".into()),
            Message::PhoneChanged("21234567".into()),
            Message::EmailChanged("amira@example.tn".into()),
            Message::PasswordChanged("secret1".into()),
            Message::CivilitySelected(Civility::Mrs),
            Message::BirthDateChanged("1991-04-12".into()),
        ] {
            wizard.update(message);
        }
    }

    fn fill_situation(wizard: &mut RegistrationWizard, status: MaritalStatus, children: &str) {
        wizard.update(Message::AddressChanged("5 Avenue Habib Bourguiba".into()));
        wizard.update(Message::ProfessionChanged("Engineer".into()));
        wizard.update(Message::MaritalStatusSelected(status));
        wizard.update(Message::ChildrenCountChanged(children.into()));
    }

    #[test]
    fn test_next_blocked_by_errors() {
        let mut wizard = RegistrationWizard::new();
        wizard.update(Message::Next);
        assert_eq!(wizard.step(), Step::Identity);
        assert!(wizard.errors().email.is_some());

        fill_identity(&mut wizard);
        wizard.update(Message::Next);
        assert_eq!(wizard.step(), Step::Situation);
        assert_eq!(wizard.errors(), &FormErrors::default());
    }

    #[test]
    fn test_previous_clears_errors() {
        let mut wizard = RegistrationWizard::new();
        fill_identity(&mut wizard);
        wizard.update(Message::Next);
        wizard.update(Message::Next);
        assert!(wizard.errors().address.is_some());

        wizard.update(Message::Previous);
        assert_eq!(wizard.step(), Step::Identity);
        assert_eq!(wizard.errors(), &FormErrors::default());
        wizard.update(Message::Previous);
        assert_eq!(wizard.step(), Step::Identity);
    }

    #[test]
    fn test_switching_to_single_clears_children() {
        let mut wizard = RegistrationWizard::new();
        fill_identity(&mut wizard);
        wizard.update(Message::Next);
        fill_situation(&mut wizard, MaritalStatus::Married, "2");
        assert_eq!(wizard.form().children.len(), 2);

        wizard.update(Message::MaritalStatusSelected(MaritalStatus::Single));
        assert!(wizard.form().children.is_empty());
        wizard.update(Message::Next);
        assert_eq!(wizard.step(), Step::Family);
    }

    #[test]
    fn test_full_submit_resets() {
        let mut wizard = RegistrationWizard::new();
        fill_identity(&mut wizard);
        wizard.update(Message::Next);
        fill_situation(&mut wizard, MaritalStatus::Divorced, "1");
        wizard.update(Message::Next);
        assert_eq!(wizard.step(), Step::Family);

        assert_eq!(wizard.update(Message::Submit), Outcome::None);
        assert_eq!(wizard.errors().child(0), Some("Name of child 1 is required"));
        assert!(wizard.errors().terms.is_some());

        wizard.update(Message::ChildNameChanged(0, "Adam".into()));
        wizard.update(Message::TermsToggled(true));
        let Outcome::Submitted(registration) = wizard.update(Message::Submit) else {
            panic!("expected a submitted registration");
        };
        assert_eq!(registration.children, vec!["Adam"]);
        assert_eq!(registration.civility, Civility::Mrs);

        assert_eq!(wizard.step(), Step::Identity);
        assert!(wizard.form().full_name.is_empty());
    }

    #[test]
    fn test_submit_only_from_last_step() {
        let mut wizard = RegistrationWizard::new();
        fill_identity(&mut wizard);
        assert_eq!(wizard.update(Message::Submit), Outcome::None);
        assert_eq!(wizard.step(), Step::Identity);
    }
}

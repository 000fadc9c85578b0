//! Multi-step profile completion form.

use std::collections::BTreeSet;

use shared::{
    domain::{UserId, Weekday},
    protocol::{CreateProfileRequest, Education, Experience},
};
use tracing::{info, warn};

use crate::{
    error::{ClientError, ClientResult},
    ProfileDirectory, SessionProvider,
};

pub const PROFILE_FAILURE_FALLBACK: &str = "Failed to complete profile.";
pub const PROFILE_SUCCESS_MESSAGE: &str = "Profile completed successfully!";
pub const TOTAL_STEPS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PersonalInfo = 1,
    Experience = 2,
    Education = 3,
    Availability = 4,
}

impl Step {
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::PersonalInfo),
            2 => Some(Self::Experience),
            3 => Some(Self::Education),
            4 => Some(Self::Availability),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::PersonalInfo => "Personal Info",
            Self::Experience => "Experience",
            Self::Education => "Education",
            Self::Availability => "Availability",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub fullname: String,
    pub headline: String,
    pub about_me: String,
    pub location: String,
    pub public_email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub availability: BTreeSet<Weekday>,
    pub is_profile_public: bool,
}

impl ProfileDraft {
    /// Appends a blank entry and returns its index.
    pub fn add_experience(&mut self) -> usize {
        self.experience.push(Experience::default());
        self.experience.len() - 1
    }

    pub fn remove_experience(&mut self, index: usize) -> Option<Experience> {
        (index < self.experience.len()).then(|| self.experience.remove(index))
    }

    pub fn add_education(&mut self) -> usize {
        self.education.push(Education::default());
        self.education.len() - 1
    }

    pub fn remove_education(&mut self, index: usize) -> Option<Education> {
        (index < self.education.len()).then(|| self.education.remove(index))
    }

    /// Returns whether the day is selected afterwards.
    pub fn toggle_day(&mut self, day: Weekday) -> bool {
        if self.availability.remove(&day) {
            false
        } else {
            self.availability.insert(day);
            true
        }
    }

    pub fn toggle_public(&mut self) -> bool {
        self.is_profile_public = !self.is_profile_public;
        self.is_profile_public
    }

    /// Only the personal info step has a required field.
    pub fn is_step_valid(&self, step: Step) -> bool {
        match step {
            Step::PersonalInfo => !self.fullname.trim().is_empty(),
            Step::Experience | Step::Education | Step::Availability => true,
        }
    }

    pub fn to_request(&self, user_id: UserId) -> CreateProfileRequest {
        CreateProfileRequest {
            user_id,
            fullname: self.fullname.trim().to_string(),
            headline: self.headline.clone(),
            about_me: self.about_me.clone(),
            location: self.location.clone(),
            public_email: self.public_email.clone(),
            phone: self.phone.clone(),
            linkedin_url: self.linkedin_url.clone(),
            experience: self.experience.clone(),
            education: self.education.clone(),
            availability: self
                .availability
                .iter()
                .map(|day| day.as_str().to_string())
                .collect(),
            is_profile_public: self.is_profile_public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileWizard {
    draft: ProfileDraft,
    step: Step,
}

impl Default for ProfileWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileWizard {
    pub fn new() -> Self {
        Self {
            draft: ProfileDraft::default(),
            step: Step::PersonalInfo,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ProfileDraft {
        &mut self.draft
    }

    pub fn is_last_step(&self) -> bool {
        self.step.number() == TOTAL_STEPS
    }

    /// Advances unless the current step is invalid or already the last one.
    pub fn next_step(&mut self) -> bool {
        if !self.draft.is_step_valid(self.step) {
            return false;
        }
        match Step::from_number(self.step.number() + 1) {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    pub fn prev_step(&mut self) -> bool {
        match self.step.number().checked_sub(1).and_then(Step::from_number) {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    /// Posts the draft for the signed-in user and returns the confirmation
    /// text. Errors carry the message to show.
    pub async fn submit(
        &self,
        directory: &dyn ProfileDirectory,
        session: &dyn SessionProvider,
    ) -> ClientResult<&'static str> {
        let outcome = match session.current_user().await {
            Some(user) => {
                let request = self.draft.to_request(user.id);
                directory.create_profile(&request).await
            }
            None => Err(ClientError::NotAuthenticated),
        };
        match outcome {
            Ok(()) => {
                info!("profile completed");
                Ok(PROFILE_SUCCESS_MESSAGE)
            }
            Err(err) => {
                warn!(kind = err.kind(), "failed to complete profile: {err}");
                Err(ClientError::Application {
                    status: err.status(),
                    message: err.display_message(PROFILE_FAILURE_FALLBACK),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/profile_draft_tests.rs"]
mod tests;

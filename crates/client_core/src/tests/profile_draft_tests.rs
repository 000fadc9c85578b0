use super::*;

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::protocol::Profile;

use crate::session::CurrentUser;

#[derive(Default)]
struct RecordingDirectory {
    created: Mutex<Vec<CreateProfileRequest>>,
    reject_with: Option<ClientError>,
}

#[async_trait]
impl ProfileDirectory for RecordingDirectory {
    async fn list_profiles(&self, _page: u32, _page_size: u32, _search: &str) -> ClientResult<Value> {
        Ok(json!({}))
    }

    async fn get_profile_by_user_id(&self, _user_id: &UserId) -> ClientResult<Profile> {
        Err(ClientError::application("not used"))
    }

    async fn create_profile(&self, request: &CreateProfileRequest) -> ClientResult<()> {
        self.created.lock().expect("created").push(request.clone());
        match &self.reject_with {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

struct SignedIn;

#[async_trait]
impl SessionProvider for SignedIn {
    async fn current_user(&self) -> Option<CurrentUser> {
        Some(CurrentUser {
            id: UserId::new("u1"),
            email: Some("ada@example.com".to_string()),
            username: Some("ada".to_string()),
            token: "tok".to_string(),
        })
    }
}

#[test]
fn first_step_requires_fullname() {
    let mut wizard = ProfileWizard::new();
    assert_eq!(wizard.step(), Step::PersonalInfo);
    assert!(!wizard.next_step());

    wizard.draft_mut().fullname = "   ".to_string();
    assert!(!wizard.next_step());

    wizard.draft_mut().fullname = "Ada Lovelace".to_string();
    assert!(wizard.next_step());
    assert_eq!(wizard.step(), Step::Experience);
    assert!(wizard.next_step());
    assert!(wizard.next_step());
    assert!(wizard.is_last_step());
    assert!(!wizard.next_step());
    assert_eq!(wizard.step().title(), "Availability");

    assert!(wizard.prev_step());
    assert!(wizard.prev_step());
    assert!(wizard.prev_step());
    assert!(!wizard.prev_step());
    assert_eq!(wizard.step().number(), 1);
}

#[test]
fn entries_can_be_added_and_removed() {
    let mut draft = ProfileDraft::default();
    let first = draft.add_experience();
    let second = draft.add_experience();
    draft.experience[second].title = "Engineer".to_string();

    let removed = draft.remove_experience(first).expect("removed");
    assert_eq!(removed, Experience::default());
    assert_eq!(draft.experience.len(), 1);
    assert_eq!(draft.experience[0].title, "Engineer");
    assert!(draft.remove_experience(5).is_none());

    let index = draft.add_education();
    draft.education[index].institution = "MIT".to_string();
    assert_eq!(draft.remove_education(index).map(|e| e.institution), Some("MIT".to_string()));
    assert!(draft.education.is_empty());
}

#[test]
fn availability_toggles_and_serializes_in_week_order() {
    let mut draft = ProfileDraft {
        fullname: " Ada ".to_string(),
        ..ProfileDraft::default()
    };
    assert!(draft.toggle_day(Weekday::Friday));
    assert!(draft.toggle_day(Weekday::Monday));
    assert!(draft.toggle_day(Weekday::Sunday));
    assert!(!draft.toggle_day(Weekday::Sunday));
    assert!(draft.toggle_public());

    let request = draft.to_request(UserId::new("u1"));
    assert_eq!(request.fullname, "Ada");
    assert_eq!(request.availability, vec!["Monday", "Friday"]);
    assert!(request.is_profile_public);
    assert_eq!(request.user_id.as_str(), "u1");
}

#[tokio::test]
async fn submit_posts_for_current_user() {
    let directory = RecordingDirectory::default();
    let mut wizard = ProfileWizard::new();
    wizard.draft_mut().fullname = "Ada".to_string();

    let message = wizard.submit(&directory, &SignedIn).await.expect("submit");
    assert_eq!(message, PROFILE_SUCCESS_MESSAGE);

    let created = directory.created.lock().expect("created").clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].user_id.as_str(), "u1");
}

#[tokio::test]
async fn submit_failure_messages() {
    let directory = RecordingDirectory {
        reject_with: Some(ClientError::Application {
            status: Some(400),
            message: "Profile already exists".to_string(),
        }),
        ..RecordingDirectory::default()
    };
    let wizard = ProfileWizard::new();
    let err = wizard.submit(&directory, &SignedIn).await.expect_err("rejected");
    assert_eq!(err.to_string(), "Profile already exists");
    assert_eq!(err.status(), Some(400));

    let directory = RecordingDirectory {
        reject_with: Some(ClientError::Network("timeout".to_string())),
        ..RecordingDirectory::default()
    };
    let err = wizard.submit(&directory, &SignedIn).await.expect_err("offline");
    assert_eq!(err.to_string(), PROFILE_FAILURE_FALLBACK);

    let err = wizard
        .submit(&directory, &crate::AnonymousSession)
        .await
        .expect_err("signed out");
    assert_eq!(err.to_string(), PROFILE_FAILURE_FALLBACK);
    assert_eq!(directory.created.lock().expect("created").len(), 1);
}

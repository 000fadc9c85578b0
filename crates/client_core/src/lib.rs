use async_trait::async_trait;
use serde_json::Value;
use shared::{
    domain::{ChatId, RequestId, UserId},
    protocol::{Chat, ChatMessage, ConnectionRequest, CreateProfileRequest, Profile, UserInfo},
};

pub mod chat;
pub mod directory;
pub mod error;
pub mod profile_draft;
pub mod requests;
pub mod session;
pub mod transport;

pub use directory::{DirectoryController, DirectorySettings, DirectoryView};
pub use error::{ClientError, ClientResult};
pub use session::{CurrentUser, FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use transport::RestClient;

/// Public profile listing and lookup.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Returns the raw list body. The directory controller validates its shape
    /// itself so that a malformed payload degrades to an empty page.
    async fn list_profiles(&self, page: u32, page_size: u32, search: &str) -> ClientResult<Value>;
    async fn get_profile_by_user_id(&self, user_id: &UserId) -> ClientResult<Profile>;
    async fn create_profile(&self, request: &CreateProfileRequest) -> ClientResult<()>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> ClientResult<String>;
    async fn fetch_user_info(&self) -> ClientResult<UserInfo>;
    async fn logout(&self) -> ClientResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Accept,
    Reject,
}

impl RequestAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }
}

#[async_trait]
pub trait RequestsApi: Send + Sync {
    async fn list_received_requests(&self) -> ClientResult<Vec<ConnectionRequest>>;
    async fn respond_to_request(&self, request_id: &RequestId, action: RequestAction)
        -> ClientResult<()>;
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn list_chats(&self) -> ClientResult<Vec<Chat>>;
    async fn list_messages(&self, chat_id: &ChatId) -> ClientResult<Vec<ChatMessage>>;
    async fn send_message(&self, chat_id: &ChatId, content: &str) -> ClientResult<ChatMessage>;
}

/// Read side of the signed-in session, handed to the views that need to know
/// who "me" is.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Option<CurrentUser>;
}

pub struct AnonymousSession;

#[async_trait]
impl SessionProvider for AnonymousSession {
    async fn current_user(&self) -> Option<CurrentUser> {
        None
    }
}

use super::*;

use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::Utc;
use shared::domain::MessageId;
use tokio::sync::oneshot;

use crate::error::ClientError;

fn participant(id: &str, username: Option<&str>) -> Participant {
    Participant {
        id: UserId::new(id),
        username: username.map(str::to_string),
    }
}

fn message(id: &str, sender: &str, content: &str) -> ChatMessage {
    ChatMessage {
        id: MessageId::new(id),
        sender: participant(sender, None),
        content: content.to_string(),
        created_at: None,
    }
}

#[derive(Default)]
struct FakeChats {
    chats: StdMutex<Option<ClientResult<Vec<Chat>>>>,
    fail_sends: bool,
    send_gate: StdMutex<Option<oneshot::Receiver<()>>>,
    sent: StdMutex<Vec<String>>,
}

#[async_trait]
impl ChatApi for FakeChats {
    async fn list_chats(&self) -> ClientResult<Vec<Chat>> {
        self.chats
            .lock()
            .expect("chats")
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_messages(&self, chat_id: &ChatId) -> ClientResult<Vec<ChatMessage>> {
        if chat_id.as_str() == "broken" {
            return Err(ClientError::Network("reset".to_string()));
        }
        Ok(vec![message("m1", "u2", "hi")])
    }

    async fn send_message(&self, _chat_id: &ChatId, content: &str) -> ClientResult<ChatMessage> {
        self.sent.lock().expect("sent").push(content.to_string());
        let gate = self.send_gate.lock().expect("gate").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.fail_sends {
            return Err(ClientError::Application {
                status: Some(403),
                message: "You are not part of this chat".to_string(),
            });
        }
        Ok(message("m2", "u1", content))
    }
}

#[tokio::test]
async fn chat_list_refresh_and_failure() {
    let api = Arc::new(FakeChats::default());
    *api.chats.lock().expect("chats") = Some(Ok(vec![Chat {
        id: ChatId::new("c1"),
        participants: vec![participant("u1", Some("ada")), participant("u2", Some("bob"))],
        last_message_at: None,
    }]));
    let list = ChatList::new(api.clone());

    assert_eq!(list.refresh().await.expect("chats").len(), 1);
    assert_eq!(list.error().await, None);

    *api.chats.lock().expect("chats") = Some(Err(ClientError::Network("down".to_string())));
    list.refresh().await.expect_err("down");
    assert_eq!(list.error().await.as_deref(), Some(CHATS_FAILURE_FALLBACK));
    assert_eq!(list.chats().await.len(), 1);

    *api.chats.lock().expect("chats") = Some(Err(ClientError::application("Chat service paused")));
    list.refresh().await.expect_err("paused");
    assert_eq!(list.error().await.as_deref(), Some("Chat service paused"));
}

#[tokio::test]
async fn window_loads_messages() {
    let window = ChatWindow::new(Arc::new(FakeChats::default()), ChatId::new("c1"));
    assert_eq!(window.refresh().await.expect("messages").len(), 1);
    assert_eq!(window.messages().await[0].content, "hi");

    let broken = ChatWindow::new(Arc::new(FakeChats::default()), ChatId::new("broken"));
    broken.refresh().await.expect_err("broken");
    assert_eq!(broken.error().await.as_deref(), Some(MESSAGES_FAILURE_FALLBACK));
}

#[tokio::test]
async fn send_trims_and_appends() {
    let api = Arc::new(FakeChats::default());
    let window = ChatWindow::new(api.clone(), ChatId::new("c1"));

    window.set_draft("   ").await;
    assert_eq!(window.send().await.expect("blank"), SendOutcome::Ignored);
    assert!(api.sent.lock().expect("sent").is_empty());

    window.set_draft("  hello there \n").await;
    let SendOutcome::Sent(sent) = window.send().await.expect("send") else {
        panic!("expected the message to be sent");
    };
    assert_eq!(sent.content, "hello there");
    assert_eq!(window.draft().await, "");
    assert_eq!(window.messages().await, vec![sent]);
    assert!(!window.is_sending().await);
}

#[tokio::test]
async fn failed_send_restores_draft() {
    let api = Arc::new(FakeChats {
        fail_sends: true,
        ..FakeChats::default()
    });
    let window = ChatWindow::new(api, ChatId::new("c1"));

    window.set_draft(" are you there? ").await;
    let err = window.send().await.expect_err("forbidden");
    assert_eq!(err.status(), Some(403));
    assert_eq!(window.draft().await, "are you there?");
    assert_eq!(
        window.error().await.as_deref(),
        Some("You are not part of this chat")
    );
    assert!(window.messages().await.is_empty());
}

#[tokio::test]
async fn send_is_ignored_while_previous_send_runs() {
    let api = Arc::new(FakeChats::default());
    let (release, gate) = oneshot::channel();
    *api.send_gate.lock().expect("gate") = Some(gate);
    let window = Arc::new(ChatWindow::new(api.clone(), ChatId::new("c1")));

    window.set_draft("first").await;
    let first = tokio::spawn({
        let window = Arc::clone(&window);
        async move { window.send().await }
    });
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while !window.is_sending().await {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("first send started");

    window.set_draft("second").await;
    assert_eq!(window.send().await.expect("ignored"), SendOutcome::Ignored);
    assert_eq!(window.draft().await, "second");

    release.send(()).expect("release");
    assert!(matches!(
        first.await.expect("join").expect("send"),
        SendOutcome::Sent(_)
    ));
    assert_eq!(api.sent.lock().expect("sent").clone(), vec!["first".to_string()]);
}

#[test]
fn participants_and_ownership() {
    let me = UserId::new("u1");
    let chat = Chat {
        id: ChatId::new("c1"),
        participants: vec![participant("u1", Some("ada")), participant("u2", Some("bob"))],
        last_message_at: None,
    };
    let other = other_participant(&chat, &me);
    assert_eq!(other.map(|p| p.id.as_str()), Some("u2"));
    assert_eq!(participant_label(other), "bob");

    let solo = Chat {
        participants: vec![participant("u1", Some("ada"))],
        ..chat.clone()
    };
    assert_eq!(participant_label(other_participant(&solo, &me)), "Unknown User");

    assert!(is_own_message(&message("m1", "u1", "hey"), &me));
    assert!(!is_own_message(&message("m2", "u2", "hey"), &me));
}

#[test]
fn last_message_time_buckets() {
    let now = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).single().expect("now");

    let earlier_today = Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).single().expect("at");
    assert_eq!(format_last_message_time(&earlier_today, &now), "09:30 AM");

    let three_days_ago = Utc.with_ymd_and_hms(2024, 5, 7, 12, 0, 0).single().expect("at");
    assert_eq!(format_last_message_time(&three_days_ago, &now), "Tue");

    let last_month = Utc.with_ymd_and_hms(2024, 4, 2, 12, 0, 0).single().expect("at");
    assert_eq!(format_last_message_time(&last_month, &now), "Apr 2");

    assert_eq!(format_message_time(&earlier_today), "09:30 AM");
}

//! Plain-text rendering of controller state for the terminal.

use chrono::{DateTime, Local, Utc};
use client_core::{
    chat::{format_last_message_time, format_message_time, is_own_message, other_participant, participant_label},
    directory::{about_excerpt, display_name, render_window, DirectoryView},
    requests::{format_received_at, requester_headline, status_label},
    CurrentUser,
};
use shared::protocol::{Chat, ChatMessage, ConnectionRequest};

pub fn directory(view: &DirectoryView) -> String {
    let mut out = String::new();
    if !view.search_term.is_empty() {
        out.push_str(&format!("Search: \"{}\"\n", view.search_term));
    }
    if view.show_skeletons() {
        out.push_str("Loading profiles...\n");
        return out;
    }
    if view.is_searching {
        out.push_str("Searching...\n");
    }
    if let Some(error) = &view.error_message {
        out.push_str(&format!("{error}\n"));
        return out;
    }
    if view.is_empty() {
        out.push_str(&format!("{}\n", view.empty_message()));
        return out;
    }

    for profile in &view.items {
        out.push_str(&format!("* {} [{}]\n", display_name(profile), profile.id));
        if let Some(headline) = profile.headline.as_deref().filter(|h| !h.is_empty()) {
            out.push_str(&format!("  {headline}\n"));
        }
        if let Some(location) = profile.location.as_deref().filter(|l| !l.is_empty()) {
            out.push_str(&format!("  {location}\n"));
        }
        out.push_str(&format!("  {}\n", about_excerpt(profile)));
        if let Some(email) = profile.owner_email() {
            out.push_str(&format!("  {email}\n"));
        }
    }

    if !view.page_window.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            render_window(&view.page_window, view.current_page)
        ));
    }
    if let Some(summary) = view.summary() {
        out.push_str(&format!("{summary}\n"));
    }
    out
}

pub fn request(request: &ConnectionRequest, requester_name: &str) -> String {
    let mut out = format!(
        "{} [{}] {}\n  {}\n",
        requester_name,
        request.id,
        status_label(request.status),
        requester_headline(&request.requester)
    );
    if let Some(message) = request.message.as_deref().filter(|m| !m.is_empty()) {
        out.push_str(&format!("  Message: {message}\n"));
    }
    if let Some(created_at) = request.created_at {
        out.push_str(&format!(
            "  Received {}\n",
            format_received_at(&created_at.with_timezone(&Local))
        ));
    }
    out
}

pub fn chat(chat: &Chat, me: Option<&CurrentUser>, now: DateTime<Utc>) -> String {
    let other = me.and_then(|user| other_participant(chat, &user.id));
    let mut line = format!("{} [{}]", participant_label(other), chat.id);
    if let Some(at) = chat.last_message_at {
        line.push_str(&format!(
            "  {}",
            format_last_message_time(&at.with_timezone(&Local), &now.with_timezone(&Local))
        ));
    }
    line
}

pub fn message(message: &ChatMessage, me: Option<&CurrentUser>) -> String {
    let author = match me {
        Some(user) if is_own_message(message, &user.id) => "me",
        _ => message.sender.username.as_deref().unwrap_or("them"),
    };
    match message.created_at {
        Some(at) => format!(
            "[{}] {author}: {}",
            format_message_time(&at.with_timezone(&Local)),
            message.content
        ),
        None => format!("{author}: {}", message.content),
    }
}

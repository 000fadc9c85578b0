use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{
    chat::{ChatList, ChatWindow, SendOutcome},
    directory::{display_name, Query, Settle},
    profile_draft::ProfileWizard,
    requests::{RequestList, RespondOutcome},
    session::{decode_token_claims, USER_DATA_FAILURE_FALLBACK},
    CurrentUser, DirectoryController, FileTokenStore, RestClient, Session, TokenStore,
};
use shared::domain::{ChatId, RequestId, Weekday};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, parse_api_url, Settings};

#[derive(Parser, Debug)]
#[command(name = "skillswap", about = "SkillSwap command-line client")]
struct Cli {
    /// Config file to read instead of ./skillswap.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend base url, e.g. http://localhost:5000/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SKILLSWAP_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    /// One page of the public profile directory.
    Profiles {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Interactive directory: type to search, `:n`/`:p`/`:<page>` to page,
    /// `:r` to retry, `:q` to quit.
    Browse,
    Requests,
    Accept {
        request_id: String,
    },
    Reject {
        request_id: String,
    },
    Chats,
    Messages {
        chat_id: String,
    },
    Send {
        chat_id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    CreateProfile {
        #[arg(long)]
        fullname: String,
        #[arg(long, default_value = "")]
        headline: String,
        #[arg(long, default_value = "")]
        about: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        public_email: String,
        /// Comma separated weekdays, e.g. Monday,Friday
        #[arg(long, value_delimiter = ',')]
        available: Vec<String>,
        #[arg(long)]
        public: bool,
    },
}

struct App {
    settings: Settings,
    client: Arc<RestClient>,
    session: Arc<Session>,
}

impl App {
    fn new(settings: Settings) -> Result<Self> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&settings.token_path));
        let client = Arc::new(
            RestClient::with_timeout(&settings.base_url()?, settings.request_timeout(), tokens.clone())
                .context("failed to build http client")?,
        );
        let session = Session::new(client.clone(), tokens);
        Ok(Self {
            settings,
            client,
            session,
        })
    }

    async fn require_user(&self) -> Result<CurrentUser> {
        match self.session.restore().await {
            Some(user) => Ok(user),
            None => bail!("not signed in; run `skillswap login` first"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        settings.api_url = parse_api_url(api_url)?.into();
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = App::new(settings)?;
    if let Err(err) = run(&app, cli.command).await {
        error!("{err:#}");
        return Err(err);
    }
    Ok(())
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = app.session.login(&email, &password).await?;
            println!(
                "signed in as {}",
                user.username.as_deref().or(user.email.as_deref()).unwrap_or(user.id.as_str())
            );
        }
        Command::Logout => {
            app.session.logout().await;
            println!("signed out");
        }
        Command::Whoami => {
            let user = app.require_user().await?;
            println!("id: {}", user.id);
            if let Some(username) = &user.username {
                println!("username: {username}");
            }
            if let Some(email) = &user.email {
                println!("email: {email}");
            }
            if let Ok(claims) = decode_token_claims(&user.token) {
                if let Some(exp) = claims.exp.and_then(|exp| chrono::DateTime::from_timestamp(exp, 0)) {
                    println!("token expires: {exp}");
                }
            }
            match app.session.dashboard_profile(app.client.as_ref()).await {
                Ok(profile) => {
                    println!("profile: {} [{}]", display_name(&profile), profile.id);
                    if let Some(headline) = profile.headline.as_deref().filter(|h| !h.is_empty()) {
                        println!("headline: {headline}");
                    }
                }
                Err(err) => println!("{}", err.display_message(USER_DATA_FAILURE_FALLBACK)),
            }
        }
        Command::Profiles { search, page } => {
            let controller = DirectoryController::new(app.client.clone(), app.settings.directory());
            let query = Query {
                page: page.max(1),
                search_term: search.trim().to_string(),
                page_size: app.settings.page_size,
            };
            controller.load(query).await;
            print!("{}", render::directory(&controller.view()));
        }
        Command::Browse => browse(app).await?,
        Command::Requests => {
            app.require_user().await?;
            let list = RequestList::new(app.client.clone(), app.client.clone());
            list.refresh().await?;
            let names = list.requester_names().await;
            let requests = list.requests().await;
            if requests.is_empty() {
                println!("No requests received");
            }
            for (request, (_, name)) in requests.iter().zip(names) {
                print!("{}", render::request(request, &name));
            }
        }
        Command::Accept { request_id } => respond(app, RequestId::new(request_id), true).await?,
        Command::Reject { request_id } => respond(app, RequestId::new(request_id), false).await?,
        Command::Chats => {
            let user = app.require_user().await?;
            let list = ChatList::new(app.client.clone());
            let chats = list.refresh().await?;
            if chats.is_empty() {
                println!("No conversations yet");
            }
            let now = Utc::now();
            for chat in &chats {
                println!("{}", render::chat(chat, Some(&user), now));
            }
        }
        Command::Messages { chat_id } => {
            let user = app.require_user().await?;
            let window = ChatWindow::new(app.client.clone(), ChatId::new(chat_id));
            for message in window.refresh().await? {
                println!("{}", render::message(&message, Some(&user)));
            }
        }
        Command::Send { chat_id, text } => {
            let user = app.require_user().await?;
            let window = ChatWindow::new(app.client.clone(), ChatId::new(chat_id));
            window.set_draft(text.join(" ")).await;
            match window.send().await? {
                SendOutcome::Sent(message) => println!("{}", render::message(&message, Some(&user))),
                SendOutcome::Ignored => bail!("message is empty"),
            }
        }
        Command::CreateProfile {
            fullname,
            headline,
            about,
            location,
            public_email,
            available,
            public,
        } => {
            app.require_user().await?;
            let mut wizard = ProfileWizard::new();
            let draft = wizard.draft_mut();
            draft.fullname = fullname;
            draft.headline = headline;
            draft.about_me = about;
            draft.location = location;
            draft.public_email = public_email;
            draft.is_profile_public = public;
            for day in &available {
                draft.availability.insert(parse_weekday(day)?);
            }
            while !wizard.is_last_step() {
                if !wizard.next_step() {
                    bail!("step {} is incomplete: {}", wizard.step().number(), wizard.step().title());
                }
            }
            let message = wizard
                .submit(app.client.as_ref(), app.session.as_ref())
                .await?;
            println!("{message}");
        }
    }
    Ok(())
}

async fn respond(app: &App, request_id: RequestId, accept: bool) -> Result<()> {
    app.require_user().await?;
    let list = RequestList::new(app.client.clone(), app.client.clone());
    list.refresh().await?;
    let outcome = if accept {
        list.accept(&request_id).await?
    } else {
        list.reject(&request_id).await?
    };
    match outcome {
        RespondOutcome::Updated(status) => println!("request {request_id} {}", status.as_str()),
        RespondOutcome::NotActionable => bail!("request {request_id} is not pending"),
        RespondOutcome::Busy => bail!("another request update is still running"),
    }
    Ok(())
}

fn parse_weekday(raw: &str) -> Result<Weekday> {
    let raw = raw.trim();
    Weekday::ALL
        .into_iter()
        .find(|day| day.as_str().eq_ignore_ascii_case(raw))
        .with_context(|| format!("unknown weekday '{raw}'"))
}

/// Reads stdin line by line and feeds the directory controller, printing the
/// view each time it changes.
async fn browse(app: &App) -> Result<()> {
    let controller = DirectoryController::new(app.client.clone(), app.settings.directory());
    let mut views = controller.subscribe();

    let printer = tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            if !view.is_busy() {
                println!("{}", render::directory(&view));
            }
        }
    });

    controller.mount().await;
    println!("type to search; :n next, :p previous, :<page>, :r retry, :q quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = line.strip_prefix(':') else {
            controller.on_search_term_change(line.trim()).await;
            continue;
        };
        let current = controller.view().current_page;
        match command.trim() {
            "q" => break,
            "r" => {
                if controller.on_retry().await == Some(Settle::Stale) {
                    println!("a newer request is already running");
                }
            }
            "n" => page_to(&controller, current + 1).await,
            "p" => page_to(&controller, current.saturating_sub(1)).await,
            other => match other.parse::<u32>() {
                Ok(page) => page_to(&controller, page).await,
                Err(_) => println!("unknown command ':{other}'"),
            },
        }
    }

    printer.abort();
    Ok(())
}

async fn page_to(controller: &Arc<DirectoryController>, page: u32) {
    if !controller.on_page_change(page).await {
        println!("page {page} is not available right now");
    }
}

//! Command dispatch. A closed command enum maps to handler values through a
//! registration table populated once at startup; handlers that mutate
//! ownership-sensitive state are wrapped behind auth, which resolves the
//! configured current user exactly once before invocation.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use anyhow::Context;
use clap::Subcommand;
use thiserror::Error;

use crate::config::Config;
use crate::store::{Store, StoreError, User};

pub mod agg;
pub mod feed;
pub mod follow;
pub mod user;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Set the current user (must already be registered)
    Login { name: String },
    /// Create a user and log in as it
    Register { name: String },
    /// Delete all users; feeds, follows and posts go with them
    Reset,
    /// List users, marking the current one
    Users,
    /// Run the fetch loop, e.g. `agg 1m`
    Agg { interval: String },
    /// Register a feed and follow it
    Addfeed { name: String, url: String },
    /// List all feeds with their owners
    Feeds,
    /// Follow an already-registered feed by URL
    Follow { url: String },
    /// List the feeds the current user follows
    Following,
    /// Stop following a feed by URL
    Unfollow { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Login,
    Register,
    Reset,
    Users,
    Agg,
    Addfeed,
    Feeds,
    Follow,
    Following,
    Unfollow,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Login { .. } => CommandKind::Login,
            Command::Register { .. } => CommandKind::Register,
            Command::Reset => CommandKind::Reset,
            Command::Users => CommandKind::Users,
            Command::Agg { .. } => CommandKind::Agg,
            Command::Addfeed { .. } => CommandKind::Addfeed,
            Command::Feeds => CommandKind::Feeds,
            Command::Follow { .. } => CommandKind::Follow,
            Command::Following => CommandKind::Following,
            Command::Unfollow { .. } => CommandKind::Unfollow,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            CommandKind::Login => "login",
            CommandKind::Register => "register",
            CommandKind::Reset => "reset",
            CommandKind::Users => "users",
            CommandKind::Agg => "agg",
            CommandKind::Addfeed => "addfeed",
            CommandKind::Feeds => "feeds",
            CommandKind::Follow => "follow",
            CommandKind::Following => "following",
            CommandKind::Unfollow => "unfollow",
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("resolving current user: {0}")]
    Auth(#[source] StoreError),
}

/// Session state threaded through every handler.
pub struct State<S> {
    pub store: S,
    pub cfg: Config,
}

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>;

/// A command handler. `Authed` handlers receive the resolved current user
/// and never run in an unauthenticated state.
pub enum Handler<S> {
    Open(for<'a> fn(&'a mut State<S>, Command) -> HandlerFuture<'a>),
    Authed(for<'a> fn(&'a mut State<S>, User, Command) -> HandlerFuture<'a>),
}

pub struct Registry<S> {
    handlers: HashMap<CommandKind, Handler<S>>,
}

impl<S: Store> Registry<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler, overwriting any prior one for the same command.
    pub fn register(&mut self, kind: CommandKind, handler: Handler<S>) {
        self.handlers.insert(kind, handler);
    }

    pub async fn run(&self, state: &mut State<S>, cmd: Command) -> anyhow::Result<()> {
        let name = cmd.name();
        let handler = self
            .handlers
            .get(&cmd.kind())
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

        let result = match handler {
            Handler::Open(f) => f(state, cmd).await,
            Handler::Authed(f) => match resolve_user(state).await {
                Ok(user) => f(state, user, cmd).await,
                Err(err) => Err(err.into()),
            },
        };
        result.with_context(|| format!("running {name} command"))
    }
}

async fn resolve_user<S: Store>(state: &State<S>) -> Result<User, DispatchError> {
    let Some(name) = state.cfg.current_user() else {
        return Err(DispatchError::NotLoggedIn);
    };
    match state.store.get_user(name).await {
        Ok(user) => Ok(user),
        Err(StoreError::NotFound) => Err(DispatchError::NotLoggedIn),
        Err(err) => Err(DispatchError::Auth(err)),
    }
}

pub fn default_registry<S: Store>() -> Registry<S> {
    let mut registry = Registry::new();
    registry.register(CommandKind::Login, Handler::Open(user::login));
    registry.register(CommandKind::Register, Handler::Open(user::register));
    registry.register(CommandKind::Reset, Handler::Open(user::reset));
    registry.register(CommandKind::Users, Handler::Open(user::users));
    registry.register(CommandKind::Agg, Handler::Authed(agg::agg));
    registry.register(CommandKind::Addfeed, Handler::Authed(feed::addfeed));
    registry.register(CommandKind::Feeds, Handler::Open(feed::feeds));
    registry.register(CommandKind::Follow, Handler::Authed(follow::follow));
    registry.register(CommandKind::Following, Handler::Authed(follow::following));
    registry.register(CommandKind::Unfollow, Handler::Authed(follow::unfollow));
    registry
}

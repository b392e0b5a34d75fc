use anyhow::bail;

use super::{Command, HandlerFuture, State};
use crate::store::{Store, StoreError};

pub fn login<S: Store>(state: &mut State<S>, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Login { name } = cmd else {
            bail!("login: unexpected arguments");
        };
        match state.store.get_user(&name).await {
            Ok(user) => {
                state.cfg.set_user(&user.name)?;
                println!("Current user set to {}", user.name);
                Ok(())
            }
            Err(StoreError::NotFound) => {
                bail!("user {name} does not exist, use `register {name}` to create it")
            }
            Err(err) => Err(err.into()),
        }
    })
}

pub fn register<S: Store>(state: &mut State<S>, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Register { name } = cmd else {
            bail!("register: unexpected arguments");
        };
        let user = match state.store.create_user(&name).await {
            Ok(user) => user,
            Err(StoreError::Conflict { .. }) => bail!("user {name} already exists"),
            Err(err) => return Err(err.into()),
        };
        state.cfg.set_user(&user.name)?;
        println!("Current user set to {}", user.name);
        println!("id         -> {}", user.id);
        println!("created at -> {}", user.created_at);
        println!("name       -> {}", user.name);
        Ok(())
    })
}

pub fn reset<S: Store>(state: &mut State<S>, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Reset = cmd else {
            bail!("reset: unexpected arguments");
        };
        state.store.reset_users().await?;
        println!("users table cleared");
        Ok(())
    })
}

pub fn users<S: Store>(state: &mut State<S>, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Users = cmd else {
            bail!("users: unexpected arguments");
        };
        let users = state.store.list_users().await?;
        for user in users {
            if state.cfg.current_user() == Some(user.name.as_str()) {
                println!("* {} (current)", user.name);
            } else {
                println!("* {}", user.name);
            }
        }
        Ok(())
    })
}

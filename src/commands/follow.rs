use anyhow::bail;

use super::{Command, HandlerFuture, State};
use crate::store::{Store, StoreError, User};

pub fn follow<S: Store>(state: &mut State<S>, user: User, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Follow { url } = cmd else {
            bail!("follow: unexpected arguments");
        };
        let feed_id = match state.store.feed_id_by_url(&url).await {
            Ok(id) => id,
            Err(StoreError::NotFound) => bail!("no feed registered with url {url}"),
            Err(err) => return Err(err.into()),
        };
        let follow = match state.store.create_feed_follow(user.id, feed_id).await {
            Ok(follow) => follow,
            Err(StoreError::Conflict { .. }) => bail!("already following {url}"),
            Err(err) => return Err(err.into()),
        };
        println!("{} followed by {}", follow.feed_name, follow.user_name);
        Ok(())
    })
}

pub fn following<S: Store>(state: &mut State<S>, user: User, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Following = cmd else {
            bail!("following: unexpected arguments");
        };
        let follows = state.store.follows_for_user(user.id).await?;
        if follows.is_empty() {
            println!("{} is not following any feeds", user.name);
            return Ok(());
        }
        for follow in follows {
            println!("* {}", follow.feed_name);
        }
        Ok(())
    })
}

pub fn unfollow<S: Store>(state: &mut State<S>, user: User, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Unfollow { url } = cmd else {
            bail!("unfollow: unexpected arguments");
        };
        let feed_id = match state.store.feed_id_by_url(&url).await {
            Ok(id) => id,
            Err(StoreError::NotFound) => bail!("no feed registered with url {url}"),
            Err(err) => return Err(err.into()),
        };
        match state.store.delete_follow(user.id, feed_id).await {
            Ok(()) => {
                println!("{} unfollowed {}", user.name, url);
                Ok(())
            }
            Err(StoreError::NotFound) => bail!("{} is not following {url}", user.name),
            Err(err) => Err(err.into()),
        }
    })
}

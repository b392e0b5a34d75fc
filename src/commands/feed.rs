use anyhow::bail;
use url::Url;

use super::{Command, HandlerFuture, State};
use crate::store::{Store, StoreError, User};

pub fn addfeed<S: Store>(state: &mut State<S>, user: User, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Addfeed { name, url } = cmd else {
            bail!("addfeed: unexpected arguments");
        };
        // friendly error before DB I/O
        if Url::parse(&url).is_err() {
            bail!("invalid URL: {url}");
        }
        let feed = match state.store.create_feed(&name, &url, user.id).await {
            Ok(feed) => feed,
            Err(StoreError::Conflict { .. }) => bail!("a feed with url {url} already exists"),
            Err(err) => return Err(err.into()),
        };
        // registering a feed also subscribes its creator
        state.store.create_feed_follow(user.id, feed.id).await?;
        println!("{} ({}) registered by {}", feed.name, feed.url, user.name);
        Ok(())
    })
}

pub fn feeds<S: Store>(state: &mut State<S>, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Feeds = cmd else {
            bail!("feeds: unexpected arguments");
        };
        let feeds = state.store.list_feeds().await?;
        if feeds.is_empty() {
            println!("no feeds registered yet");
            return Ok(());
        }
        for feed in feeds {
            let owner = state.store.get_user_by_id(feed.user_id).await?;
            println!("* {} ({}) owned by {}", feed.name, feed.url, owner.name);
        }
        Ok(())
    })
}

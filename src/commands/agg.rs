use anyhow::bail;

use super::{Command, HandlerFuture, State};
use crate::ingestion::FeedFetcher;
use crate::scheduler;
use crate::store::{Store, User};
use crate::util::time::parse_interval;

/// `agg <interval>` — validate the interval, then hand over to the
/// scheduler loop. Runs until the process is interrupted.
pub fn agg<S: Store>(state: &mut State<S>, _user: User, cmd: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        let Command::Agg { interval } = cmd else {
            bail!("agg: unexpected arguments");
        };
        let every = parse_interval(&interval)?;
        let fetcher = FeedFetcher::new()?;
        scheduler::run(&state.store, &fetcher, every).await
    })
}

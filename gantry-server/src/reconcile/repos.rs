//! Periodic repo refresher
//!
//! Re-syncs every registered repo on a fixed wall-clock interval, one repo
//! at a time. A failure on one repo is logged and the tick moves on to the
//! next. Ticks never overlap: a slow tick delays the next one.

use std::future::Future;
use std::time::Duration;

use gantry_client::RepoSyncClient;
use gantry_core::domain::repo::Repo;
use sqlx::PgPool;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::service::repo_service;

/// Background loop that keeps repo commit/hash tracking fresh.
pub struct RepoRefresher {
    pool: PgPool,
    sync: RepoSyncClient,
    interval: Duration,
}

impl RepoRefresher {
    pub fn new(pool: PgPool, sync: RepoSyncClient, interval: Duration) -> Self {
        Self {
            pool,
            sync,
            interval,
        }
    }

    /// Runs the refresh loop forever.
    pub async fn run(&self) {
        info!("Starting repo refresher (interval: {:?})", self.interval);

        let mut ticker = time::interval(self.interval);
        // A tick that overruns the interval delays the next tick instead of
        // bunching duplicates behind it.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.refresh_once().await {
                Ok(synced) => debug!("Refresh tick complete, {} repo(s) synced", synced),
                Err(e) => error!("Failed to list repos for refresh: {:?}", e),
            }
        }
    }

    /// Performs a single refresh tick. Returns the number of repos synced.
    async fn refresh_once(&self) -> Result<usize, repo_service::RepoError> {
        let repos = repo_service::list_repos(&self.pool).await?;

        Ok(sync_each(repos, |repo| async move {
            repo_service::sync_repo(&self.pool, &self.sync, repo.id)
                .await
                .map(|_| ())
        })
        .await)
    }
}

/// Sync repos sequentially, isolating failures: an error on one repo is
/// logged and the remaining repos still get their turn. Returns the number
/// of successful syncs.
async fn sync_each<F, Fut, E>(repos: Vec<Repo>, mut sync_one: F) -> usize
where
    F: FnMut(Repo) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Debug,
{
    let mut synced = 0;

    for repo in repos {
        let id = repo.id;
        let url = repo.url.clone();

        match sync_one(repo).await {
            Ok(()) => synced += 1,
            Err(e) => {
                error!("Failed to sync repo {} ({}): {:?}", id, url, e);
                continue;
            }
        }
    }

    synced
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn repo(url: &str) -> Repo {
        let now = chrono::Utc::now();
        Repo {
            id: Uuid::new_v4(),
            url: url.to_string(),
            commit: String::new(),
            hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_failure_on_one_repo_does_not_abort_the_tick() {
        let repos = vec![repo("git@x/a"), repo("git@x/b"), repo("git@x/c")];
        let mut attempted = Vec::new();

        let synced = sync_each(repos, |r| {
            attempted.push(r.url.clone());
            let fail = r.url == "git@x/b";
            async move {
                if fail { Err("sync failed") } else { Ok(()) }
            }
        })
        .await;

        assert_eq!(synced, 2);
        assert_eq!(attempted, vec!["git@x/a", "git@x/b", "git@x/c"]);
    }

    #[tokio::test]
    async fn test_empty_repo_list_is_a_noop() {
        let synced = sync_each(Vec::new(), |_| async { Ok::<(), ()>(()) }).await;
        assert_eq!(synced, 0);
    }
}

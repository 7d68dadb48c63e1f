use crate::backend::BackendClient;
use crate::models::{CurrentUser, NotificationRecord};
use crate::reconcile::deduplicate;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// Reconciled view of the activity feed as of the last successful fetch.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub notifications: Vec<NotificationRecord>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub revision: u64,
}

impl Snapshot {
    pub fn find(&self, id: i64) -> Option<&NotificationRecord> {
        self.notifications.iter().find(|record| record.id == id)
    }
}

/// Single writer, many readers. Subscribers are woken on every replace.
#[derive(Debug)]
pub struct NotificationStore {
    tx: watch::Sender<Snapshot>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Reconciles the raw feed and publishes it as the next revision.
    pub fn replace(&self, records: Vec<NotificationRecord>) -> u64 {
        let notifications = deduplicate(records);
        let mut revision = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.notifications = notifications;
            snapshot.fetched_at = Some(Utc::now());
            revision = snapshot.revision;
        });
        revision
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub store: Arc<NotificationStore>,
    pub user: Option<Arc<CurrentUser>>,
}

impl AppState {
    pub fn new(backend: BackendClient, user: Option<CurrentUser>) -> Self {
        Self {
            backend: Arc::new(backend),
            store: Arc::new(NotificationStore::new()),
            user: user.map(Arc::new),
        }
    }

    /// Pulls the full feed again. On failure the previous snapshot stays.
    pub async fn refresh(&self) -> Snapshot {
        match self.backend.fetch_activity().await {
            Ok(records) => {
                let revision = self.store.replace(records);
                info!(revision, "notifications refreshed");
            }
            Err(err) => error!("failed to fetch notifications: {err}"),
        }
        self.store.snapshot()
    }
}

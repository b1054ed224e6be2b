//! In-memory collections bridged to persistent storage.
//!
//! Each store owns one collection behind a `RwLock` (single writer per
//! collection, concurrent readers) plus the shared [`Storage`] handle.
//! Mutations apply the core operation to a working copy, persist it, and
//! only then swap the copy in - persist-then-confirm. A failed write
//! leaves memory and disk untouched and surfaces as a storage error.

use crate::account::Account;
use crate::error::{Error, Result};
use crate::storage::Storage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use summit_core::{
    compute_ranking, Completion, CompletionIdGen, CompletionState, Demon, DemonEdit,
    LeaderboardRow, MoveOutcome, PositionRecord, RankedList,
};
use tokio::sync::RwLock;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// --- Ranked list ---

/// The demon list, loaded from storage at startup.
pub struct ListStore {
    list: RwLock<RankedList>,
    storage: Arc<Storage>,
}

impl ListStore {
    /// Load the list from storage; an empty database yields an empty list.
    pub fn load(storage: Arc<Storage>) -> Result<Self> {
        let list = RankedList::from_demons(storage.load_demons()?);
        Ok(Self {
            list: RwLock::new(list),
            storage,
        })
    }

    /// All demons, ascending by position.
    pub async fn demons(&self) -> Vec<Demon> {
        self.list
            .read()
            .await
            .demons()
            .into_iter()
            .cloned()
            .collect()
    }

    /// A demon's position history.
    pub async fn history(&self, id: &str) -> Result<Vec<PositionRecord>> {
        let list = self.list.read().await;
        Ok(list.history_of(id)?.to_vec())
    }

    /// Current position of the demon with the given display name.
    pub async fn position_of_name(&self, name: &str) -> Option<u32> {
        self.list
            .read()
            .await
            .find_by_name(name)
            .map(|d| d.position)
    }

    /// Insert a demon at a position, persisting the cascaded shifts.
    pub async fn insert(&self, demon: Demon, position: u32) -> Result<()> {
        let mut guard = self.list.write().await;
        let mut working = guard.clone();
        working.insert(demon, position)?;
        self.persist(&working, &[])?;
        *guard = working;
        Ok(())
    }

    /// Move a demon to a new position. A no-op move skips persistence.
    pub async fn move_to(&self, id: &str, new_position: u32) -> Result<MoveOutcome> {
        let mut guard = self.list.write().await;
        let mut working = guard.clone();
        let outcome = working.move_to(id, new_position)?;
        if matches!(outcome, MoveOutcome::Unchanged) {
            return Ok(outcome);
        }
        self.persist(&working, &[])?;
        *guard = working;
        Ok(outcome)
    }

    /// Update a demon's non-position fields.
    pub async fn edit(&self, id: &str, edit: DemonEdit) -> Result<Demon> {
        let mut guard = self.list.write().await;
        let mut working = guard.clone();
        let updated = working.edit(id, edit)?.clone();
        self.persist(&working, &[])?;
        *guard = working;
        Ok(updated)
    }

    /// Remove a demon, closing the rank gap.
    pub async fn remove(&self, id: &str) -> Result<Demon> {
        let mut guard = self.list.write().await;
        let mut working = guard.clone();
        let removed = working.remove(id)?;
        self.persist(&working, &[&removed.id])?;
        *guard = working;
        Ok(removed)
    }

    /// Fold completions into the leaderboard against a consistent snapshot
    /// of the list.
    pub async fn ranking(&self, completions: &[Completion]) -> Vec<LeaderboardRow> {
        let list = self.list.read().await;
        compute_ranking(completions, &list)
    }

    fn persist(&self, list: &RankedList, removed: &[&str]) -> Result<()> {
        self.storage.commit_demons(&list.demons(), removed)
    }
}

// --- Completions ---

struct CompletionLog {
    completions: Vec<Completion>,
    ids: CompletionIdGen,
}

/// The completion set plus the id generator, loaded from storage.
pub struct CompletionStore {
    inner: RwLock<CompletionLog>,
    storage: Arc<Storage>,
}

impl CompletionStore {
    /// Load completions from storage, ordered by id (ids are
    /// time-ordered), and resume the id generator past the highest one.
    pub fn load(storage: Arc<Storage>) -> Result<Self> {
        let mut completions = storage.load_completions()?;
        completions.sort_by_key(|c| c.id.parse::<u64>().unwrap_or(0));
        let last_id = completions
            .iter()
            .filter_map(|c| c.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Ok(Self {
            inner: RwLock::new(CompletionLog {
                completions,
                ids: CompletionIdGen::starting_after(last_id),
            }),
            storage,
        })
    }

    /// All completions, oldest first.
    pub async fn all(&self) -> Vec<Completion> {
        self.inner.read().await.completions.clone()
    }

    /// Record a new pending completion with a server-assigned id.
    pub async fn submit(&self, user: String, demon: String, evidence: String) -> Result<Completion> {
        let mut guard = self.inner.write().await;
        let id = guard.ids.next_id(now_millis());
        let completion = Completion::new(id, user, demon, evidence);
        self.storage.put_completion(&completion)?;
        guard.completions.push(completion.clone());
        Ok(completion)
    }

    /// Drive a completion to `target`, enforcing the workflow's permitted
    /// transitions.
    ///
    /// A fresh approval snapshots the demon's current position and fails
    /// with not-found if the demon has left the list, so every newly
    /// approved completion is scorable forever after.
    pub async fn transition(
        &self,
        id: &str,
        target: CompletionState,
        list: &ListStore,
    ) -> Result<Completion> {
        let mut guard = self.inner.write().await;
        let index = guard
            .completions
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::NotFound(format!("completion {}", id)))?;

        let mut working = guard.completions[index].clone();
        match target {
            CompletionState::Approved => {
                let snapshot = if working.state == CompletionState::Pending
                    && working.position_at_approval.is_none()
                {
                    let position = list.position_of_name(&working.demon).await.ok_or_else(|| {
                        Error::NotFound(format!("demon named {}", working.demon))
                    })?;
                    Some(position)
                } else {
                    None
                };
                working.approve(snapshot)?;
            }
            CompletionState::Rejected => working.reject()?,
            CompletionState::Invalidated => working.invalidate()?,
            CompletionState::Pending => {
                return Err(Error::Core(summit_core::Error::InvalidTransition(
                    "cannot return a completion to pending".to_string(),
                )))
            }
        }

        self.storage.put_completion(&working)?;
        guard.completions[index] = working.clone();
        Ok(working)
    }
}

// --- Accounts ---

/// Registered accounts, keyed by username.
pub struct AccountStore {
    accounts: RwLock<HashMap<String, Account>>,
    storage: Arc<Storage>,
}

impl AccountStore {
    /// Load accounts from storage.
    pub fn load(storage: Arc<Storage>) -> Result<Self> {
        let accounts = storage
            .load_accounts()?
            .into_iter()
            .map(|a| (a.username.clone(), a))
            .collect();
        Ok(Self {
            accounts: RwLock::new(accounts),
            storage,
        })
    }

    /// Register a new account.
    pub async fn register(&self, account: Account) -> Result<()> {
        let mut guard = self.accounts.write().await;
        if guard.contains_key(&account.username) {
            return Err(Error::Duplicate(format!("account {}", account.username)));
        }
        self.storage.put_account(&account)?;
        guard.insert(account.username.clone(), account);
        Ok(())
    }

    /// Verify credentials. Wrong credentials and banned accounts are both
    /// forbidden; the distinction only shows in the message.
    pub async fn login(&self, username: &str, password: &str) -> Result<Account> {
        let guard = self.accounts.read().await;
        let account = guard
            .get(username)
            .filter(|a| a.password == password)
            .ok_or_else(|| Error::Forbidden("wrong username or password".to_string()))?;
        if account.banned {
            return Err(Error::Forbidden("account suspended".to_string()));
        }
        Ok(account.clone())
    }

    /// Ban or unban an account.
    pub async fn set_banned(&self, username: &str, banned: bool) -> Result<Account> {
        let mut guard = self.accounts.write().await;
        let account = guard
            .get(username)
            .ok_or_else(|| Error::NotFound(format!("account {}", username)))?;

        let mut working = account.clone();
        working.banned = banned;
        self.storage.put_account(&working)?;
        guard.insert(username.to_string(), working.clone());
        Ok(working)
    }

    /// All accounts, ordered by username.
    pub async fn all(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn demon(id: &str, name: &str) -> Demon {
        Demon::new(id.to_string(), name.to_string())
    }

    #[tokio::test]
    async fn list_survives_reload() {
        let dir = tempdir().unwrap();
        {
            let storage = Arc::new(Storage::open(dir.path()).unwrap());
            let store = ListStore::load(Arc::clone(&storage)).unwrap();
            store.insert(demon("a", "Alpha"), 1).await.unwrap();
            store.insert(demon("b", "Beta"), 1).await.unwrap();
            store.move_to("a", 1).await.unwrap();
        }

        let storage = Arc::new(Storage::open(dir.path()).unwrap());
        let store = ListStore::load(storage).unwrap();
        let demons = store.demons().await;
        assert_eq!(demons.len(), 2);
        assert_eq!(demons[0].id, "a");
        assert_eq!(demons[1].id, "b");
        // History of the shifts survived too.
        assert_eq!(store.history("a").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn remove_is_persisted() {
        let dir = tempdir().unwrap();
        {
            let storage = Arc::new(Storage::open(dir.path()).unwrap());
            let store = ListStore::load(Arc::clone(&storage)).unwrap();
            store.insert(demon("a", "Alpha"), 1).await.unwrap();
            store.insert(demon("b", "Beta"), 2).await.unwrap();
            store.remove("a").await.unwrap();
        }

        let storage = Arc::new(Storage::open(dir.path()).unwrap());
        let store = ListStore::load(storage).unwrap();
        let demons = store.demons().await;
        assert_eq!(demons.len(), 1);
        assert_eq!(demons[0].id, "b");
        assert_eq!(demons[0].position, 1);
    }

    #[tokio::test]
    async fn approval_snapshots_and_later_moves_do_not_rescore() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(Storage::open(dir.path()).unwrap());
        let lists = ListStore::load(Arc::clone(&storage)).unwrap();
        let completions = CompletionStore::load(Arc::clone(&storage)).unwrap();

        for (i, name) in ["One", "Two", "Three", "Four", "Five"].into_iter().enumerate() {
            lists
                .insert(demon(&name.to_lowercase(), name), i as u32 + 1)
                .await
                .unwrap();
        }

        let submitted = completions
            .submit("alice".into(), "Five".into(), "proof".into())
            .await
            .unwrap();
        let approved = completions
            .transition(&submitted.id, CompletionState::Approved, &lists)
            .await
            .unwrap();
        assert_eq!(approved.position_at_approval, Some(5));

        let points_before = lists.ranking(&completions.all().await).await[0].points;

        // Moving the demon to the top must not change the scored points.
        lists.move_to("five", 1).await.unwrap();
        let ranking = lists.ranking(&completions.all().await).await;
        assert_eq!(ranking[0].points, points_before);
    }

    #[tokio::test]
    async fn approving_against_a_missing_demon_fails() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(Storage::open(dir.path()).unwrap());
        let lists = ListStore::load(Arc::clone(&storage)).unwrap();
        let completions = CompletionStore::load(Arc::clone(&storage)).unwrap();

        let submitted = completions
            .submit("alice".into(), "Gone".into(), "proof".into())
            .await
            .unwrap();
        let err = completions
            .transition(&submitted.id, CompletionState::Approved, &lists)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        // Still pending, still unsnapshotted.
        let all = completions.all().await;
        assert_eq!(all[0].state, CompletionState::Pending);
        assert_eq!(all[0].position_at_approval, None);
    }

    #[tokio::test]
    async fn submitted_ids_are_unique_and_ordered() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(Storage::open(dir.path()).unwrap());
        let completions = CompletionStore::load(storage).unwrap();

        let a = completions
            .submit("a".into(), "X".into(), "p".into())
            .await
            .unwrap();
        let b = completions
            .submit("b".into(), "X".into(), "p".into())
            .await
            .unwrap();
        assert!(a.id.parse::<u64>().unwrap() < b.id.parse::<u64>().unwrap());
    }

    #[tokio::test]
    async fn account_lifecycle() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(Storage::open(dir.path()).unwrap());
        let accounts = AccountStore::load(storage).unwrap();

        accounts
            .register(Account::new("alice".into(), "pw".into(), "user".into()))
            .await
            .unwrap();
        let err = accounts
            .register(Account::new("alice".into(), "other".into(), "user".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));

        assert!(accounts.login("alice", "pw").await.is_ok());
        assert!(matches!(
            accounts.login("alice", "wrong").await,
            Err(Error::Forbidden(_))
        ));

        accounts.set_banned("alice", true).await.unwrap();
        assert!(matches!(
            accounts.login("alice", "pw").await,
            Err(Error::Forbidden(_))
        ));
    }
}

//! Search-screen state: the latest search outcome, observable by the UI.
//!
//! Every call to [`RecipeSearch::search`] takes a new generation number.
//! When a later search (or [`RecipeSearch::clear`]) has started before an
//! earlier one finishes, the earlier result is discarded instead of
//! overwriting the newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::fetch::client::RecipeFetcher;
use crate::fetch::response::RecipeCandidate;
use crate::recipe::{save_candidate, RecipeId, SaveError, ValidationError};
use crate::store::RecipeStore;

/// What the search screen should show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Found(RecipeCandidate),
    Failed(String),
}

/// Latest-search-wins wrapper around a [`RecipeFetcher`].
pub struct RecipeSearch {
    fetcher: Arc<dyn RecipeFetcher>,
    generation: AtomicU64,
    state_tx: watch::Sender<SearchState>,
}

impl RecipeSearch {
    pub fn new(fetcher: Arc<dyn RecipeFetcher>) -> Self {
        let (state_tx, _) = watch::channel(SearchState::Idle);
        Self {
            fetcher,
            generation: AtomicU64::new(0),
            state_tx,
        }
    }

    /// Observe the search state; the current value is available immediately.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state_tx.borrow().clone()
    }

    /// Run one search for `query`.
    ///
    /// Returns the state this search produced, or `None` when its result
    /// was discarded because a newer search or a clear superseded it.
    pub async fn search(&self, query: &str) -> Option<SearchState> {
        let query = query.trim();
        if query.is_empty() {
            let failed = SearchState::Failed(ValidationError::BlankQuery.to_string());
            self.state_tx.send_modify(|state| {
                self.generation.fetch_add(1, Ordering::SeqCst);
                *state = failed.clone();
            });
            return Some(failed);
        }

        let mut ticket = 0;
        self.state_tx.send_modify(|state| {
            ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SearchState::Loading {
                query: query.to_string(),
            };
        });

        let outcome = match self.fetcher.fetch_recipe(query).await {
            Ok(candidate) => SearchState::Found(candidate),
            Err(e) => {
                log::warn!("search: {query:?} failed: {e}");
                SearchState::Failed(e.to_string())
            }
        };

        let applied = self.state_tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *state = outcome.clone();
            true
        });

        if applied {
            Some(outcome)
        } else {
            log::debug!("search: discarding superseded result for {query:?}");
            None
        }
    }

    /// Persist the currently found candidate.  `Ok(None)` when there is
    /// nothing to save.
    pub async fn save_result(&self, store: &dyn RecipeStore) -> Result<Option<RecipeId>, SaveError> {
        let candidate = match self.state() {
            SearchState::Found(candidate) => candidate,
            _ => return Ok(None),
        };
        save_candidate(store, &candidate).await.map(Some)
    }

    /// Return to `Idle`, discarding any in-flight result.
    pub fn clear(&self) {
        self.state_tx.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = SearchState::Idle;
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

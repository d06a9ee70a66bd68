//! Prompts page: prompt list plus local edits.
//!
//! Saved edits live only in this view. The backend has no write endpoint,
//! so a remount (page reload) or restart loses them.

use crate::api::adapters::{performance_history, revise_prompt};
use crate::api::{ApiClient, PerformancePoint, Prompt};
use crate::poller::{Cadence, PollState, Poller, PollerHandle};

use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct PromptsView {
    client: ApiClient,
    list: RwLock<PollerHandle<Vec<Prompt>>>,
    /// Latest saved revision per prompt id.
    edits: RwLock<HashMap<String, Prompt>>,
}

impl PromptsView {
    pub fn mount(client: ApiClient) -> Self {
        let list = RwLock::new(Self::load(client.clone()));
        Self {
            client,
            list,
            edits: RwLock::new(HashMap::new()),
        }
    }

    fn load(client: ApiClient) -> PollerHandle<Vec<Prompt>> {
        Poller::new("prompts", Cadence::Once).spawn(move || {
            let client = client.clone();
            async move { client.try_list_prompts().await }
        })
    }

    /// Refetch the list and discard saved edits.
    pub async fn refresh(&self) {
        let next = Self::load(self.client.clone());
        *self.list.write().await = next;
        self.edits.write().await.clear();
    }

    /// Wait for the current list fetch.
    pub async fn list_loaded(&self) -> Option<PollState<Vec<Prompt>>> {
        let mut rx = self.list.read().await.subscribe();
        let state = rx.wait_for(|s| !s.loading).await.ok()?;
        Some(state.clone())
    }

    async fn fetched(&self, id: &str) -> Option<Prompt> {
        self.list
            .read()
            .await
            .snapshot()
            .data?
            .into_iter()
            .find(|p| p.id == id)
    }

    /// The fetched list with saved edits applied.
    pub async fn state(&self) -> PollState<Vec<Prompt>> {
        let mut state = self.list.read().await.snapshot();
        let edits = self.edits.read().await;
        if let Some(prompts) = state.data.as_mut() {
            for prompt in prompts.iter_mut() {
                if let Some(edited) = edits.get(&prompt.id) {
                    *prompt = edited.clone();
                }
            }
        }
        state
    }

    pub async fn get(&self, id: &str) -> Option<Prompt> {
        if let Some(edited) = self.edits.read().await.get(id) {
            return Some(edited.clone());
        }
        self.fetched(id).await
    }

    /// Save `text` as the next version of prompt `id`.
    pub async fn save(&self, id: &str, text: &str) -> Option<Prompt> {
        let mut edits = self.edits.write().await;

        let current = match edits.get(id) {
            Some(edited) => edited.clone(),
            None => self.fetched(id).await?,
        };

        let revised = revise_prompt(&current, text, &mut rand::thread_rng());
        tracing::info!("Prompts: saved {} as version {}", id, revised.version);
        edits.insert(id.to_string(), revised.clone());
        Some(revised)
    }

    pub async fn history(&self, id: &str) -> Option<Vec<PerformancePoint>> {
        self.get(id).await.map(|p| performance_history(&p))
    }

    pub async fn is_stopped(&self) -> bool {
        self.list.read().await.is_stopped()
    }

    pub async fn unmount(&self) {
        self.list.read().await.stop();
    }
}

//! Agents page: the agent list and the detail pane for the selected agent.

use crate::api::{Agent, AgentDetails, ApiClient};
use crate::poller::{Cadence, PollState, Poller, PollerHandle};

use serde::Serialize;
use tokio::sync::RwLock;

/// The detail pane owns its own one-shot poller. Replacing the selection
/// drops it, which tears the fetch down.
struct Selection {
    agent: Agent,
    details: PollerHandle<AgentDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentsState {
    pub list: PollState<Vec<Agent>>,
    pub selected: Option<Agent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentDetailState {
    pub agent: Agent,
    pub details: PollState<AgentDetails>,
}

/// Agent list, fetched once per mount. `refresh` remounts it.
pub struct AgentsView {
    client: ApiClient,
    list: RwLock<PollerHandle<Vec<Agent>>>,
    selected: RwLock<Option<Selection>>,
}

impl AgentsView {
    pub fn mount(client: ApiClient) -> Self {
        let list = RwLock::new(Self::load(client.clone()));
        Self {
            client,
            list,
            selected: RwLock::new(None),
        }
    }

    fn load(client: ApiClient) -> PollerHandle<Vec<Agent>> {
        Poller::new("agents", Cadence::Once).spawn(move || {
            let client = client.clone();
            async move { client.try_list_agents().await }
        })
    }

    pub async fn state(&self) -> AgentsState {
        AgentsState {
            list: self.list.read().await.snapshot(),
            selected: self.selected.read().await.as_ref().map(|s| s.agent.clone()),
        }
    }

    /// Refetch the list and drop the selection with its detail fetch.
    pub async fn refresh(&self) {
        let next = Self::load(self.client.clone());
        *self.list.write().await = next;
        *self.selected.write().await = None;
    }

    /// Wait for the current list fetch.
    pub async fn list_loaded(&self) -> Option<PollState<Vec<Agent>>> {
        let mut rx = self.list.read().await.subscribe();
        let state = rx.wait_for(|s| !s.loading).await.ok()?;
        Some(state.clone())
    }

    /// Select an agent by id and start loading its details.
    ///
    /// Re-selecting the current agent keeps the detail fetch already made.
    /// Returns `None` for an id that is not in the list.
    pub async fn select(&self, id: &str) -> Option<AgentDetailState> {
        let agent = self
            .list
            .read()
            .await
            .snapshot()
            .data?
            .into_iter()
            .find(|a| a.id == id)?;

        let mut selected = self.selected.write().await;
        if let Some(current) = selected.as_ref() {
            if current.agent.id == agent.id {
                return Some(AgentDetailState {
                    agent: current.agent.clone(),
                    details: current.details.snapshot(),
                });
            }
        }

        tracing::debug!("Agents: selected {}", agent.id);
        let client = self.client.clone();
        let agent_id = agent.id.clone();
        let details = Poller::new("agent-detail", Cadence::Once).spawn(move || {
            let client = client.clone();
            let agent_id = agent_id.clone();
            async move { client.try_fetch_agent_details(&agent_id).await }
        });

        let state = AgentDetailState {
            agent: agent.clone(),
            details: details.snapshot(),
        };
        *selected = Some(Selection { agent, details });
        Some(state)
    }

    /// Detail pane state for the current selection.
    pub async fn detail(&self) -> Option<AgentDetailState> {
        self.selected.read().await.as_ref().map(|s| AgentDetailState {
            agent: s.agent.clone(),
            details: s.details.snapshot(),
        })
    }

    /// Wait for the selected agent's details.
    pub async fn detail_loaded(&self) -> Option<AgentDetailState> {
        let (agent, mut rx) = {
            let selected = self.selected.read().await;
            let s = selected.as_ref()?;
            (s.agent.clone(), s.details.subscribe())
        };
        let details = rx.wait_for(|s| !s.loading).await.ok()?.clone();
        Some(AgentDetailState { agent, details })
    }

    pub async fn is_stopped(&self) -> bool {
        self.list.read().await.is_stopped()
    }

    pub async fn unmount(&self) {
        self.list.read().await.stop();
        *self.selected.write().await = None;
    }
}

//! Scripted collaborators shared by the engine integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rolecast_core::{
    ApiError, ApiResult, FetchError, FetchResult, GuildApi, MemberSnapshot, TargetSource,
};

pub const GUILD: &str = "1448975847657836668";
pub const ROLE: &str = "735479013522276412";

/// Scripted response for one call; calls without a script behave like a real guild.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    RateLimited(Option<Duration>),
    NotFound,
    Status(u16),
    /// Grant reports success without the role sticking.
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Grant(String),
    Member(String),
}

#[derive(Default)]
struct State {
    members: HashMap<String, HashSet<String>>,
    grant_script: HashMap<String, VecDeque<Step>>,
    member_script: HashMap<String, VecDeque<Step>>,
    calls: Vec<Call>,
}

/// In-memory guild with per-member scripted failures.
#[derive(Default)]
pub struct ScriptedGuild {
    state: Mutex<State>,
}

impl ScriptedGuild {
    pub fn with_members(ids: &[&str]) -> Self {
        let guild = Self::default();
        {
            let mut state = guild.lock();
            for id in ids {
                state.members.insert((*id).to_string(), HashSet::new());
            }
        }
        guild
    }

    pub fn script_grant(self, member: &str, steps: &[Step]) -> Self {
        self.lock()
            .grant_script
            .entry(member.to_string())
            .or_default()
            .extend(steps.iter().copied());
        self
    }

    pub fn script_member(self, member: &str, steps: &[Step]) -> Self {
        self.lock()
            .member_script
            .entry(member.to_string())
            .or_default()
            .extend(steps.iter().copied());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn grant_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Grant(_)))
            .count()
    }

    pub fn roles_of(&self, member: &str) -> Vec<String> {
        let mut roles: Vec<String> = self
            .lock()
            .members
            .get(member)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default();
        roles.sort();
        roles
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn scripted_error(operation: &'static str, step: Step) -> Option<ApiError> {
    match step {
        Step::RateLimited(retry_after) => Some(ApiError::RateLimited {
            operation,
            retry_after,
        }),
        Step::NotFound => Some(ApiError::NotFound { operation }),
        Step::Status(status) => Some(ApiError::Status { operation, status }),
        Step::Dropped => None,
    }
}

#[async_trait]
impl GuildApi for ScriptedGuild {
    async fn grant_role(&self, guild_id: &str, member_id: &str, role_id: &str) -> ApiResult<()> {
        assert_eq!(guild_id, GUILD);
        let mut state = self.lock();
        state.calls.push(Call::Grant(member_id.to_string()));
        let step = state
            .grant_script
            .get_mut(member_id)
            .and_then(VecDeque::pop_front);
        if let Some(step) = step {
            return match scripted_error("grant_role", step) {
                Some(err) => Err(err),
                None => Ok(()),
            };
        }
        match state.members.get_mut(member_id) {
            Some(roles) => {
                roles.insert(role_id.to_string());
                Ok(())
            }
            None => Err(ApiError::NotFound {
                operation: "grant_role",
            }),
        }
    }

    async fn member(&self, guild_id: &str, member_id: &str) -> ApiResult<MemberSnapshot> {
        assert_eq!(guild_id, GUILD);
        let mut state = self.lock();
        state.calls.push(Call::Member(member_id.to_string()));
        let step = state
            .member_script
            .get_mut(member_id)
            .and_then(VecDeque::pop_front);
        if let Some(err) = step.and_then(|step| scripted_error("member", step)) {
            return Err(err);
        }
        state
            .members
            .get(member_id)
            .map(|roles| MemberSnapshot {
                member_id: member_id.to_string(),
                roles: roles.iter().cloned().collect(),
            })
            .ok_or(ApiError::NotFound {
                operation: "member",
            })
    }
}

/// Source that returns fixed text, or a fixed status error.
pub struct StaticSource {
    body: Result<String, u16>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn text(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            body: Err(status),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn lines(ids: &[&str]) -> Self {
        Self::text(&ids.join("\n"))
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetSource for StaticSource {
    async fn fetch_raw(&self, source_id: &str) -> FetchResult<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.body {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(FetchError::Status {
                url: format!("memory://{source_id}"),
                status: *status,
            }),
        }
    }
}

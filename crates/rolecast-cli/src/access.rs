//! Actor allow-list gate that produces the pre-authorized flag for a run.

use rolecast_config::AccessConfig;

/// Allow-lists consulted before a run starts.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActorGate {
    user_ids: Vec<String>,
    role_ids: Vec<String>,
}

impl ActorGate {
    pub(crate) fn from_config(access: &AccessConfig) -> Self {
        Self {
            user_ids: access.allowed_user_ids.clone(),
            role_ids: access.allowed_role_ids.clone(),
        }
    }

    /// No allow-list configured: whoever holds the bot token is trusted.
    pub(crate) const fn is_open(&self) -> bool {
        self.user_ids.is_empty() && self.role_ids.is_empty()
    }

    /// Listed users pass, as does anyone holding a listed role.
    pub(crate) fn permits(&self, actor_id: Option<&str>, actor_roles: &[String]) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(actor_id) = actor_id else {
            return false;
        };
        self.user_ids.iter().any(|id| id == actor_id)
            || actor_roles
                .iter()
                .any(|role| self.role_ids.iter().any(|allowed| allowed == role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ActorGate {
        ActorGate::from_config(&AccessConfig {
            allowed_user_ids: vec!["388931035607597057".to_string()],
            allowed_role_ids: vec!["735479013522276412".to_string()],
        })
    }

    #[test]
    fn listed_users_pass_without_roles() {
        assert!(gate().permits(Some("388931035607597057"), &[]));
    }

    #[test]
    fn any_listed_role_passes() {
        let roles = vec!["1".to_string(), "735479013522276412".to_string()];
        assert!(gate().permits(Some("999999999999999999"), &roles));
    }

    #[test]
    fn unknown_or_anonymous_actors_are_rejected() {
        assert!(!gate().permits(Some("999999999999999999"), &["1".to_string()]));
        assert!(!gate().permits(None, &["735479013522276412".to_string()]));
    }

    #[test]
    fn empty_allow_lists_leave_the_gate_open() {
        let gate = ActorGate::default();
        assert!(gate.is_open());
        assert!(gate.permits(None, &[]));
    }
}

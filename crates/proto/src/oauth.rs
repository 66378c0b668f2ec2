use serde::{Deserialize, Serialize};

/// Client-local record of one in-flight OAuth authorization.
///
/// Lives only while the callback is awaited; correlation otherwise rides on
/// the callback URL itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSession {
    /// Connector being linked.
    pub connector_id: String,
    /// `state` value the backend embedded in the authorize URL (may be empty).
    pub state: String,
    /// Callback URL handed to the backend as `redirect_to`.
    pub redirect_target: String,
}

impl OAuthSession {
    /// Returns `true` when `received` is compatible with this session.
    ///
    /// Only enforced when both sides carry a non-empty state.
    pub fn accepts_state(&self, received: Option<&str>) -> bool {
        match received.filter(|s| !s.is_empty()) {
            Some(received) if !self.state.is_empty() => received == self.state,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(state: &str) -> OAuthSession {
        OAuthSession {
            connector_id: "jira".to_string(),
            state: state.to_string(),
            redirect_target: "http://127.0.0.1:9009/oauth/callback?connector_id=jira".to_string(),
        }
    }

    #[test]
    fn accepts_matching_state() {
        assert!(session("abc").accepts_state(Some("abc")));
        assert!(!session("abc").accepts_state(Some("xyz")));
    }

    #[test]
    fn skips_check_when_either_side_is_empty() {
        assert!(session("").accepts_state(Some("xyz")));
        assert!(session("abc").accepts_state(None));
        assert!(session("abc").accepts_state(Some("")));
    }
}

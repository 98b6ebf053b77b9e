//! Route-access guard
//!
//! The guard is a pure function: every navigation request maps to exactly
//! one [`NavigationDecision`], with no I/O and no mutation. Side effects
//! (actually switching the displayed view) belong to the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Path of the login view
pub const LOGIN_PATH: &str = "/login";

/// Query key carrying the originally requested path through a login redirect
pub const REDIRECT_QUERY_KEY: &str = "redirect";

/// Query key used by token-based re-authentication flows
pub const TOKEN_QUERY_KEY: &str = "token";

/// A navigation attempt: target path plus its query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    pub path: String,
    #[serde(default)]
    pub query: HashMap<String, String>,
}

impl NavigationRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: HashMap::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

/// Outcome of the guard for a single navigation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NavigationDecision {
    Proceed,
    RedirectTo {
        path: String,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        query: HashMap<String, String>,
    },
}

impl NavigationDecision {
    pub fn redirect(path: impl Into<String>) -> Self {
        Self::RedirectTo {
            path: path.into(),
            query: HashMap::new(),
        }
    }

    pub fn redirect_with(
        path: impl Into<String>,
        query: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self::RedirectTo {
            path: path.into(),
            query: query.into_iter().collect(),
        }
    }
}

/// Decide whether a navigation may proceed.
///
/// Rules, in order:
/// 1. Any path other than the login path requires an authenticated session;
///    unauthenticated requests are redirected to login with the attempted
///    path preserved in the `redirect` query key.
/// 2. The login path is reachable while unauthenticated, and also while
///    authenticated when a `token` query parameter is present (so token
///    re-authentication can complete); otherwise an authenticated visit to
///    login bounces back to the root.
pub fn decide(request: &NavigationRequest, is_logged_in: bool) -> NavigationDecision {
    if request.path != LOGIN_PATH {
        if is_logged_in {
            return NavigationDecision::Proceed;
        }
        return NavigationDecision::redirect_with(
            LOGIN_PATH,
            [(REDIRECT_QUERY_KEY.to_string(), request.path.clone())],
        );
    }

    if is_logged_in {
        if request.query.contains_key(TOKEN_QUERY_KEY) {
            return NavigationDecision::Proceed;
        }
        return NavigationDecision::redirect("/");
    }

    NavigationDecision::Proceed
}

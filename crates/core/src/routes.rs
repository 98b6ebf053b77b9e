//! Dashboard route table and unmatched-route fallback
//!
//! The table mirrors the navigable surface of the dashboard: devices,
//! sessions, firewall rules, SSH keys, and settings. Resolution maps a
//! concrete path to a named view plus any bound `:param` segments; what a
//! view name renders is the caller's concern.

use crate::kv::KeyValueStore;
use crate::navigation::{NavigationDecision, NavigationRequest, decide};
use std::collections::HashMap;

/// Key of the persisted flag written when an unknown path is hit
pub const UNKNOWN_ROUTE_FLAG: &str = "flag";

#[derive(Debug, Clone, Copy)]
struct Route {
    name: &'static str,
    pattern: &'static str,
    /// Name of the route to resolve to instead, for section index paths
    redirect: Option<&'static str>,
}

/// Section index entries come before their default child so the redirect
/// is what a bare section path resolves through.
const ROUTES: &[Route] = &[
    Route {
        name: "dashboard",
        pattern: "/",
        redirect: None,
    },
    Route {
        name: "devices",
        pattern: "/devices",
        redirect: Some("list_devices"),
    },
    Route {
        name: "list_devices",
        pattern: "/devices",
        redirect: None,
    },
    Route {
        name: "pending_devices",
        pattern: "/devices/pending",
        redirect: None,
    },
    Route {
        name: "rejected_devices",
        pattern: "/devices/rejected",
        redirect: None,
    },
    Route {
        name: "details_device",
        pattern: "/device/:id",
        redirect: None,
    },
    Route {
        name: "sessions",
        pattern: "/sessions",
        redirect: Some("list_sessions"),
    },
    Route {
        name: "list_sessions",
        pattern: "/sessions",
        redirect: None,
    },
    Route {
        name: "details_session",
        pattern: "/session/:id",
        redirect: None,
    },
    Route {
        name: "login",
        pattern: "/login",
        redirect: None,
    },
    Route {
        name: "firewalls",
        pattern: "/firewall/rules",
        redirect: Some("list_firewalls"),
    },
    Route {
        name: "list_firewalls",
        pattern: "/firewall/rules",
        redirect: None,
    },
    Route {
        name: "public_keys",
        pattern: "/sshkeys/public_keys",
        redirect: Some("list_public_keys"),
    },
    Route {
        name: "list_public_keys",
        pattern: "/sshkeys/public_keys",
        redirect: None,
    },
    Route {
        name: "settings",
        pattern: "/settings",
        redirect: Some("profile_settings"),
    },
    Route {
        name: "profile_settings",
        pattern: "/settings/profile",
        redirect: None,
    },
    Route {
        name: "namespace_settings",
        pattern: "/settings/namespace-manager",
        redirect: None,
    },
    Route {
        name: "private_keys_settings",
        pattern: "/settings/private_keys",
        redirect: None,
    },
    Route {
        name: "billing_settings",
        pattern: "/settings/billing",
        redirect: None,
    },
];

/// A resolved route: the view name to render and any bound path parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: &'static str,
    pub params: HashMap<String, String>,
}

/// The dashboard route table
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTable;

impl RouteTable {
    /// Resolve a path to a named view, following section redirects.
    ///
    /// Returns `None` for paths outside the table; callers hand those to
    /// [`UnmatchedRouteHandler`].
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let (route, params) = ROUTES
            .iter()
            .find_map(|route| match_pattern(route.pattern, path).map(|p| (route, p)))?;

        let name = match route.redirect {
            Some(target) => target,
            None => route.name,
        };
        Some(RouteMatch { name, params })
    }

    /// Run one navigation step: unknown paths take the side-effecting
    /// fallback, known paths go through the access guard. A returned
    /// redirect is itself a fresh request the caller feeds back in.
    pub fn navigate(
        &self,
        request: &NavigationRequest,
        is_logged_in: bool,
        flags: &dyn KeyValueStore,
    ) -> NavigationDecision {
        if self.resolve(&request.path).is_none() {
            return UnmatchedRouteHandler::new(flags).handle();
        }
        decide(request, is_logged_in)
    }
}

/// Fallback for paths outside the route table: records that the app hit an
/// unknown path, then sends the navigation back to the root.
pub struct UnmatchedRouteHandler<'a> {
    flags: &'a dyn KeyValueStore,
}

impl<'a> UnmatchedRouteHandler<'a> {
    pub fn new(flags: &'a dyn KeyValueStore) -> Self {
        Self { flags }
    }

    /// The flag write happens before the decision is returned; its reader
    /// lives outside this crate.
    pub fn handle(&self) -> NavigationDecision {
        self.flags.set(UNKNOWN_ROUTE_FLAG, true);
        NavigationDecision::redirect("/")
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.trim_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = HashMap::new();
    for (pat, seg) in pattern_segments.iter().zip(&path_segments) {
        if let Some(param) = pat.strip_prefix(':') {
            if seg.is_empty() {
                return None;
            }
            params.insert(param.to_string(), (*seg).to_string());
        } else if pat != seg {
            return None;
        }
    }
    Some(params)
}

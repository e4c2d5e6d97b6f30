use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{NavLink, UserRecord};

// --- Static Routing Surface ---

/// PAGE_ROUTES
///
/// Canonical display names of every protected page and the route that serves it.
/// Page grants are written against these names by the people provisioning users,
/// so lookups are case-insensitive. Adding a protected page means adding a row here.
pub const PAGE_ROUTES: &[(&str, &str)] = &[
    ("Dashboard", "/"),
    ("Hot Coil", "/batchcode/hot-coil"),
    ("Recoiler", "/batchcode/recoiler"),
    ("Pipe Mill", "/batchcode/pipe-mill"),
    ("QC Lab", "/batchcode/qc-lab"),
    ("Laddle Checklist", "/batchcode/laddle-checklist"),
    ("Tundish Checklist", "/batchcode/tundish-checklist"),
    ("Patching Checklist", "/batchcode/patching-checklist"),
    ("Calendar", "/calendar"),
];

/// SystemArea
///
/// A coarse system grant that owns a mounted area of the application. The area
/// root is a multi-tab container whose content is picked with `?tab=<name>` on
/// the dashboard root.
#[derive(Debug, Clone, Copy)]
pub struct SystemArea {
    pub name: &'static str,
    pub root: &'static str,
}

/// Systems with a mounted area. Other system names ("o2d", "lead-to-order") are
/// kept on the user but never address a route here.
pub const SYSTEM_AREAS: &[SystemArea] = &[SystemArea {
    name: "batchcode",
    root: "/batchcode",
}];

pub const ROOT_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
const DASHBOARD_PAGE: &str = "Dashboard";

/// lookup_page_route
///
/// Case-insensitive lookup of a page display name in `PAGE_ROUTES`.
pub fn lookup_page_route(name: &str) -> Option<&'static str> {
    let name = name.trim();
    PAGE_ROUTES
        .iter()
        .find(|(page, _)| page.eq_ignore_ascii_case(name))
        .map(|(_, route)| *route)
}

/// page_catalogue
///
/// The full page table as wire-ready links, in table order.
pub fn page_catalogue() -> Vec<NavLink> {
    PAGE_ROUTES
        .iter()
        .map(|(name, route)| NavLink {
            name: name.to_string(),
            route: route.to_string(),
        })
        .collect()
}

// --- Validated Access Model ---

/// Role
///
/// Classification of the free-text role label. Any label containing "admin"
/// (case-insensitive) is an administrator and bypasses every other check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Standard,
}

impl Role {
    pub fn classify(label: &str) -> Self {
        if label.to_lowercase().contains("admin") {
            Role::Admin
        } else {
            Role::Standard
        }
    }
}

/// RouteTarget
///
/// A route split into its normalized path and the dashboard tab it selects.
/// `/?tab=batchcode` and `/` are different addresses: the first names one tab
/// of the root container, the second the container itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    /// Path without query, without trailing `/`; never empty.
    pub path: String,
    /// Value of the `tab` query parameter, if any.
    pub tab: Option<String>,
}

impl RouteTarget {
    pub fn parse(raw: &str) -> Self {
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };

        let trimmed = path.trim_end_matches('/');
        let path = if trimmed.is_empty() {
            ROOT_PATH.to_string()
        } else {
            trimmed.to_string()
        };

        let tab = query.and_then(|query| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("tab="))
                .map(str::to_string)
        });

        Self { path, tab }
    }

    /// True for `/` and every system area root.
    pub fn is_system_root(&self) -> bool {
        self.path == ROOT_PATH || SYSTEM_AREAS.iter().any(|area| area.root == self.path)
    }

    /// The tab only addresses content on a system root; elsewhere it is ignored.
    pub fn dashboard_tab(&self) -> Option<&str> {
        if self.is_system_root() {
            self.tab.as_deref()
        } else {
            None
        }
    }

    /// Equal to `route` or a sub-route of it (`route` + "/...").
    fn is_under(&self, route: &str) -> bool {
        self.path == route
            || self
                .path
                .strip_prefix(route)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Whether a granted route authorizes this requested route.
    fn covered_by(&self, granted: &RouteTarget) -> bool {
        match granted.dashboard_tab() {
            Some(tab) => self.path == granted.path && self.dashboard_tab() == Some(tab),
            None => self.is_under(&granted.path),
        }
    }
}

impl SystemArea {
    /// Whether `requested` lies in this area: the bare root, the root tab named
    /// after the system, or anything under the area root.
    fn addresses(&self, requested: &RouteTarget) -> bool {
        if requested.path == ROOT_PATH {
            return match requested.tab.as_deref() {
                Some(tab) => tab == self.name,
                None => true,
            };
        }
        requested.is_under(self.root)
    }
}

/// PageGrant
///
/// One entry of a user's page grant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGrant {
    /// The entry as written, trimmed.
    pub raw: String,
    /// The route the entry stands for. For unmapped names this is `raw` itself.
    pub route: String,
    /// Parsed route; `None` when the entry is an unmapped page name.
    pub target: Option<RouteTarget>,
}

impl PageGrant {
    pub fn resolve(entry: &str) -> Self {
        let raw = entry.trim().to_string();
        let route = if raw.starts_with('/') {
            Some(raw.clone())
        } else {
            lookup_page_route(&raw).map(str::to_string)
        };

        match route {
            Some(route) => Self {
                target: Some(RouteTarget::parse(&route)),
                route,
                raw,
            },
            // Unmapped names can never equal a path, so they never authorize anything.
            None => Self {
                route: raw.clone(),
                target: None,
                raw,
            },
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.target.is_some()
    }

    fn covers(&self, requested: &RouteTarget) -> bool {
        self.target
            .as_ref()
            .is_some_and(|granted| requested.covered_by(granted))
    }

    /// Whether the granted page sits inside the container at `root`.
    fn lies_within(&self, root: &str) -> bool {
        self.target.as_ref().is_some_and(|granted| granted.is_under(root))
    }
}

/// UserAccess
///
/// The validated form of a `UserRecord`: role classification, the set of coarse
/// system grants and the ordered list of page grants. Built once at the
/// authentication boundary; the resolver functions below only ever see this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccess {
    pub role: Role,
    pub role_label: String,
    pub systems: BTreeSet<String>,
    /// Grant order is significant for landing-route selection.
    pub pages: Vec<PageGrant>,
}

impl UserAccess {
    /// Builds access from already-selected raw strings.
    pub fn new(role_label: &str, system_access: &str, page_access: &str) -> Self {
        let systems = system_access
            .split(',')
            .map(|entry| {
                entry
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|entry| !entry.is_empty())
            .collect();

        let pages = page_access
            .split(',')
            .filter(|entry| !entry.trim().is_empty())
            .map(PageGrant::resolve)
            .collect();

        Self {
            role: Role::classify(role_label),
            role_label: role_label.to_string(),
            systems,
            pages,
        }
    }

    /// from_record
    ///
    /// Validates a raw directory record. `userType` wins over `role`, and
    /// `page_access` over the legacy `user_access`, whenever the preferred field
    /// is non-empty. Unmapped page names are kept (they authorize nothing) and
    /// reported, since they usually mean a typo in the provisioning data.
    pub fn from_record(record: &UserRecord) -> Self {
        let role_label = non_empty(record.user_type.as_deref())
            .or_else(|| non_empty(record.role.as_deref()))
            .unwrap_or_default();
        let page_access = non_empty(record.page_access.as_deref())
            .or_else(|| non_empty(record.user_access.as_deref()))
            .unwrap_or_default();

        let access = Self::new(
            role_label,
            record.system_access.as_deref().unwrap_or_default(),
            page_access,
        );

        for grant in access.pages.iter().filter(|grant| !grant.is_mapped()) {
            tracing::warn!(
                user_id = %record.id,
                grant = %grant.raw,
                "Page grant matches no known page and no route; it will never authorize a path"
            );
        }

        access
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn has_grants(&self) -> bool {
        !self.systems.is_empty() || !self.pages.is_empty()
    }

    pub fn holds_system(&self, name: &str) -> bool {
        self.systems.contains(name)
    }

    fn system_match(&self, requested: &RouteTarget) -> bool {
        SYSTEM_AREAS
            .iter()
            .any(|area| self.holds_system(area.name) && area.addresses(requested))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// --- Resolver ---

/// is_admin_user
///
/// Absent users are never administrators.
pub fn is_admin_user(user: Option<&UserAccess>) -> bool {
    user.is_some_and(UserAccess::is_admin)
}

/// is_path_allowed
///
/// Decides whether `user` may open `path` (which may carry a `?tab=` suffix).
///
/// Evaluation order:
/// 1. Administrators are always allowed; users without any grant never are.
/// 2. Page grants are checked first. A match (exact, or a sub-route of the
///    granted route) allows, and so does a system root containing a granted
///    page. With page grants present, any other path that is not a system root
///    is denied outright.
/// 3. System grants then allow their area (see `SystemArea`).
/// 4. The dashboard root is open to anyone holding a page grant or a mounted
///    system area.
pub fn is_path_allowed(path: &str, user: Option<&UserAccess>) -> bool {
    let Some(user) = user else {
        return false;
    };
    if user.is_admin() {
        return true;
    }
    if !user.has_grants() {
        return false;
    }

    let requested = RouteTarget::parse(path);

    if !user.pages.is_empty() {
        if user.pages.iter().any(|grant| grant.covers(&requested)) {
            return true;
        }
        if requested.is_system_root()
            && user
                .pages
                .iter()
                .any(|grant| grant.lies_within(&requested.path))
        {
            return true;
        }
        if !requested.is_system_root() {
            return false;
        }
    }

    let system_match = user.system_match(&requested);

    if requested.path == ROOT_PATH && (system_match || !user.pages.is_empty()) {
        return true;
    }

    system_match
}

/// default_allowed_path
///
/// Picks the post-login landing route. The first page grant that resolves to a
/// route other than the root wins; then the first held system area's dashboard
/// tab; the root dashboard otherwise. Without a user the login page is returned.
pub fn default_allowed_path(user: Option<&UserAccess>) -> String {
    let Some(user) = user else {
        return LOGIN_PATH.to_string();
    };
    if user.is_admin() {
        return ROOT_PATH.to_string();
    }

    if let Some(grant) = user.pages.iter().find(|grant| grant.route != ROOT_PATH) {
        return grant.route.clone();
    }

    if let Some(area) = SYSTEM_AREAS
        .iter()
        .find(|area| user.holds_system(area.name))
    {
        return format!("{}?tab={}", ROOT_PATH, area.name);
    }

    if user
        .pages
        .iter()
        .any(|grant| grant.raw == DASHBOARD_PAGE || grant.raw == ROOT_PATH)
    {
        return ROOT_PATH.to_string();
    }

    ROOT_PATH.to_string()
}

/// allowed_navigation
///
/// The catalogue entries `user` may open, in table order. Used to hide sidebar
/// links the router would refuse anyway.
pub fn allowed_navigation(user: Option<&UserAccess>) -> Vec<NavLink> {
    page_catalogue()
        .into_iter()
        .filter(|link| is_path_allowed(&link.route, user))
        .collect()
}

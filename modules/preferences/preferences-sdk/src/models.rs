//! Public models for the preferences module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the preferences module and its consumers.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Granularity of a scope key, broadest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeLevel {
    Tenant,
    Group,
    User,
}

/// Identity of one preference record: `(tenant, group, user)`.
///
/// A zero `group_id` or `user_id` means "not this scope". At most one record
/// exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeKey {
    pub tenant_id: i64,
    pub group_id: i64,
    pub user_id: i64,
}

impl ScopeKey {
    #[must_use]
    pub fn new(tenant_id: i64, group_id: i64, user_id: i64) -> Self {
        Self {
            tenant_id,
            group_id,
            user_id,
        }
    }

    /// Tenant-wide scope, the broadest one.
    #[must_use]
    pub fn tenant(tenant_id: i64) -> Self {
        Self::new(tenant_id, 0, 0)
    }

    #[must_use]
    pub fn group(tenant_id: i64, group_id: i64) -> Self {
        Self::new(tenant_id, group_id, 0)
    }

    #[must_use]
    pub fn user(tenant_id: i64, user_id: i64) -> Self {
        Self::new(tenant_id, 0, user_id)
    }

    #[must_use]
    pub fn level(&self) -> ScopeLevel {
        if self.user_id != 0 {
            ScopeLevel::User
        } else if self.group_id != 0 {
            ScopeLevel::Group
        } else {
            ScopeLevel::Tenant
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tenant={}/group={}/user={}",
            self.tenant_id, self.group_id, self.user_id
        )
    }
}

/// Ordered scope selector used for resolution.
///
/// Groups are kept in the order the caller supplied them. Precedence is
/// ascending: the tenant layer is the weakest, each later group beats the
/// earlier ones, and the user layer is the strongest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeChain {
    pub tenant_id: i64,
    pub groups: Vec<i64>,
    pub user_id: i64,
}

impl ScopeChain {
    #[must_use]
    pub fn tenant(tenant_id: i64) -> Self {
        Self {
            tenant_id,
            groups: Vec::new(),
            user_id: 0,
        }
    }

    /// Appends groups after any already present; the last one wins ties.
    #[must_use]
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = i64>) -> Self {
        self.groups.extend(groups);
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Scope keys in ascending precedence order.
    ///
    /// Zero group ids are skipped, duplicates are yielded again at their
    /// position. The user key is only present when `user_id != 0`.
    pub fn layers(&self) -> impl Iterator<Item = ScopeKey> + '_ {
        let tenant = std::iter::once(ScopeKey::tenant(self.tenant_id));
        let groups = self
            .groups
            .iter()
            .filter(|id| **id != 0)
            .map(|id| ScopeKey::group(self.tenant_id, *id));
        let user = (self.user_id != 0).then(|| ScopeKey::user(self.tenant_id, self.user_id));
        tenant.chain(groups).chain(user)
    }
}

/// A single saved navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavLink {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavbarPreference {
    #[serde(default)]
    pub saved_items: Vec<NavLink>,
}

impl NavbarPreference {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved_items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryPreference {
    #[serde(default)]
    pub home_tab: String,
}

impl QueryHistoryPreference {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.home_tab.is_empty()
    }
}

/// Nested document of independently settable sub-fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceJsonData {
    #[serde(default)]
    pub navbar: NavbarPreference,
    #[serde(default)]
    pub query_history: QueryHistoryPreference,
}

impl PreferenceJsonData {
    /// `true` for the all-zero document, i.e. no sub-field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.navbar.is_empty() && self.query_history.is_empty()
    }
}

/// Stored preference record for exactly one scope key.
///
/// Empty strings and a zero `home_dashboard_id` mean "unset at this scope".
/// `version` starts at 0 and grows by one on every write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub scope: ScopeKey,
    pub theme: String,
    pub timezone: String,
    pub week_start: String,
    pub home_dashboard_id: i64,
    pub json_data: PreferenceJsonData,
    pub version: u64,
    pub created: OffsetDateTime,
    pub updated: OffsetDateTime,
}

/// Result of resolution: a record without scope or version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectivePreferences {
    pub theme: String,
    pub timezone: String,
    pub week_start: String,
    pub home_dashboard_id: i64,
    pub json_data: PreferenceJsonData,
}

/// Full field set for a replacing write.
///
/// Every field is written; anything left at its default clears the stored
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreferenceSave {
    pub theme: String,
    pub timezone: String,
    pub week_start: String,
    pub home_dashboard_id: i64,
    pub json_data: PreferenceJsonData,
}

/// Field-selective write. `None` leaves the stored value untouched, `Some`
/// overwrites it, including with an empty string or zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreferencePatch {
    pub theme: Option<String>,
    pub timezone: Option<String>,
    pub week_start: Option<String>,
    pub home_dashboard_id: Option<i64>,
    pub navbar: Option<NavbarPreference>,
    pub query_history: Option<QueryHistoryPreference>,
}

impl PreferencePatch {
    /// `true` when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.theme.is_none()
            && self.timezone.is_none()
            && self.week_start.is_none()
            && self.home_dashboard_id.is_none()
            && self.navbar.is_none()
            && self.query_history.is_none()
    }
}

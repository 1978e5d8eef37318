//! Admin permission levels and gating.
//!
//! Access to each back-office section ([`AdminModule`]) is one of four ordered
//! [`PermissionLevel`]s. An admin's level for a module comes from a static
//! per-role table ([`AdminRole::default_level`]), optionally overridden per user
//! by a [`PermissionMap`]. Addresses matching a [`SuperuserEmails`] pattern
//! bypass the check entirely.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{AdminRole, Email};

/// Ordered access tier: `None < View < Limited < Full`.
///
/// - `View` - read-only access
/// - `Limited` - may edit existing records (and move orders along)
/// - `Full` - may also create and delete
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    #[default]
    None,
    View,
    Limited,
    Full,
}

impl PermissionLevel {
    /// Whether this level is at least `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::View => "view",
            Self::Limited => "limited",
            Self::Full => "full",
        })
    }
}

impl FromStr for PermissionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "view" => Ok(Self::View),
            "limited" => Ok(Self::Limited),
            "full" => Ok(Self::Full),
            _ => Err(format!("invalid permission level: {s}")),
        }
    }
}

/// A gated back-office section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminModule {
    Dashboard,
    Products,
    Combos,
    Categories,
    Orders,
    Customers,
    Content,
    Banners,
    AdminUsers,
}

impl AdminModule {
    /// Every module, in navigation order.
    pub const ALL: [Self; 9] = [
        Self::Dashboard,
        Self::Products,
        Self::Combos,
        Self::Categories,
        Self::Orders,
        Self::Customers,
        Self::Content,
        Self::Banners,
        Self::AdminUsers,
    ];
}

impl AdminRole {
    /// Default level for `module`, before per-user overrides.
    #[must_use]
    pub const fn default_level(self, module: AdminModule) -> PermissionLevel {
        match (self, module) {
            (Self::SuperAdmin, _) => PermissionLevel::Full,
            (Self::Admin, AdminModule::AdminUsers) => PermissionLevel::View,
            (Self::Admin, AdminModule::Customers) => PermissionLevel::Limited,
            (Self::Admin, _) => PermissionLevel::Full,
            (Self::Viewer, AdminModule::AdminUsers) => PermissionLevel::None,
            (Self::Viewer, _) => PermissionLevel::View,
        }
    }
}

/// Per-user overrides of the role table.
///
/// Stored as a JSON object such as `{"orders": "full", "content": "none"}`.
/// Modules absent from the map fall back to the role default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<AdminModule, PermissionLevel>);

impl PermissionMap {
    /// Create an empty override map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set an override for `module`.
    pub fn set(&mut self, module: AdminModule, level: PermissionLevel) {
        self.0.insert(module, level);
    }

    /// Remove the override for `module`.
    pub fn unset(&mut self, module: AdminModule) {
        self.0.remove(&module);
    }

    /// The override for `module`, if any.
    #[must_use]
    pub fn get(&self, module: AdminModule) -> Option<PermissionLevel> {
        self.0.get(&module).copied()
    }

    /// Effective level: override if present, else the role default.
    #[must_use]
    pub fn level_for(&self, role: AdminRole, module: AdminModule) -> PermissionLevel {
        self.get(module)
            .unwrap_or_else(|| role.default_level(module))
    }

    /// Effective levels for every module.
    #[must_use]
    pub fn resolve(&self, role: AdminRole) -> BTreeMap<AdminModule, PermissionLevel> {
        AdminModule::ALL
            .iter()
            .map(|module| (*module, self.level_for(role, *module)))
            .collect()
    }
}

impl FromIterator<(AdminModule, PermissionLevel)> for PermissionMap {
    fn from_iter<I: IntoIterator<Item = (AdminModule, PermissionLevel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Errors parsing a superuser email pattern.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern is empty.
    #[error("superuser pattern cannot be empty")]
    Empty,
    /// The pattern is neither an address nor `*@domain`.
    #[error("invalid superuser pattern: {0}")]
    Invalid(String),
}

/// One superuser pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EmailPattern {
    /// `owner@larder.shop`
    Exact(String),
    /// `*@larder.shop`
    Domain(String),
}

/// Email patterns whose holders bypass every permission check.
///
/// Each pattern is either a full address or `*@domain`. Matching is
/// case-insensitive.
///
/// ```
/// use larder_core::Email;
/// use larder_core::permission::SuperuserEmails;
///
/// let patterns: SuperuserEmails = "owner@larder.shop, *@ops.larder.shop".parse().unwrap();
/// assert!(patterns.matches(&Email::parse("Owner@Larder.shop").unwrap()));
/// assert!(patterns.matches(&Email::parse("night@ops.larder.shop").unwrap()));
/// assert!(!patterns.matches(&Email::parse("someone@larder.shop").unwrap()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuperuserEmails(Vec<EmailPattern>);

impl SuperuserEmails {
    /// No bypass patterns.
    #[must_use]
    pub const fn none() -> Self {
        Self(Vec::new())
    }

    /// Whether `email` matches any pattern.
    #[must_use]
    pub fn matches(&self, email: &Email) -> bool {
        self.0.iter().any(|pattern| match pattern {
            EmailPattern::Exact(addr) => email.as_str() == addr,
            EmailPattern::Domain(domain) => email.domain() == domain,
        })
    }

    /// Number of configured patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no patterns are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for SuperuserEmails {
    type Err = PatternError;

    /// Parse a comma-separated list of patterns. Blank entries are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut patterns = Vec::new();

        for raw in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let pattern = if let Some(domain) = raw.strip_prefix("*@") {
                if domain.is_empty() || domain.contains('@') || domain.contains('*') {
                    return Err(PatternError::Invalid(raw.to_owned()));
                }
                EmailPattern::Domain(domain.to_lowercase())
            } else {
                let email =
                    Email::parse(raw).map_err(|_| PatternError::Invalid(raw.to_owned()))?;
                EmailPattern::Exact(email.into_inner())
            };
            patterns.push(pattern);
        }

        if patterns.is_empty() && !s.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        Ok(Self(patterns))
    }
}

/// The permission check used by every back-office handler.
#[derive(Debug, Clone, Default)]
pub struct PermissionGate {
    superusers: SuperuserEmails,
}

impl PermissionGate {
    /// Create a gate with the given bypass patterns.
    #[must_use]
    pub const fn new(superusers: SuperuserEmails) -> Self {
        Self { superusers }
    }

    /// Whether `email` bypasses all checks.
    #[must_use]
    pub fn is_superuser(&self, email: &Email) -> bool {
        self.superusers.matches(email)
    }

    /// Effective level of an admin for `module`.
    #[must_use]
    pub fn level(
        &self,
        email: &Email,
        role: AdminRole,
        overrides: &PermissionMap,
        module: AdminModule,
    ) -> PermissionLevel {
        if self.is_superuser(email) {
            return PermissionLevel::Full;
        }
        overrides.level_for(role, module)
    }

    /// Whether access at `required` level to `module` is granted.
    ///
    /// Granted iff the email matches a superuser pattern, or the effective
    /// level is at least `required`.
    #[must_use]
    pub fn allows(
        &self,
        email: &Email,
        role: AdminRole,
        overrides: &PermissionMap,
        module: AdminModule,
        required: PermissionLevel,
    ) -> bool {
        self.is_superuser(email) || overrides.level_for(role, module).satisfies(required)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LEVELS: [PermissionLevel; 4] = [
        PermissionLevel::None,
        PermissionLevel::View,
        PermissionLevel::Limited,
        PermissionLevel::Full,
    ];

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(PermissionLevel::None < PermissionLevel::View);
        assert!(PermissionLevel::View < PermissionLevel::Limited);
        assert!(PermissionLevel::Limited < PermissionLevel::Full);
    }

    #[test]
    fn test_gate_grants_iff_level_at_least_required() {
        let gate = PermissionGate::default();
        let who = email("staff@example.com");

        for (ui, user_level) in LEVELS.iter().enumerate() {
            let overrides: PermissionMap = [(AdminModule::Orders, *user_level)].into_iter().collect();
            for (ri, required) in LEVELS.iter().enumerate() {
                let granted = gate.allows(
                    &who,
                    AdminRole::Viewer,
                    &overrides,
                    AdminModule::Orders,
                    *required,
                );
                assert_eq!(granted, ui >= ri, "user {user_level} required {required}");
            }
        }
    }

    #[test]
    fn test_superuser_bypasses_everything() {
        let gate = PermissionGate::new("*@larder.shop".parse().unwrap());
        let owner = email("founder@larder.shop");
        let overrides: PermissionMap = AdminModule::ALL
            .iter()
            .map(|m| (*m, PermissionLevel::None))
            .collect();

        for module in AdminModule::ALL {
            for required in LEVELS {
                assert!(gate.allows(&owner, AdminRole::Viewer, &overrides, module, required));
            }
            assert_eq!(
                gate.level(&owner, AdminRole::Viewer, &overrides, module),
                PermissionLevel::Full
            );
        }
    }

    #[test]
    fn test_role_defaults() {
        assert_eq!(
            AdminRole::Viewer.default_level(AdminModule::Products),
            PermissionLevel::View
        );
        assert_eq!(
            AdminRole::Viewer.default_level(AdminModule::AdminUsers),
            PermissionLevel::None
        );
        assert_eq!(
            AdminRole::Admin.default_level(AdminModule::Products),
            PermissionLevel::Full
        );
        for module in AdminModule::ALL {
            assert_eq!(
                AdminRole::SuperAdmin.default_level(module),
                PermissionLevel::Full
            );
        }
    }

    #[test]
    fn test_override_can_lower_and_raise() {
        let mut overrides = PermissionMap::new();
        overrides.set(AdminModule::Products, PermissionLevel::None);
        overrides.set(AdminModule::Orders, PermissionLevel::Full);

        assert_eq!(
            overrides.level_for(AdminRole::Admin, AdminModule::Products),
            PermissionLevel::None
        );
        assert_eq!(
            overrides.level_for(AdminRole::Viewer, AdminModule::Orders),
            PermissionLevel::Full
        );
        assert_eq!(
            overrides.level_for(AdminRole::Viewer, AdminModule::Content),
            PermissionLevel::View
        );

        overrides.unset(AdminModule::Products);
        assert_eq!(
            overrides.level_for(AdminRole::Admin, AdminModule::Products),
            PermissionLevel::Full
        );
    }

    #[test]
    fn test_permission_map_json_shape() {
        let map: PermissionMap =
            serde_json::from_str(r#"{"orders": "full", "admin_users": "none"}"#).unwrap();
        assert_eq!(map.get(AdminModule::Orders), Some(PermissionLevel::Full));
        assert_eq!(map.get(AdminModule::AdminUsers), Some(PermissionLevel::None));
        assert_eq!(map.get(AdminModule::Content), None);
    }

    #[test]
    fn test_resolve_covers_every_module() {
        let resolved = PermissionMap::new().resolve(AdminRole::Admin);
        assert_eq!(resolved.len(), AdminModule::ALL.len());
    }

    #[test]
    fn test_superuser_pattern_parsing() {
        let patterns: SuperuserEmails = "owner@larder.shop, *@Ops.Larder.Shop,".parse().unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns.matches(&email("OWNER@larder.shop")));
        assert!(patterns.matches(&email("a@ops.larder.shop")));
        assert!(!patterns.matches(&email("a@larder.shop")));

        assert!(SuperuserEmails::from_str("").unwrap().is_empty());
        assert!(SuperuserEmails::from_str("*@").is_err());
        assert!(SuperuserEmails::from_str("not-an-email").is_err());
        assert_eq!(SuperuserEmails::from_str(" , "), Err(PatternError::Empty));
    }
}

//! Normalization options and configuration.

use super::role::{Role, StyleRules};
use std::fmt;
use std::str::FromStr;

/// Canonical Chinese paragraph indent: two fullwidth spaces.
pub const DEFAULT_TARGET_WIDTH: usize = 2;

/// Options for a normalization pass.
#[derive(Debug, Clone)]
pub struct IndentOptions {
    /// Number of fullwidth spaces to indent with (0 = de-indent)
    pub target_width: usize,

    /// Also normalize header and footer stories
    pub include_headers_footers: bool,

    /// Roles that receive indentation
    pub roles_to_indent: RoleSet,

    /// Style patterns for role classification
    pub style_rules: StyleRules,
}

impl IndentOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target width.
    pub fn with_target_width(mut self, width: usize) -> Self {
        self.target_width = width;
        self
    }

    /// Strip all leading whitespace instead of indenting.
    pub fn deindent(mut self) -> Self {
        self.target_width = 0;
        self
    }

    /// Enable or disable header/footer processing.
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }

    /// Narrow the set of roles that receive indentation.
    pub fn with_roles(mut self, roles: RoleSet) -> Self {
        self.roles_to_indent = roles;
        self
    }

    /// Set style rules.
    pub fn with_style_rules(mut self, rules: StyleRules) -> Self {
        self.style_rules = rules;
        self
    }
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            include_headers_footers: false,
            roles_to_indent: RoleSet::default(),
            style_rules: StyleRules::default(),
        }
    }
}

/// A subset of the indentable roles ({body, quote}).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    body: bool,
    quote: bool,
}

impl RoleSet {
    /// Both body and quote paragraphs.
    pub fn all() -> Self {
        Self {
            body: true,
            quote: true,
        }
    }

    /// No roles; every paragraph is skipped.
    pub fn none() -> Self {
        Self {
            body: false,
            quote: false,
        }
    }

    /// Build a set from roles. Fails on roles that can never be indented.
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Result<Self, String> {
        let mut set = Self::none();
        for role in roles {
            match role {
                Role::Body => set.body = true,
                Role::Quote => set.quote = true,
                other => return Err(format!("Role '{}' cannot be indented", other)),
            }
        }
        Ok(set)
    }

    /// Check whether a role is in the set.
    pub fn contains(&self, role: Role) -> bool {
        match role {
            Role::Body => self.body,
            Role::Quote => self.quote,
            _ => false,
        }
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        !self.body && !self.quote
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for RoleSet {
    type Err = String;

    /// Parse a comma-separated list (e.g., "body,quote").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let roles = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Role::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_roles(roles)
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [Role::Body, Role::Quote]
            .into_iter()
            .filter(|r| self.contains(*r))
            .map(|r| r.as_str())
            .collect();
        f.write_str(&names.join(","))
    }
}

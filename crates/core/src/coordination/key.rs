// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination key namespace
//!
//! Every entry in a backend lives under a [`FullKey`] built from a category,
//! a scope (usually a cell id) and a resource id. Scope and path segments are
//! length-prefixed, so ids may contain any character, including the
//! separators, without two distinct triples ever producing the same key.

use crate::cell::CellId;
use std::fmt;

/// The kind of coordination entry a key addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Lock,
    ReferenceOnly,
    AccountLockout,
    UnitUserLock,
    UsageCount,
    CellStatus,
    DegradedMode,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Lock,
        Category::ReferenceOnly,
        Category::AccountLockout,
        Category::UnitUserLock,
        Category::UsageCount,
        Category::CellStatus,
        Category::DegradedMode,
    ];

    /// Short tag used as the key prefix. Never contains `:`.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Lock => "lk",
            Category::ReferenceOnly => "ref",
            Category::AccountLockout => "acct",
            Category::UnitUserLock => "uu",
            Category::UsageCount => "rc",
            Category::CellStatus => "cs",
            Category::DegradedMode => "rdm",
        }
    }

    fn from_tag(tag: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.tag() == tag)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fully-qualified key of one coordination entry
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullKey(String);

impl FullKey {
    /// Compose `<tag>:<scope-len>:<scope>:<resource>`
    pub fn compose(category: Category, scope: &str, resource: &str) -> Self {
        FullKey(format!(
            "{}:{}:{}:{}",
            category.tag(),
            scope.len(),
            scope,
            resource
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a key back into its parts; `None` for strings not built by `compose`
    pub fn parts(&self) -> Option<(Category, &str, &str)> {
        let (tag, rest) = self.0.split_once(':')?;
        let category = Category::from_tag(tag)?;
        let (len, rest) = rest.split_once(':')?;
        let len: usize = len.parse().ok()?;
        let scope = rest.get(..len)?;
        let resource = rest.get(len..)?.strip_prefix(':')?;
        Some((category, scope, resource))
    }

    pub fn category(&self) -> Option<Category> {
        self.parts().map(|(category, _, _)| category)
    }
}

impl fmt::Display for FullKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FullKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Location of a resource inside a cell (box, collection, file, ...)
///
/// The empty path addresses the cell itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// The cell as a whole
    pub fn cell() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn is_cell(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resource id used in the full key: `<len>.<segment>` joined by `/`
    pub fn encode(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("{}.{}", s.len(), s))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Exclusive lock on a resource of a cell
pub fn lock_key(cell: &CellId, resource: &ResourcePath) -> FullKey {
    FullKey::compose(Category::Lock, cell.as_str(), &resource.encode())
}

/// Reference-only token on a resource of a cell
pub fn reference_key(cell: &CellId, resource: &ResourcePath) -> FullKey {
    FullKey::compose(Category::ReferenceOnly, cell.as_str(), &resource.encode())
}

/// Usage counter of a resource of a cell
pub fn usage_key(cell: &CellId, resource: &ResourcePath) -> FullKey {
    FullKey::compose(Category::UsageCount, cell.as_str(), &resource.encode())
}

pub fn status_key(cell: &CellId) -> FullKey {
    FullKey::compose(Category::CellStatus, cell.as_str(), "")
}

pub fn degraded_mode_key(cell: &CellId) -> FullKey {
    FullKey::compose(Category::DegradedMode, cell.as_str(), "")
}

/// Account ids are unit-wide, so the scope is empty
pub fn account_lockout_key(account: &str) -> FullKey {
    FullKey::compose(Category::AccountLockout, "", account)
}

pub fn unit_user_lock_key(unit_user: &str) -> FullKey {
    FullKey::compose(Category::UnitUserLock, "", unit_user)
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;

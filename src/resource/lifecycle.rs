//! Managed resource lifecycle
//!
//! Handlers are split in two halves: a pure planning step that checks the
//! transition and lists the API calls to make, and an async step that issues
//! them. This module holds the planning vocabulary.

use serde::Serialize;
use std::fmt;

use super::data::ResourceData;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    NoResource,
    PendingCreate,
    Present,
    PendingUpdate,
    PendingDelete,
    Absent,
}

impl LifecycleState {
    /// Resting state implied by a handle: present once it carries an identifier
    pub fn observe(data: &ResourceData) -> Self {
        if data.has_id() {
            Self::Present
        } else {
            Self::NoResource
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoResource => "no-resource",
            Self::PendingCreate => "pending-create",
            Self::Present => "present",
            Self::PendingUpdate => "pending-update",
            Self::PendingDelete => "pending-delete",
            Self::Absent => "absent",
        }
    }

    fn is_gone(&self) -> bool {
        matches!(self, Self::NoResource | Self::Absent)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: Action,
    pub from: LifecycleState,
    /// Intermediate state while calls are in flight, if the action has one
    pub pending: Option<LifecycleState>,
    pub to: LifecycleState,
}

/// Check that `action` may run from `from` and describe where it leads
pub fn transition(from: LifecycleState, action: Action) -> Result<Transition> {
    use LifecycleState::*;

    let (pending, to) = match action {
        Action::Create if from.is_gone() => (Some(PendingCreate), Present),
        Action::Import if from.is_gone() => (None, Present),
        Action::Read if from == Present => (None, Present),
        Action::Update if from == Present => (Some(PendingUpdate), Present),
        Action::Delete if from == Present => (Some(PendingDelete), Absent),
        _ => {
            return Err(Error::InvalidTransition {
                action: action.as_str().to_string(),
                state: from.to_string(),
            })
        }
    };

    Ok(Transition {
        action,
        from,
        pending,
        to,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Post,
    Patch,
    Delete,
}

impl ApiMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A side-effecting call a handler must issue
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall<B> {
    pub method: ApiMethod,
    pub url: String,
    pub body: Option<B>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan<B> {
    pub transition: Transition,
    pub calls: Vec<ApiCall<B>>,
}

// src/core/session_store.rs
//! Single-slot holder for the authenticated identity

use std::fmt;

use crate::types::{User, UserId, UserRole};

/// Bearer credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub credential: Credential,
}

impl Session {
    pub fn new(user: User, credential: Credential) -> Self {
        Self { user, credential }
    }

    pub fn identity(&self) -> &str {
        &self.user.username
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role()
    }
}

/// Current session plus a generation counter bumped on every transition.
///
/// Work started under one generation must compare it with `generation()`
/// before committing its result.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
    generation: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&mut self, session: Session) -> u64 {
        self.current = Some(session);
        self.generation += 1;
        self.generation
    }

    pub fn logout(&mut self) -> u64 {
        self.current = None;
        self.generation += 1;
        self.generation
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.current.is_none()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

use std::sync::RwLock;

/// Where the current owner id comes from. The embedding shell owns the
/// sign-in flow; the core only ever asks this one question.
pub trait IdentityProvider: Send + Sync {
    /// The authenticated owner id, or `None` when signed out.
    fn current_owner(&self) -> Option<String>;
}

/// Identity provider holding an explicitly set owner id.
///
/// The embedder sets the owner at sign-in and clears it at sign-out;
/// clearing is also its hook for invalidating any per-owner state it
/// keeps around. Tests pin a fixed owner with it.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    owner: RwLock<Option<String>>,
}

impl StaticIdentity {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: RwLock::new(Some(owner.into())),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn set_owner(&self, owner: Option<String>) {
        if let Ok(mut guard) = self.owner.write() {
            *guard = owner;
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_owner(&self) -> Option<String> {
        self.owner.read().ok().and_then(|guard| guard.clone())
    }
}

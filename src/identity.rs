/*!
 * # Caller Identity
 *
 * Supplies the acting identity for requisition operations. Approval checks
 * ask this collaborator whether the actor is privileged instead of comparing
 * against a hard-coded system account.
 */

use std::collections::HashSet;
use std::sync::RwLock;
use uuid::Uuid;

/// Identity provider trait for different implementations
pub trait CallerIdentity: Send + Sync {
    /// The identity performing the current operation.
    fn current_actor(&self) -> Uuid;

    /// Whether the given identity may bypass the self-approval prohibition.
    fn is_privileged(&self, actor: Uuid) -> bool;
}

/// In-memory identity provider
///
/// Holds a single current actor and a set of privileged identities. The
/// setters exist so tests and embedding applications can switch the acting
/// identity between operations.
#[derive(Debug)]
pub struct FixedIdentity {
    actor: RwLock<Uuid>,
    privileged: RwLock<HashSet<Uuid>>,
}

impl FixedIdentity {
    pub fn new(actor: Uuid) -> Self {
        Self {
            actor: RwLock::new(actor),
            privileged: RwLock::new(HashSet::new()),
        }
    }

    pub fn set_actor(&self, actor: Uuid) {
        *self.actor.write().unwrap() = actor;
    }

    pub fn grant_privilege(&self, actor: Uuid) {
        self.privileged.write().unwrap().insert(actor);
    }

    pub fn revoke_privilege(&self, actor: Uuid) {
        self.privileged.write().unwrap().remove(&actor);
    }
}

impl CallerIdentity for FixedIdentity {
    fn current_actor(&self) -> Uuid {
        *self.actor.read().unwrap()
    }

    fn is_privileged(&self, actor: Uuid) -> bool {
        self.privileged.read().unwrap().contains(&actor)
    }
}

//! Client-side favorites set with optimistic updates.
//!
//! Membership flips locally before the backend confirms. If the backend call
//! fails the flip is reverted. There is no queueing or retry; concurrent
//! togglers race and the backend keeps whichever write lands last.

use std::collections::HashSet;
use std::future::Future;

use uuid::Uuid;

/// Backend call needed to confirm a local flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOp {
    Add(Uuid),
    Remove(Uuid),
}

impl FavoriteOp {
    pub fn image_id(&self) -> Uuid {
        match *self {
            Self::Add(id) | Self::Remove(id) => id,
        }
    }
}

/// A flip applied locally but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a pending toggle must be confirmed or rolled back"]
pub struct PendingToggle {
    pub op: FavoriteOp,
}

impl PendingToggle {
    /// Membership after the flip.
    pub fn favorited(&self) -> bool {
        matches!(self.op, FavoriteOp::Add(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: HashSet<Uuid>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, image_id: &Uuid) -> bool {
        self.ids.contains(image_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.ids.iter()
    }

    /// Flip membership now and return the backend op that confirms it.
    pub fn toggle(&mut self, image_id: Uuid) -> PendingToggle {
        let op = if self.ids.remove(&image_id) {
            FavoriteOp::Remove(image_id)
        } else {
            self.ids.insert(image_id);
            FavoriteOp::Add(image_id)
        };
        PendingToggle { op }
    }

    /// Undo a flip whose backend call failed.
    pub fn rollback(&mut self, pending: PendingToggle) {
        match pending.op {
            FavoriteOp::Add(id) => {
                self.ids.remove(&id);
            }
            FavoriteOp::Remove(id) => {
                self.ids.insert(id);
            }
        }
    }

    /// Flip, run `backend`, and revert on error. Returns the new membership.
    pub async fn toggle_with<F, Fut, E>(&mut self, image_id: Uuid, backend: F) -> Result<bool, E>
    where
        F: FnOnce(FavoriteOp) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let pending = self.toggle(image_id);
        match backend(pending.op).await {
            Ok(()) => Ok(pending.favorited()),
            Err(e) => {
                self.rollback(pending);
                Err(e)
            }
        }
    }
}

impl FromIterator<Uuid> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_original() {
        let kept = Uuid::new_v4();
        let flipped = Uuid::new_v4();
        let original: FavoriteSet = [kept].into_iter().collect();

        let mut set = original.clone();
        let first = set.toggle(flipped);
        assert_eq!(first.op, FavoriteOp::Add(flipped));
        assert!(set.contains(&flipped));

        let second = set.toggle(flipped);
        assert_eq!(second.op, FavoriteOp::Remove(flipped));
        assert_eq!(set, original);
    }

    #[test]
    fn rollback_restores_removed_entry() {
        let id = Uuid::new_v4();
        let mut set: FavoriteSet = [id].into_iter().collect();
        let pending = set.toggle(id);
        assert!(!pending.favorited());
        assert!(set.is_empty());
        set.rollback(pending);
        assert!(set.contains(&id));
    }

    #[tokio::test]
    async fn failed_backend_call_reverts() {
        let id = Uuid::new_v4();
        let mut set = FavoriteSet::new();

        let result: Result<bool, &str> = set.toggle_with(id, |_| async { Err("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert!(!set.contains(&id));
    }

    #[tokio::test]
    async fn successful_backend_call_keeps_flip() {
        let id = Uuid::new_v4();
        let mut set = FavoriteSet::new();
        let mut seen = None;

        let result: Result<bool, ()> = set
            .toggle_with(id, |op| {
                seen = Some(op);
                async { Ok(()) }
            })
            .await;
        assert_eq!(result, Ok(true));
        assert_eq!(seen, Some(FavoriteOp::Add(id)));
        assert_eq!(set.len(), 1);
    }
}

//! Matchmaker: per-category waiting pools and the pair-or-wait decision.

use std::collections::{HashMap, VecDeque};

use super::{Category, ConnectionId, RoomId, RoomIdFactory, error::MatchError};

/// Stale queue slots tolerated before a pool compacts its queue.
const COMPACT_SLACK: usize = 32;

/// FIFO set of connections waiting for a peer in one category.
///
/// Membership, insert and remove are O(1). Removal only drops the membership
/// entry, leaving a stale slot in the queue that `pop_oldest` skips. Each
/// insert gets a fresh ticket so a stale slot is never mistaken for a later
/// re-insert of the same connection.
#[derive(Debug, Default)]
pub struct WaitingPool {
    queue: VecDeque<(ConnectionId, u64)>,
    members: HashMap<ConnectionId, u64>,
    next_ticket: u64,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` to the back of the queue. Returns `false` if already waiting.
    pub fn insert(&mut self, id: ConnectionId) -> bool {
        if self.members.contains_key(&id) {
            return false;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.members.insert(id.clone(), ticket);
        self.queue.push_back((id, ticket));
        true
    }

    /// Remove `id` if present. Returns whether it was waiting.
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        let removed = self.members.remove(id).is_some();
        if removed {
            self.compact_if_needed();
        }
        removed
    }

    /// Remove and return the connection that has waited longest.
    pub fn pop_oldest(&mut self) -> Option<ConnectionId> {
        while let Some((id, ticket)) = self.queue.pop_front() {
            if self.members.get(&id) == Some(&ticket) {
                self.members.remove(&id);
                return Some(id);
            }
        }
        None
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn compact_if_needed(&mut self) {
        if self.queue.len() <= self.members.len() * 2 + COMPACT_SLACK {
            return;
        }
        let members = &self.members;
        self.queue
            .retain(|(id, ticket)| members.get(id) == Some(ticket));
    }
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub room_id: RoomId,
    /// The waiter taken from the pool
    pub peer: ConnectionId,
}

/// Owns one waiting pool per configured category.
///
/// The Matchmaker trusts its caller for session consistency: a connection
/// asking for a match must not already be waiting or paired.
#[derive(Debug)]
pub struct Matchmaker {
    /// Configured categories in configuration order, first is the default
    categories: Vec<Category>,
    pools: HashMap<Category, WaitingPool>,
    pair_sequence: u64,
}

impl Matchmaker {
    /// Create a Matchmaker with a pool for each category.
    ///
    /// Duplicates are ignored. The first category becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::NoCategories` if `categories` is empty.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Result<Self, MatchError> {
        let mut ordered = Vec::new();
        let mut pools = HashMap::new();
        for category in categories {
            if !pools.contains_key(&category) {
                pools.insert(category.clone(), WaitingPool::new());
                ordered.push(category);
            }
        }
        if ordered.is_empty() {
            return Err(MatchError::NoCategories);
        }
        Ok(Self {
            categories: ordered,
            pools,
            pair_sequence: 0,
        })
    }

    /// Pair `requester` with the oldest waiter of `category`, or enqueue it.
    ///
    /// Popping the waiter and deriving the room happen in one `&mut self` call,
    /// so a waiter can never be handed to two requesters.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Pairing))` - matched with a waiter
    /// * `Ok(None)` - no waiter available, `requester` is now waiting
    /// * `Err(MatchError::UnknownCategory)` - the category has no pool
    pub fn request_match(
        &mut self,
        requester: &ConnectionId,
        category: &Category,
    ) -> Result<Option<Pairing>, MatchError> {
        let pool = self
            .pools
            .get_mut(category)
            .ok_or_else(|| MatchError::UnknownCategory(category.to_string()))?;

        match pool.pop_oldest() {
            Some(peer) => {
                self.pair_sequence += 1;
                let room_id = RoomIdFactory::for_pair(requester, &peer, self.pair_sequence);
                tracing::debug!(
                    "Matched '{}' with waiter '{}' in '{}' (room '{}')",
                    requester,
                    peer,
                    category,
                    room_id
                );
                Ok(Some(Pairing { room_id, peer }))
            }
            None => {
                pool.insert(requester.clone());
                tracing::debug!(
                    "'{}' is waiting in '{}' ({} waiting)",
                    requester,
                    category,
                    pool.len()
                );
                Ok(None)
            }
        }
    }

    /// Remove `id` from the pool of `category`. Idempotent.
    ///
    /// Returns whether the connection was waiting there. Unknown categories are a no-op.
    pub fn cancel_wait(&mut self, id: &ConnectionId, category: &Category) -> bool {
        self.pools
            .get_mut(category)
            .is_some_and(|pool| pool.remove(id))
    }

    /// The category `id` is waiting in, if any.
    pub fn waiting_category(&self, id: &ConnectionId) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| self.pools.get(*category).is_some_and(|p| p.contains(id)))
    }

    /// Number of pools holding `id`. Anything above one is a broken invariant.
    #[cfg(test)]
    pub(crate) fn pools_containing(&self, id: &ConnectionId) -> usize {
        self.pools.values().filter(|pool| pool.contains(id)).count()
    }

    pub fn is_waiting(&self, id: &ConnectionId) -> bool {
        self.waiting_category(id).is_some()
    }

    /// Number of connections waiting in `category` (0 for unknown categories).
    pub fn waiting_count(&self, category: &Category) -> usize {
        self.pools.get(category).map_or(0, WaitingPool::len)
    }

    pub fn has_category(&self, category: &Category) -> bool {
        self.pools.contains_key(category)
    }

    /// Configured categories, in configuration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category used when a client does not name one.
    pub fn default_category(&self) -> &Category {
        // `new` guarantees at least one category.
        &self.categories[0]
    }
}

//! Session Router: per-connection session state, room registry and relay.
//!
//! `SessionRouter` is a plain aggregate. Every operation takes `&mut self`,
//! applies its transition and returns the deliveries the caller has to push.
//! Holding it behind a single lock makes each operation atomic with respect
//! to every other one, the Matchmaker's pools included.

use std::collections::HashMap;

use serde_json::Value;

use super::{
    Category, ConnectionId, Delivery, Matchmaker, Pairing, Room, RoomId, ServerEvent, Session,
    SessionState, SignalKind, Timestamp,
    error::{MatchError, SessionError},
};

/// Point-in-time counters for monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterStats {
    pub connections: usize,
    pub rooms: usize,
    /// Waiting count per category, in configuration order
    pub waiting: Vec<(Category, usize)>,
}

/// Owns every session, every room and the Matchmaker.
#[derive(Debug)]
pub struct SessionRouter {
    matchmaker: Matchmaker,
    sessions: HashMap<ConnectionId, Session>,
    rooms: HashMap<RoomId, Room>,
}

impl SessionRouter {
    pub fn new(matchmaker: Matchmaker) -> Self {
        Self {
            matchmaker,
            sessions: HashMap::new(),
            rooms: HashMap::new(),
        }
    }

    /// Register a new connection in the `Idle` state.
    ///
    /// # Errors
    ///
    /// `SessionError::DuplicateConnection` if the id is already registered.
    pub fn connect(
        &mut self,
        id: ConnectionId,
        connected_at: Timestamp,
    ) -> Result<Vec<Delivery>, SessionError> {
        if self.sessions.contains_key(&id) {
            return Err(SessionError::DuplicateConnection(id.into_string()));
        }
        self.sessions
            .insert(id.clone(), Session::new(id.clone(), connected_at));

        Ok(vec![Delivery::new(
            id.clone(),
            ServerEvent::Connected { connection_id: id },
        )])
    }

    /// Join `category`: pair with its oldest waiter or start waiting.
    ///
    /// A connection that is already waiting leaves its old pool first, so a
    /// repeated join only moves it (possibly into another category).
    ///
    /// # Errors
    ///
    /// * `UnknownConnection` - no such session
    /// * `AlreadyPaired` - the connection is in a room; it must send `next`
    /// * `Match(UnknownCategory)` - the category is not configured
    pub fn join_category(
        &mut self,
        id: &ConnectionId,
        category: Category,
        now: Timestamp,
    ) -> Result<Vec<Delivery>, SessionError> {
        let session = self.session_or_err(id)?;
        if let Some(room_id) = &session.current_room {
            return Err(SessionError::AlreadyPaired {
                connection_id: id.to_string(),
                room_id: room_id.to_string(),
            });
        }
        self.ensure_category(&category)?;

        if let Some(previous) = session.current_category.clone() {
            self.matchmaker.cancel_wait(id, &previous);
        }
        self.pair_or_wait(id, category, now)
    }

    /// Leave the current room (if any) and look for a new peer right away.
    ///
    /// `category` falls back to the session's current category, then to the
    /// default category. The peer left behind receives `PeerLeft` and
    /// becomes `Idle`.
    ///
    /// # Errors
    ///
    /// * `UnknownConnection` - no such session
    /// * `Match(UnknownCategory)` - the category is not configured; nothing changes
    pub fn next(
        &mut self,
        id: &ConnectionId,
        category: Option<Category>,
        now: Timestamp,
    ) -> Result<Vec<Delivery>, SessionError> {
        let session = self.session_or_err(id)?;
        let previous = session.current_category.clone();
        let category = category
            .or_else(|| previous.clone())
            .unwrap_or_else(|| self.matchmaker.default_category().clone());
        self.ensure_category(&category)?;

        let mut deliveries = self.leave_room(id);

        if let Some(previous) = &previous {
            self.matchmaker.cancel_wait(id, previous);
        }
        self.matchmaker.cancel_wait(id, &category);

        deliveries.extend(self.pair_or_wait(id, category, now)?);
        Ok(deliveries)
    }

    /// Forward `payload` verbatim to the other member of `room_id`.
    ///
    /// A room that no longer exists yields no delivery and no error: the peer
    /// may have left while the message was in flight.
    ///
    /// # Errors
    ///
    /// * `UnknownConnection` - no such session
    /// * `NotRoomMember` - the room exists but the sender is not in it
    pub fn relay(
        &self,
        id: &ConnectionId,
        room_id: &RoomId,
        kind: SignalKind,
        payload: Value,
    ) -> Result<Vec<Delivery>, SessionError> {
        self.session_or_err(id)?;

        let Some(room) = self.rooms.get(room_id) else {
            tracing::debug!(
                "Dropping {} from '{}': room '{}' is gone",
                kind.as_str(),
                id,
                room_id
            );
            return Ok(Vec::new());
        };

        let peer = room.peer_of(id).ok_or_else(|| SessionError::NotRoomMember {
            connection_id: id.to_string(),
            room_id: room_id.to_string(),
        })?;

        Ok(vec![Delivery::new(
            peer.clone(),
            ServerEvent::Signal { kind, payload },
        )])
    }

    /// Tear down the session: leave any pool and room, then forget it.
    ///
    /// Unknown ids are a no-op, so a repeated disconnect is harmless.
    pub fn disconnect(&mut self, id: &ConnectionId) -> Vec<Delivery> {
        let Some(session) = self.sessions.get(id) else {
            return Vec::new();
        };

        if let Some(category) = session.current_category.clone() {
            self.matchmaker.cancel_wait(id, &category);
        }
        let deliveries = self.leave_room(id);
        self.sessions.remove(id);

        deliveries
    }

    pub fn session(&self, id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Derived lifecycle state, `None` once the connection is gone.
    pub fn state(&self, id: &ConnectionId) -> Option<SessionState> {
        let session = self.sessions.get(id)?;
        let state = if session.is_paired() {
            SessionState::Paired
        } else if self.matchmaker.is_waiting(id) {
            SessionState::Waiting
        } else {
            SessionState::Idle
        };
        Some(state)
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn matchmaker(&self) -> &Matchmaker {
        &self.matchmaker
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            connections: self.sessions.len(),
            rooms: self.rooms.len(),
            waiting: self
                .matchmaker
                .categories()
                .iter()
                .map(|category| (category.clone(), self.matchmaker.waiting_count(category)))
                .collect(),
        }
    }

    fn session_or_err(&self, id: &ConnectionId) -> Result<&Session, SessionError> {
        self.sessions
            .get(id)
            .ok_or_else(|| SessionError::UnknownConnection(id.to_string()))
    }

    fn ensure_category(&self, category: &Category) -> Result<(), SessionError> {
        if self.matchmaker.has_category(category) {
            Ok(())
        } else {
            Err(MatchError::UnknownCategory(category.to_string()).into())
        }
    }

    /// Ask the Matchmaker for a peer and, when one is found, open the room.
    ///
    /// The caller has already removed `id` from every pool and room.
    fn pair_or_wait(
        &mut self,
        id: &ConnectionId,
        category: Category,
        now: Timestamp,
    ) -> Result<Vec<Delivery>, SessionError> {
        if let Some(session) = self.sessions.get_mut(id) {
            session.current_category = Some(category.clone());
        }

        loop {
            let Some(Pairing { room_id, peer }) = self.matchmaker.request_match(id, &category)?
            else {
                return Ok(Vec::new());
            };

            // Waiters are removed on disconnect, so this only guards against a
            // broken invariant rather than pairing with a ghost.
            if !self.sessions.contains_key(&peer) {
                tracing::warn!("Discarding stale waiter '{}' from '{}'", peer, category);
                continue;
            }

            for member in [id, &peer] {
                if let Some(session) = self.sessions.get_mut(member) {
                    session.current_room = Some(room_id.clone());
                }
            }
            self.rooms.insert(
                room_id.clone(),
                Room::new(room_id.clone(), category, id.clone(), peer.clone(), now),
            );

            return Ok(vec![
                Delivery::new(
                    id.clone(),
                    ServerEvent::Ready {
                        room: room_id.clone(),
                    },
                ),
                Delivery::new(peer, ServerEvent::Ready { room: room_id }),
            ]);
        }
    }

    /// Dissolve the room `id` is in and notify the peer. No-op when unpaired.
    fn leave_room(&mut self, id: &ConnectionId) -> Vec<Delivery> {
        let Some(room_id) = self
            .sessions
            .get_mut(id)
            .and_then(|session| session.current_room.take())
        else {
            return Vec::new();
        };
        let Some(room) = self.rooms.remove(&room_id) else {
            return Vec::new();
        };

        let Some(peer) = room.peer_of(id) else {
            return Vec::new();
        };
        if let Some(peer_session) = self.sessions.get_mut(peer)
            && peer_session.current_room.as_ref() == Some(&room_id)
        {
            peer_session.current_room = None;
        }

        vec![Delivery::new(peer.clone(), ServerEvent::PeerLeft)]
    }
}

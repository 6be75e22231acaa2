//! Friendship graph queries.
//!
//! A friendship is an `Accept` edge in either direction. Nothing is cached:
//! each call reads the current edges from the store.

use std::collections::HashSet;

use tracing::debug;

use profnet_db::Database;
use profnet_types::api::GateDecision;

use crate::error::{FlowError, FlowResult};

/// Hops searched outward from the requester by [`within_three_hops`].
pub const MAX_HOPS: usize = 3;

/// Accepted connections a user needs before requests are limited to people
/// within [`MAX_HOPS`].
pub const REACH_CHECK_THRESHOLD: usize = 5;

/// Friends of `user_id`: outgoing accepted edges first, then incoming, each in
/// insertion order. A peer joined by edges in both directions is listed once.
pub fn friends_of(db: &Database, user_id: &str) -> FlowResult<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(db
        .get_accepted_peers(user_id)?
        .into_iter()
        .filter(|peer| seen.insert(peer.clone()))
        .collect())
}

pub fn is_friend(db: &Database, user_id: &str, other: &str) -> FlowResult<bool> {
    Ok(friends_of(db, user_id)?.iter().any(|f| f == other))
}

/// Whether `target` is `start` itself or reachable from it in at most
/// [`MAX_HOPS`] accepted edges.
pub fn within_three_hops(db: &Database, start: &str, target: &str) -> FlowResult<bool> {
    within_hops(db, start, target, MAX_HOPS)
}

/// Breadth-first expansion from `start`, one level per hop, stopping early
/// once `target` shows up. Users already expanded are not expanded again.
pub fn within_hops(db: &Database, start: &str, target: &str, max_hops: usize) -> FlowResult<bool> {
    if start == target {
        return Ok(true);
    }

    let mut visited: HashSet<String> = HashSet::from([start.to_string()]);
    let mut frontier = vec![start.to_string()];

    for hop in 1..=max_hops {
        let mut next = Vec::new();
        for user in &frontier {
            for friend in friends_of(db, user)? {
                if friend == target {
                    debug!(start, target, hop, "Target reached");
                    return Ok(true);
                }
                if visited.insert(friend.clone()) {
                    next.push(friend);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    Ok(false)
}

/// Decide whether `requester` may ask `target` to connect.
///
/// Existing friends are refused. With at least [`REACH_CHECK_THRESHOLD`]
/// accepted connections the target must be within three hops; below the
/// threshold anyone may be asked.
pub fn connection_gate(db: &Database, requester: &str, target: &str) -> FlowResult<GateDecision> {
    let friends = friends_of(db, requester)?;
    if friends.iter().any(|f| f == target) {
        return Err(FlowError::AlreadyFriends(target.to_string()));
    }

    if friends.len() >= REACH_CHECK_THRESHOLD && within_three_hops(db, requester, target)? {
        Ok(GateDecision::WithinReach)
    } else if friends.len() < REACH_CHECK_THRESHOLD {
        Ok(GateDecision::BelowThreshold)
    } else {
        Err(FlowError::NotWithinReach(target.to_string()))
    }
}

use tracing::info;

use profnet_db::Database;
use profnet_types::api::GateDecision;
use profnet_types::{Connection, ConnectionStatus};

use crate::convert;
use crate::error::{FlowError, FlowResult};
use crate::graph;

/// Send a connection request from `requester` to `target`, subject to the
/// three-hop gate. A rejected edge from the past does not block a new one.
pub fn request_connection(
    db: &Database,
    requester: &str,
    target: &str,
) -> FlowResult<(Connection, GateDecision)> {
    if requester == target {
        return Err(FlowError::SelfConnection);
    }
    if !db.user_exists(target)? {
        return Err(FlowError::UserNotFound(target.to_string()));
    }

    let pending = db
        .get_connections_between(requester, target)?
        .into_iter()
        .map(convert::connection)
        .any(|c| c.status == ConnectionStatus::Request);
    if pending {
        return Err(FlowError::RequestPending(target.to_string()));
    }

    let decision = graph::connection_gate(db, requester, target)?;
    let id = db.insert_connection_request(requester, target)?;
    info!(requester, target, ?decision, "Connection request sent");

    let row = db
        .get_connections_between(requester, target)?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| FlowError::NoPendingRequest(target.to_string()))?;
    Ok((convert::connection(row), decision))
}

/// Requests waiting on `recipient`, oldest first.
pub fn pending_requests(db: &Database, recipient: &str) -> FlowResult<Vec<Connection>> {
    Ok(db
        .get_pending_requests(recipient)?
        .into_iter()
        .map(convert::connection)
        .collect())
}

pub fn accept(db: &Database, recipient: &str, requester: &str) -> FlowResult<()> {
    answer(db, recipient, requester, ConnectionStatus::Accept)
}

pub fn reject(db: &Database, recipient: &str, requester: &str) -> FlowResult<()> {
    answer(db, recipient, requester, ConnectionStatus::Reject)
}

fn answer(
    db: &Database,
    recipient: &str,
    requester: &str,
    status: ConnectionStatus,
) -> FlowResult<()> {
    debug_assert!(ConnectionStatus::Request.can_transition_to(status));

    // only rows still in Request are updated, so answers never overwrite answers
    let changed = db.answer_connection_request(requester, recipient, status.as_str())?;
    if changed == 0 {
        return Err(FlowError::NoPendingRequest(requester.to_string()));
    }

    info!(requester, recipient, %status, "Connection request answered");
    Ok(())
}

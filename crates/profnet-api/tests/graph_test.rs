use profnet_api::{FlowError, connections, graph};
use profnet_db::Database;
use profnet_types::api::GateDecision;

fn db_with(users: &[&str]) -> Database {
    let db = Database::open_in_memory().unwrap();
    for u in users {
        db.create_user(u, "hash", &format!("{u}@x.com")).unwrap();
    }
    db
}

fn befriend(db: &Database, a: &str, b: &str) {
    db.insert_connection_request(a, b).unwrap();
    assert_eq!(db.answer_connection_request(a, b, "Accept").unwrap(), 1);
}

/// alice has five friends f1..f5; f1 - x - y - z hangs off the first one,
/// and loner has no edges at all.
fn network() -> Database {
    let db = db_with(&["alice", "f1", "f2", "f3", "f4", "f5", "x", "y", "z", "loner"]);
    for f in ["f1", "f2", "f3", "f4", "f5"] {
        befriend(&db, "alice", f);
    }
    befriend(&db, "x", "f1");
    befriend(&db, "x", "y");
    befriend(&db, "z", "y");
    db
}

#[test]
fn accepted_request_makes_both_sides_friends() {
    let db = db_with(&["alice", "bob"]);
    connections::request_connection(&db, "alice", "bob").unwrap();
    assert!(graph::friends_of(&db, "alice").unwrap().is_empty());

    connections::accept(&db, "bob", "alice").unwrap();
    assert_eq!(graph::friends_of(&db, "alice").unwrap(), vec!["bob"]);
    assert_eq!(graph::friends_of(&db, "bob").unwrap(), vec!["alice"]);
}

#[test]
fn rejected_request_leaves_no_friendship_and_can_be_repeated() {
    let db = db_with(&["alice", "bob"]);
    connections::request_connection(&db, "alice", "bob").unwrap();
    connections::reject(&db, "bob", "alice").unwrap();

    assert!(!graph::is_friend(&db, "alice", "bob").unwrap());
    assert!(!graph::is_friend(&db, "bob", "alice").unwrap());

    let (again, decision) = connections::request_connection(&db, "alice", "bob").unwrap();
    assert_eq!(again.status, profnet_types::ConnectionStatus::Request);
    assert_eq!(decision, GateDecision::BelowThreshold);
    assert_eq!(connections::pending_requests(&db, "bob").unwrap().len(), 1);
}

#[test]
fn answered_requests_cannot_be_answered_again() {
    let db = db_with(&["alice", "bob"]);
    connections::request_connection(&db, "alice", "bob").unwrap();
    connections::accept(&db, "bob", "alice").unwrap();

    assert!(matches!(
        connections::reject(&db, "bob", "alice"),
        Err(FlowError::NoPendingRequest(_))
    ));
    assert!(graph::is_friend(&db, "alice", "bob").unwrap());
}

#[test]
fn only_the_recipient_can_answer() {
    let db = db_with(&["alice", "bob"]);
    connections::request_connection(&db, "alice", "bob").unwrap();
    assert!(matches!(
        connections::accept(&db, "alice", "bob"),
        Err(FlowError::NoPendingRequest(_))
    ));
}

#[test]
fn duplicate_and_self_requests_are_refused() {
    let db = db_with(&["alice", "bob"]);
    connections::request_connection(&db, "alice", "bob").unwrap();

    assert!(matches!(
        connections::request_connection(&db, "alice", "bob"),
        Err(FlowError::RequestPending(_))
    ));
    assert!(matches!(
        connections::request_connection(&db, "bob", "alice"),
        Err(FlowError::RequestPending(_))
    ));
    assert!(matches!(
        connections::request_connection(&db, "alice", "alice"),
        Err(FlowError::SelfConnection)
    ));
    assert!(matches!(
        connections::request_connection(&db, "alice", "ghost"),
        Err(FlowError::UserNotFound(_))
    ));
}

#[test]
fn friends_are_listed_once_outgoing_first() {
    let db = db_with(&["alice", "bob", "carol"]);
    befriend(&db, "carol", "alice");
    befriend(&db, "alice", "bob");
    // a second accepted edge in the other direction
    befriend(&db, "bob", "alice");

    assert_eq!(graph::friends_of(&db, "alice").unwrap(), vec!["bob", "carol"]);
    assert_eq!(db.get_accepted_peers("alice").unwrap().len(), 3);
}

#[test]
fn origin_is_within_three_hops_of_itself() {
    let db = db_with(&["alice"]);
    assert!(graph::within_three_hops(&db, "alice", "alice").unwrap());
}

#[test]
fn three_hops_is_the_limit() {
    let db = network();
    assert!(graph::within_three_hops(&db, "alice", "f3").unwrap());
    assert!(graph::within_three_hops(&db, "alice", "x").unwrap());
    assert!(graph::within_three_hops(&db, "alice", "y").unwrap());
    assert!(!graph::within_three_hops(&db, "alice", "z").unwrap());
    assert!(!graph::within_three_hops(&db, "alice", "loner").unwrap());

    // reachability is symmetric
    assert!(graph::within_three_hops(&db, "y", "alice").unwrap());
    assert!(graph::within_hops(&db, "alice", "z", 4).unwrap());
}

#[test]
fn cycles_do_not_break_the_search() {
    let db = db_with(&["a", "b", "c", "d", "e"]);
    befriend(&db, "a", "b");
    befriend(&db, "b", "c");
    befriend(&db, "c", "a");
    befriend(&db, "d", "e");

    assert!(graph::within_three_hops(&db, "a", "c").unwrap());
    assert!(!graph::within_three_hops(&db, "a", "e").unwrap());
}

#[test]
fn well_connected_users_may_only_reach_three_hops() {
    let db = network();

    let (_, decision) = connections::request_connection(&db, "alice", "y").unwrap();
    assert_eq!(decision, GateDecision::WithinReach);

    assert!(matches!(
        connections::request_connection(&db, "alice", "z"),
        Err(FlowError::NotWithinReach(_))
    ));
    assert!(matches!(
        connections::request_connection(&db, "alice", "loner"),
        Err(FlowError::NotWithinReach(_))
    ));
    assert!(matches!(
        connections::request_connection(&db, "alice", "f2"),
        Err(FlowError::AlreadyFriends(_))
    ));
}

#[test]
fn users_below_the_threshold_may_ask_anyone() {
    let db = network();
    // z has a single friend, so reach is not checked
    let (_, decision) = connections::request_connection(&db, "z", "loner").unwrap();
    assert_eq!(decision, GateDecision::BelowThreshold);
}

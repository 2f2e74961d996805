//! Property-based tests for the social graph, ledger and neighborhood collector

use proptest::prelude::*;
use socialflow::detector_core::{
    NeighborhoodCollector, PurchaseLedger, PurchaseRecord, SocialGraph, UserId, UserStore,
};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone)]
enum GraphOp {
    Befriend(UserId, UserId),
    Unfriend(UserId, UserId),
}

fn graph_op_strategy() -> impl Strategy<Value = GraphOp> {
    prop_oneof![
        (0u64..12, 0u64..12).prop_map(|(a, b)| GraphOp::Befriend(a, b)),
        (0u64..12, 0u64..12).prop_map(|(a, b)| GraphOp::Unfriend(a, b)),
    ]
}

fn build_graph(ops: &[GraphOp]) -> UserStore {
    let graph = SocialGraph::new();
    let mut users = UserStore::new();
    for op in ops {
        match *op {
            GraphOp::Befriend(a, b) => graph.befriend(&mut users, a, b),
            GraphOp::Unfriend(a, b) => graph.unfriend(&mut users, a, b),
        }
    }
    users
}

/// Shortest hop distance from `root` to every reachable user
fn distances(users: &UserStore, root: UserId) -> HashMap<UserId, usize> {
    let mut dist = HashMap::from([(root, 0usize)]);
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        let d = dist[&node];
        if let Some(friends) = users.friends(node) {
            for &f in friends {
                if !dist.contains_key(&f) {
                    dist.insert(f, d + 1);
                    queue.push_back(f);
                }
            }
        }
    }
    dist
}

/// Property: friendship is symmetric after any sequence of befriend/unfriend
#[test]
fn prop_friendship_is_symmetric() {
    proptest!(|(ops in prop::collection::vec(graph_op_strategy(), 0..80))| {
        let users = build_graph(&ops);

        for &a in users.ids() {
            for &b in users.friends(a).unwrap() {
                prop_assert!(
                    users.friends(b).unwrap().contains(&a),
                    "{} lists {} as friend but not vice versa", a, b
                );
                prop_assert_ne!(a, b);
            }
        }
    });
}

/// Property: the neighborhood is exactly the set of users within D hops, minus the root
#[test]
fn prop_neighborhood_matches_hop_distance() {
    proptest!(|(
        ops in prop::collection::vec(graph_op_strategy(), 0..80),
        root in 0u64..12,
        depth in 1usize..5,
    )| {
        let users = build_graph(&ops);
        let graph = SocialGraph::new();

        let hood = graph.neighborhood(&users, root, depth);
        let expected: HashSet<UserId> = distances(&users, root)
            .into_iter()
            .filter(|&(id, d)| id != root && d <= depth)
            .map(|(id, _)| id)
            .collect();

        prop_assert!(!hood.contains(&root));
        prop_assert_eq!(hood, expected);
    });
}

/// Property: histories never exceed T and always hold the newest entries
#[test]
fn prop_ledger_is_bounded() {
    proptest!(|(
        purchases in prop::collection::vec((0u64..5, 0.0f64..1000.0), 0..120),
        capacity in 2usize..8,
    )| {
        let mut users = UserStore::new();
        let mut ledger = PurchaseLedger::new(capacity);
        let mut all: HashMap<UserId, Vec<u64>> = HashMap::new();

        for (user, amount) in &purchases {
            let seq = ledger.record(&mut users, *user, *amount);
            all.entry(*user).or_default().push(seq);
        }

        for (user, seqs) in &all {
            let history: Vec<u64> = users.history(*user).unwrap().iter().map(|p| p.seq).collect();
            let keep = seqs.len().min(capacity);
            prop_assert_eq!(history, seqs[seqs.len() - keep..].to_vec());
        }
    });
}

/// Property: the collected window is the T globally newest neighbor purchases, ascending
#[test]
fn prop_collector_returns_global_top_t() {
    proptest!(|(
        purchases in prop::collection::vec((0u64..6, 0.0f64..1000.0), 0..150),
        capacity in 2usize..10,
        neighbors in prop::collection::hash_set(0u64..8, 0..6),
    )| {
        let mut users = UserStore::new();
        let mut ledger = PurchaseLedger::new(capacity);
        for (user, amount) in &purchases {
            ledger.record(&mut users, *user, *amount);
        }

        let collector = NeighborhoodCollector::new(capacity);
        let window = collector.collect_top_t(&users, &neighbors);

        let mut expected: Vec<PurchaseRecord> = neighbors
            .iter()
            .filter_map(|id| users.history(*id))
            .flat_map(|h| h.iter().copied())
            .collect();
        expected.sort_by_key(|r| r.seq);
        let skip = expected.len().saturating_sub(capacity);
        let expected = expected[skip..].to_vec();

        prop_assert!(window.len() <= capacity);
        prop_assert!(window.windows(2).all(|w| w[0].seq < w[1].seq));
        prop_assert_eq!(window, expected);
    });
}

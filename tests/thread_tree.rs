use std::collections::{HashMap, HashSet};

use mail_threads::test_support::{TestMessage, init_test_logger, mail, msg};
use mail_threads::{
    MessageIdIndex, OrderedMessageList, ThreadTree, ThreadTreeBuilder, ThreadingConfig,
};

fn create_test_builder() -> ThreadTreeBuilder {
    ThreadTreeBuilder::new(ThreadingConfig::from_lookup(|_| None))
}

fn build_tree(messages: &[TestMessage]) -> ThreadTree<'_, TestMessage> {
    init_test_logger();
    let ordered = OrderedMessageList::try_from_messages(messages.iter()).unwrap();
    let index = MessageIdIndex::from_messages(messages.iter());
    create_test_builder().build(&ordered, &index).unwrap()
}

fn root_ids(tree: &ThreadTree<'_, TestMessage>) -> Vec<String> {
    tree.roots()
        .filter_map(|id| tree.message(id))
        .map(|message| message.id.clone())
        .collect()
}

/// Parent of every message, recovered from the pre-order depths
fn parents(tree: &ThreadTree<'_, TestMessage>) -> HashMap<String, Option<String>> {
    let mut ancestors: Vec<String> = Vec::new();
    let mut result = HashMap::new();
    tree.traverse(|depth, message| {
        ancestors.truncate(depth);
        result.insert(message.id.clone(), ancestors.last().cloned());
        ancestors.push(message.id.clone());
    });
    result
}

/// Messages with random timestamps whose reply targets only point at
/// messages generated earlier (so no cycles), plus some unknown targets.
fn create_random_messages(seed: u64, count: usize) -> Vec<TestMessage> {
    let mut state = seed.wrapping_add(0x9E3779B97F4A7C15);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    (0..count)
        .map(|i| {
            let time = (next() % 20) as i64;
            let roll = next() % 10;
            let reply_to = if i == 0 || roll < 3 {
                None
            } else if roll == 3 {
                Some(format!("missing-{}", i))
            } else {
                Some(format!("m{}", next() as usize % i))
            };
            TestMessage {
                id: format!("m{}", i),
                time,
                reply_to,
            }
        })
        .collect()
}

#[test]
fn scenario_reply_attaches_under_parent() {
    let messages = [msg("A", 10, None), msg("C", 15, None), msg("B", 20, Some("A"))];
    let tree = build_tree(&messages);

    assert_eq!(root_ids(&tree), vec!["A", "C"]);

    let a = tree.find("A").unwrap();
    let replies: Vec<String> = tree
        .children(a)
        .unwrap()
        .filter_map(|id| tree.message(id))
        .map(|message| message.id.clone())
        .collect();
    assert_eq!(replies, vec!["B"]);

    let c = tree.find("C").unwrap();
    assert_eq!(tree.children(c).unwrap().count(), 0);
}

#[test]
fn scenario_unknown_target_is_promoted() {
    let messages = [msg("D", 5, Some("Z"))];
    let tree = build_tree(&messages);

    assert_eq!(root_ids(&tree), vec!["D"]);
}

#[test]
fn scenario_equal_timestamps_are_reproducible() {
    let messages = [msg("first", 10, None), msg("second", 10, None)];

    let expected = root_ids(&build_tree(&messages));
    assert_eq!(expected, vec!["second", "first"]);
    for _ in 0..10 {
        assert_eq!(root_ids(&build_tree(&messages)), expected);
    }
}

#[test]
fn scenario_empty_input() {
    let messages: [TestMessage; 0] = [];
    let tree = build_tree(&messages);

    assert!(tree.is_empty());
    assert_eq!(tree.root_count(), 0);

    let mut visits = 0;
    tree.traverse(|_, _| visits += 1);
    assert_eq!(visits, 0);
    assert!(tree.threads().is_empty());
}

#[test]
fn replies_are_time_ordered_under_parent() {
    let messages = [
        msg("root", 1, None),
        msg("late", 30, Some("root")),
        msg("early", 10, Some("root")),
        msg("middle", 20, Some("root")),
    ];
    let tree = build_tree(&messages);
    let root = tree.find("root").unwrap();

    let replies: Vec<i64> = tree
        .children(root)
        .unwrap()
        .filter_map(|id| tree.message(id))
        .map(|message| message.time)
        .collect();
    assert_eq!(replies, vec![10, 20, 30]);
}

#[test]
fn deep_reply_found_through_siblings_and_children() {
    // The parent of `leaf` sits in the reply subtree of a later root,
    // behind a sibling that has replies of its own.
    let messages = [
        msg("r1", 1, None),
        msg("r1-a", 2, Some("r1")),
        msg("r2", 3, None),
        msg("r2-a", 4, Some("r2")),
        msg("r2-a-x", 5, Some("r2-a")),
        msg("r2-b", 6, Some("r2")),
        msg("r2-b-y", 7, Some("r2-b")),
        msg("leaf", 8, Some("r2-b-y")),
    ];
    let tree = build_tree(&messages);
    let parents = parents(&tree);

    assert_eq!(parents["leaf"], Some("r2-b-y".to_string()));
    assert_eq!(parents["r2-b"], Some("r2".to_string()));
    assert_eq!(root_ids(&tree), vec!["r1", "r2"]);
}

#[test]
fn deep_thread_does_not_overflow() {
    let messages: Vec<TestMessage> = (0..2_000)
        .map(|i| {
            let reply_to = if i == 0 { None } else { Some(format!("n{}", i - 1)) };
            TestMessage {
                id: format!("n{}", i),
                time: i,
                reply_to,
            }
        })
        .collect();

    let tree = build_tree(&messages);
    assert_eq!(tree.len(), 2_000);
    assert_eq!(tree.root_count(), 1);

    let mut deepest = 0;
    tree.traverse(|depth, _| deepest = deepest.max(depth));
    assert_eq!(deepest, 1_999);
}

#[test]
fn forest_is_complete_for_random_inputs() {
    for seed in 1..40 {
        let messages = create_random_messages(seed, 60);
        let tree = build_tree(&messages);

        let mut visited = Vec::new();
        tree.traverse(|_, message| visited.push(message.id.clone()));
        assert_eq!(visited.len(), messages.len(), "seed {}", seed);

        let unique: HashSet<&String> = visited.iter().collect();
        assert_eq!(unique.len(), messages.len(), "duplicate node, seed {}", seed);
    }
}

#[test]
fn parents_and_roots_are_correct_for_random_inputs() {
    for seed in 1..40 {
        let messages = create_random_messages(seed, 60);
        let known: HashSet<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        let tree = build_tree(&messages);
        let parents = parents(&tree);

        for message in &messages {
            let expected = message
                .reply_to
                .as_deref()
                .filter(|target| known.contains(target))
                .map(str::to_string);
            assert_eq!(
                parents[&message.id], expected,
                "message {} (seed {})",
                message.id, seed
            );
        }
    }
}

#[test]
fn every_sibling_chain_is_time_ordered() {
    for seed in 1..20 {
        let messages = create_random_messages(seed, 50);
        let tree = build_tree(&messages);

        let roots: Vec<i64> = tree
            .roots()
            .filter_map(|id| tree.message(id))
            .map(|m| m.time)
            .collect();
        assert!(roots.windows(2).all(|pair| pair[0] <= pair[1]), "seed {}", seed);

        for (_, node) in tree.pre_order() {
            let times: Vec<i64> = tree
                .children(node)
                .unwrap()
                .filter_map(|id| tree.message(id))
                .map(|m| m.time)
                .collect();
            assert!(times.windows(2).all(|pair| pair[0] <= pair[1]), "seed {}", seed);
        }
    }
}

#[test]
fn thread_summaries_serialize() {
    let messages = [
        mail("a@example.com", 0, None),
        mail("b@example.com", 5, Some("<a@example.com>")),
        mail("c@example.com", 9, None),
    ];
    let ordered = OrderedMessageList::try_from_messages(messages.iter()).unwrap();
    let index = MessageIdIndex::from_messages(messages.iter());
    let tree = create_test_builder().build(&ordered, &index).unwrap();

    let threads = tree.threads();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].root_message_id, "a@example.com");
    assert_eq!(threads[0].subject.as_deref(), Some("Test a@example.com"));
    assert_eq!(threads[0].messages.len(), 2);

    let json = serde_json::to_value(&threads[0]).unwrap();
    assert_eq!(json["root_message_id"], "a@example.com");
    assert_eq!(json["start_date"], "2019-02-01T09:00:00Z");
    assert_eq!(json["last_date"], "2019-02-01T09:05:00Z");
    assert_eq!(json["messages"][1][0], "b@example.com");
    assert_eq!(json["messages"][1][1], 1);
}

#[test]
fn listing_indents_by_configured_width() {
    let messages = [
        mail("a@example.com", 0, None),
        mail("b@example.com", 5, Some("a@example.com")),
    ];
    let ordered = OrderedMessageList::try_from_messages(messages.iter()).unwrap();
    let index = MessageIdIndex::from_messages(messages.iter());
    let config = ThreadingConfig::from_lookup(|key| {
        (key == "THREADING_INDENT_WIDTH").then(|| "4".to_string())
    });
    let tree = ThreadTreeBuilder::new(config).build(&ordered, &index).unwrap();

    let mut out = Vec::new();
    tree.write_to(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("2019-02-01 09:00:00 <a@example.com>"));
    assert!(lines[1].starts_with("    2019-02-01 09:05:00 <b@example.com>"));
}

#[test]
fn messages_outlive_the_tree() {
    let messages = [msg("a", 1, None), msg("b", 2, Some("a"))];
    {
        let tree = build_tree(&messages);
        assert_eq!(tree.len(), 2);
    }
    assert_eq!(messages[1].reply_to.as_deref(), Some("a"));
}

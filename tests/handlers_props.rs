// tests/handlers_props.rs
use live_chat_analyzer::{append_to_history, score, Author, HistoryBuffer, Message};

fn msg(i: usize, text: &str) -> Message {
    Message {
        id: Some(format!("m{i}")),
        author: Author {
            name: Some("Ann".into()),
            id: Some("UC1".into()),
        },
        text: Some(text.to_string()),
        timestamp: Some("2024-05-01T12:00:00Z".into()),
    }
}

#[test]
fn score_table() {
    let cases: &[(String, f64)] = &[
        (String::new(), 0.0),
        ("short".into(), 0.0),
        ("x".repeat(100), 0.0),
        ("!".into(), 0.2),
        (format!("{}!", "x".repeat(99)), 0.2),
        ("x".repeat(101), 0.5),
        (format!("{}!", "x".repeat(100)), 0.7),
        (format!("!!{}", "y".repeat(200)), 0.7),
    ];
    for (text, expected) in cases {
        let r = score(&msg(0, text));
        assert!(
            (r.score - expected).abs() < 1e-9,
            "len {} -> {} (want {expected})",
            text.chars().count(),
            r.score
        );
        assert!(r.tags.is_empty());
    }
}

#[test]
fn history_length_is_min_n_100() {
    for n in [0usize, 1, 99, 100, 101, 250] {
        let mut h = HistoryBuffer::default();
        for i in 0..n {
            append_to_history(&msg(i, "hi"), &mut h);
        }
        assert_eq!(h.len(), n.min(100));

        let ids: Vec<String> = h.iter().filter_map(|m| m.id.clone()).collect();
        let expected: Vec<String> = (n.saturating_sub(100)..n).map(|i| format!("m{i}")).collect();
        assert_eq!(ids, expected);
    }
}

#[test]
fn history_entry_is_a_full_copy() {
    let mut h = HistoryBuffer::default();
    let m = msg(1, "copy me");
    append_to_history(&m, &mut h);
    assert_eq!(h.iter().next(), Some(&m));
}

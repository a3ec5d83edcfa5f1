//! Text rendering for command replies.
//!
//! Everything here is presentation only: truncation budgets and the `N/A`
//! placeholder never touch the stored records.

use std::fmt::Write as _;

use dsamaster_core::{ResourceLookup, Resolution, Snapshot};
use dsamaster_shared::{ResourceLink, TopicRecord};
use dsamaster_sources::Challenge;

pub(crate) const NOT_READY: &str =
    "Data not ready yet. Please wait for the first refresh to finish (or run `dsamaster refresh`).";
pub(crate) const TRY_AGAIN: &str = "Couldn't fetch a LeetCode problem right now. Try again later.";
pub(crate) const READ_FAILED: &str = "Something went wrong reading the topic data. Try again later.";

const MAX_SHORT_CHARS: usize = 1000;
const MAX_INLINE_CODE_CHARS: usize = 1000;
const TOP_LINKS: usize = 3;
const MISSING: &str = "N/A";

pub(crate) const HELP: &str = "\
Commands:
  !dsa <topic>        explanation, complexity, C++ snippet and top links
  !resources <topic>  every collected link for a topic
  !challenge          a random LeetCode problem
  !help               this message
  !quit               stop serving";

/// Reply for a topic lookup.
pub(crate) fn topic_reply(snapshot: Option<&Snapshot>, input: &str) -> String {
    let Some(snapshot) = snapshot else {
        return NOT_READY.to_string();
    };
    match snapshot.resolve(input) {
        Resolution::Found { record, .. } => topic_card(record),
        Resolution::NotFound { suggestions } => not_found(input, &suggestions),
    }
}

/// Reply for a resource-only lookup.
pub(crate) fn resources_reply(snapshot: Option<&Snapshot>, input: &str) -> String {
    let Some(snapshot) = snapshot else {
        return NOT_READY.to_string();
    };
    match snapshot.resources_for(input) {
        ResourceLookup::Found { title, links, .. } => resource_list(title, links),
        ResourceLookup::NotFound { suggestions } => not_found(input, &suggestions),
    }
}

pub(crate) fn challenge_reply(challenge: Option<&Challenge>) -> String {
    match challenge {
        Some(c) => format!("🎯 {}\nDifficulty: {}\n{}", c.title, c.difficulty, c.url),
        None => TRY_AGAIN.to_string(),
    }
}

pub(crate) fn topic_card(record: &TopicRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.title);
    let _ = writeln!(out, "{}", "=".repeat(record.title.chars().count().max(3)));

    if !record.short_description.is_empty() {
        let _ = writeln!(out, "{}\n", truncate(&record.short_description, MAX_SHORT_CHARS));
    }

    let _ = writeln!(out, "Time Complexity:  {}", or_missing(&record.time_complexity));
    let _ = writeln!(out, "Space Complexity: {}", or_missing(&record.space_complexity));

    if !record.code_sample.is_empty() {
        let _ = writeln!(out, "\nC++ Snippet:");
        if record.code_sample.chars().count() < MAX_INLINE_CODE_CHARS {
            let _ = writeln!(out, "```cpp\n{}\n```", record.code_sample);
        } else {
            let _ = writeln!(out, "Code is long, see the top resources.");
        }
    }

    if !record.resource_links.is_empty() {
        let _ = writeln!(out, "\nTop Resources:");
        for link in record.resource_links.iter().take(TOP_LINKS) {
            let _ = writeln!(out, "  - {}: {}", link.label, link.url);
        }
    }

    out.trim_end().to_string()
}

pub(crate) fn resource_list(title: &str, links: &[ResourceLink]) -> String {
    if links.is_empty() {
        return format!("No resources collected for {title} yet.");
    }
    let mut out = format!("Resources for {title}:");
    for link in links {
        let _ = write!(out, "\n  - {}: {}", link.label, link.url);
    }
    out
}

pub(crate) fn not_found(input: &str, suggestions: &[String]) -> String {
    let input = input.trim();
    if suggestions.is_empty() {
        format!("❌ Topic \"{input}\" not found. Try a simpler name.")
    } else {
        format!(
            "❌ Topic \"{input}\" not found. Did you mean: {}?",
            suggestions.join(", ")
        )
    }
}

fn or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        MISSING
    } else {
        value
    }
}

/// Cut to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => {
            let mut cut = text[..idx].trim_end().to_string();
            cut.push('…');
            cut
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsamaster_shared::{ResourceTable, TopicTable};

    fn record() -> TopicRecord {
        TopicRecord {
            title: "Binary Search".into(),
            short_description: "Halves the search range each step.".into(),
            time_complexity: "O(log n)".into(),
            space_complexity: String::new(),
            code_sample: "int bs();".into(),
            resource_links: (1..=5)
                .map(|i| ResourceLink::new(format!("L{i}"), format!("https://l.example/{i}")))
                .collect(),
        }
    }

    fn snapshot() -> Snapshot {
        let mut topics = TopicTable::new();
        let mut resources = ResourceTable::new();
        resources.insert("binarysearch".into(), record().resource_links);
        topics.insert("binarysearch".into(), record());
        Snapshot::new(topics, resources)
    }

    #[test]
    fn card_shows_placeholder_and_top_three_links() {
        let card = topic_card(&record());
        assert!(card.contains("Space Complexity: N/A"));
        assert!(card.contains("Time Complexity:  O(log n)"));
        assert!(card.contains("```cpp\nint bs();\n```"));
        assert!(card.contains("L3: https://l.example/3"));
        assert!(!card.contains("L4"));
    }

    #[test]
    fn long_code_is_replaced_by_pointer() {
        let mut rec = record();
        rec.code_sample = "x".repeat(1000);
        let card = topic_card(&rec);
        assert!(card.contains("Code is long"));
        assert!(!card.contains("```cpp"));
    }

    #[test]
    fn long_description_is_truncated() {
        let mut rec = record();
        rec.short_description = "é".repeat(1500);
        let card = topic_card(&rec);
        assert!(card.contains(&format!("{}…", "é".repeat(1000))));
        assert!(!card.contains(&"é".repeat(1001)));
    }

    #[test]
    fn replies_cover_every_outcome() {
        let snap = snapshot();
        assert_eq!(topic_reply(None, "heap"), NOT_READY);
        assert!(topic_reply(Some(&snap), "binary serch").starts_with("Binary Search"));
        assert!(topic_reply(Some(&snap), "quantum stuff").contains("not found"));

        let all = resources_reply(Some(&snap), "binary-search");
        assert!(all.starts_with("Resources for Binary Search:"));
        assert!(all.contains("L5: https://l.example/5"));
    }

    #[test]
    fn suggestions_are_listed() {
        let reply = not_found(" hepa sort ", &["Heap Sort".into(), "Heap".into()]);
        assert_eq!(reply, "❌ Topic \"hepa sort\" not found. Did you mean: Heap Sort, Heap?");
    }

    #[test]
    fn challenge_falls_back_to_notice() {
        assert_eq!(challenge_reply(None), TRY_AGAIN);
        let c = Challenge {
            title: "Two Sum".into(),
            difficulty: "Easy".into(),
            url: "https://leetcode.com/problems/two-sum/".into(),
        };
        assert!(challenge_reply(Some(&c)).ends_with("https://leetcode.com/problems/two-sum/"));
    }
}

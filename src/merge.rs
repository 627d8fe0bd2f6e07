//! Combining the two collections into one feed.

use std::cmp::Ordering;

use crate::source::Entry;

/// Merge two newest-first sequences into one newest-first feed.
///
/// A stable two-way merge: on equal dates the summary comes before the
/// novel, and each input keeps its own relative order.  Total over any two
/// inputs, including empty ones.  Ids are not de-duplicated.
pub fn merge(summaries: Vec<Entry>, novels: Vec<Entry>) -> Vec<Entry> {
    let mut feed = Vec::with_capacity(summaries.len() + novels.len());
    let mut left = summaries.into_iter().peekable();
    let mut right = novels.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.cmp_newest_first(r) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        feed.extend(if take_left { left.next() } else { right.next() });
    }

    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn entry(id: &str, source: Source, day: Option<u32>) -> Entry {
        Entry {
            id: id.to_string(),
            date: day.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()),
            title: id.to_string(),
            content: String::new(),
            tags: Vec::new(),
            image_url: None,
            source,
        }
    }

    fn ids(feed: &[Entry]) -> Vec<&str> {
        feed.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn interleaves_by_date() {
        let summaries = vec![
            entry("s2", Source::Summary, Some(2)),
            entry("s1", Source::Summary, Some(1)),
        ];
        let novels = vec![entry("n3", Source::Novel, Some(3))];

        let feed = merge(summaries, novels);

        assert_eq!(ids(&feed), vec!["n3", "s2", "s1"]);
        assert_eq!(feed[0].source, Source::Novel);
        assert_eq!(feed[1].source, Source::Summary);
    }

    #[test]
    fn length_is_sum_of_inputs_and_output_is_sorted() {
        let summaries = vec![
            entry("s9", Source::Summary, Some(9)),
            entry("s5", Source::Summary, Some(5)),
            entry("s4", Source::Summary, Some(4)),
            entry("s1", Source::Summary, Some(1)),
        ];
        let novels = vec![
            entry("n8", Source::Novel, Some(8)),
            entry("n4", Source::Novel, Some(4)),
            entry("n2", Source::Novel, Some(2)),
        ];

        let feed = merge(summaries, novels);

        assert_eq!(feed.len(), 7);
        assert!(feed
            .windows(2)
            .all(|w| w[0].cmp_newest_first(&w[1]) != Ordering::Greater));
    }

    #[test]
    fn ties_keep_summary_before_novel() {
        let feed = merge(
            vec![entry("s", Source::Summary, Some(4))],
            vec![entry("n", Source::Novel, Some(4))],
        );
        assert_eq!(ids(&feed), vec!["s", "n"]);
    }

    #[test]
    fn undated_entries_sink_to_the_bottom() {
        let feed = merge(
            vec![entry("s-undated", Source::Summary, None)],
            vec![entry("n1", Source::Novel, Some(1))],
        );
        assert_eq!(ids(&feed), vec!["n1", "s-undated"]);
    }

    #[test]
    fn empty_inputs() {
        assert!(merge(Vec::new(), Vec::new()).is_empty());

        let only_novels = merge(Vec::new(), vec![entry("n1", Source::Novel, Some(1))]);
        assert_eq!(ids(&only_novels), vec!["n1"]);

        let only_summaries = merge(vec![entry("s1", Source::Summary, Some(1))], Vec::new());
        assert_eq!(ids(&only_summaries), vec!["s1"]);
    }

    #[test]
    fn duplicate_ids_across_sources_are_kept() {
        let feed = merge(
            vec![entry("same", Source::Summary, Some(2))],
            vec![entry("same", Source::Novel, Some(1))],
        );
        assert_eq!(feed.len(), 2);
    }

    // -- properties over generated collections ------------------------------

    /// A collection as the store returns it: newest first, undated last.
    fn collection(prefix: &'static str, source: Source) -> impl Strategy<Value = Vec<Entry>> {
        prop::collection::vec(prop::option::of(1u32..=28), 0..12).prop_map(move |days| {
            let mut entries: Vec<Entry> = days
                .into_iter()
                .enumerate()
                .map(|(i, day)| entry(&format!("{prefix}{i}"), source, day))
                .collect();
            entries.sort_by(Entry::cmp_newest_first);
            entries
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Every input entry comes out exactly once, in newest-first order.
        #[test]
        fn merged_feed_is_sorted_and_complete(
            summaries in collection("s", Source::Summary),
            novels in collection("n", Source::Novel),
        ) {
            let mut expected: Vec<String> = summaries.iter().chain(&novels).map(|e| e.id.clone()).collect();
            let total = summaries.len() + novels.len();

            let feed = merge(summaries, novels);

            prop_assert_eq!(feed.len(), total);
            prop_assert!(feed
                .windows(2)
                .all(|w| w[0].cmp_newest_first(&w[1]) != Ordering::Greater));

            let mut got: Vec<String> = feed.iter().map(|e| e.id.clone()).collect();
            expected.sort();
            got.sort();
            prop_assert_eq!(got, expected);
        }

        /// Each source's own order survives the merge.
        #[test]
        fn merge_keeps_each_source_in_order(
            summaries in collection("s", Source::Summary),
            novels in collection("n", Source::Novel),
        ) {
            let summary_ids: Vec<String> = summaries.iter().map(|e| e.id.clone()).collect();
            let novel_ids: Vec<String> = novels.iter().map(|e| e.id.clone()).collect();

            let feed = merge(summaries, novels);

            let of = |source: Source| -> Vec<String> {
                feed.iter().filter(|e| e.source == source).map(|e| e.id.clone()).collect()
            };
            prop_assert_eq!(of(Source::Summary), summary_ids);
            prop_assert_eq!(of(Source::Novel), novel_ids);
        }
    }
}

//! Prefix tree over code points for longest-match grapheme segmentation.

use std::collections::HashMap;

#[derive(Debug, PartialEq)]
pub enum TrieLookupResult {
    None,
    Prefix,
    Exact(usize),
    ExactAndPrefix(usize),
}

/// A piece of a segmented word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A registered grapheme and its id.
    Grapheme { id: usize, text: &'a str },
    /// One code point no grapheme covers.
    Unmatched(&'a str),
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<char, usize>,
    /// Index of the grapheme ending here, in insertion order.
    terminal: Option<usize>,
}

/// Grapheme tree built once from a profile's inventory and read-only after.
#[derive(Debug)]
pub struct GraphemeTrie {
    nodes: Vec<Node>,
    len: usize,
}

impl GraphemeTrie {
    /// Build from graphemes in profile order. A grapheme's id is its position
    /// in `graphemes`; a repeated grapheme keeps its first id.
    pub fn build<I, S>(graphemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = GraphemeTrie {
            nodes: vec![Node::default()],
            len: 0,
        };
        for (id, grapheme) in graphemes.into_iter().enumerate() {
            trie.insert(grapheme.as_ref(), id);
        }
        trie
    }

    fn insert(&mut self, grapheme: &str, id: usize) {
        if grapheme.is_empty() {
            return;
        }
        let mut node = 0;
        for c in grapheme.chars() {
            node = match self.nodes[node].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(c, next);
                    next
                }
            };
        }
        if self.nodes[node].terminal.is_none() {
            self.nodes[node].terminal = Some(id);
            self.len += 1;
        }
    }

    /// Number of registered graphemes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn lookup(&self, key: &str) -> TrieLookupResult {
        let mut node = 0;
        for c in key.chars() {
            match self.nodes[node].children.get(&c) {
                Some(&next) => node = next,
                None => return TrieLookupResult::None,
            }
        }
        let n = &self.nodes[node];
        match (n.terminal, !n.children.is_empty()) {
            (None, false) => TrieLookupResult::None,
            (None, true) => TrieLookupResult::Prefix,
            (Some(id), false) => TrieLookupResult::Exact(id),
            (Some(id), true) => TrieLookupResult::ExactAndPrefix(id),
        }
    }

    pub fn contains(&self, grapheme: &str) -> bool {
        matches!(
            self.lookup(grapheme),
            TrieLookupResult::Exact(_) | TrieLookupResult::ExactAndPrefix(_)
        )
    }

    /// Segment `word` into registered graphemes and unmatched code points.
    ///
    /// From every position the walk follows the trie as far as the input
    /// allows; the last terminal reached (the longest grapheme) decides the
    /// segment, and segmentation continues after it. Where that chain stops
    /// short of the end, the single code point there is unmatched and the
    /// chain restarts right after it.
    pub fn segment<'a>(&self, word: &'a str) -> Vec<Segment<'a>> {
        let bounds: Vec<usize> = word
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(word.len()))
            .collect();
        let chars: Vec<char> = word.chars().collect();
        let n = chars.len();

        // step[pos]: (end, id) of the last terminal reachable from pos.
        let mut step: Vec<Option<(usize, usize)>> = vec![None; n + 1];
        for pos in (0..n).rev() {
            let mut node = 0;
            for (offset, c) in chars[pos..].iter().enumerate() {
                match self.nodes[node].children.get(c) {
                    Some(&next) => node = next,
                    None => break,
                }
                if let Some(id) = self.nodes[node].terminal {
                    step[pos] = Some((pos + offset + 1, id));
                }
            }
        }

        let mut segments = Vec::new();
        let mut pos = 0;
        while pos < n {
            while let Some((end, id)) = step[pos] {
                segments.push(Segment::Grapheme {
                    id,
                    text: &word[bounds[pos]..bounds[end]],
                });
                pos = end;
            }
            if pos < n {
                segments.push(Segment::Unmatched(&word[bounds[pos]..bounds[pos + 1]]));
                pos += 1;
            }
        }
        segments
    }

    /// Segment `word`, replacing every unmatched code point with the result
    /// of `on_error`. An error from `on_error` aborts the parse.
    pub fn parse<F, E>(&self, word: &str, mut on_error: F) -> Result<Vec<String>, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        self.segment(word)
            .into_iter()
            .map(|segment| match segment {
                Segment::Grapheme { text, .. } => Ok(text.to_string()),
                Segment::Unmatched(c) => on_error(c),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    const MARKER: &str = "\u{FFFD}";

    fn replace(_: &str) -> Result<String, Infallible> {
        Ok(MARKER.to_string())
    }

    fn parse(trie: &GraphemeTrie, word: &str) -> Vec<String> {
        trie.parse(word, replace).unwrap()
    }

    #[test]
    fn test_longest_match() {
        let trie = GraphemeTrie::build(["t", "o", "oː"]);
        assert_eq!(parse(&trie, "toːt"), vec!["t", "oː", "t"]);
    }

    #[test]
    fn test_error_replacement() {
        let trie = GraphemeTrie::build(["t", "o", "oː"]);
        assert_eq!(parse(&trie, "toːt="), vec!["t", "oː", "t", MARKER]);
        let hash = trie
            .parse("toːt=", |_| Ok::<_, Infallible>("#".to_string()))
            .unwrap();
        assert_eq!(hash, vec!["t", "oː", "t", "#"]);
        assert_eq!(parse(&trie, "toːt=oː"), vec!["t", "oː", "t", MARKER, "oː"]);
    }

    #[test]
    fn test_empty_word() {
        let trie = GraphemeTrie::build(["a"]);
        assert!(parse(&trie, "").is_empty());
    }

    #[test]
    fn test_empty_trie_replaces_everything() {
        let trie = GraphemeTrie::build(Vec::<String>::new());
        assert!(trie.is_empty());
        assert_eq!(parse(&trie, "ab"), vec![MARKER, MARKER]);
    }

    #[test]
    fn test_leading_gap() {
        let trie = GraphemeTrie::build(["a", "b"]);
        assert_eq!(parse(&trie, "xab"), vec![MARKER, "a", "b"]);
    }

    #[test]
    fn test_last_terminal_wins() {
        // "ab" is the later terminal on the walk, so it is kept even though
        // "a" + "bc" would have covered the whole word.
        let trie = GraphemeTrie::build(["a", "ab", "bc"]);
        assert_eq!(parse(&trie, "abc"), vec!["ab", MARKER]);
    }

    #[test]
    fn test_prefix_without_terminal_backs_off() {
        let trie = GraphemeTrie::build(["a", "abc"]);
        assert_eq!(parse(&trie, "abd"), vec!["a", MARKER, MARKER]);
    }

    #[test]
    fn test_error_propagates() {
        let trie = GraphemeTrie::build(["a"]);
        let err = trie
            .parse("ax", |c| Err::<String, _>(c.to_string()))
            .unwrap_err();
        assert_eq!(err, "x");
    }

    #[test]
    fn test_normalization_sensitive() {
        let trie = GraphemeTrie::build(["\u{f1}"]);
        assert_eq!(parse(&trie, "n\u{303}"), vec![MARKER, MARKER]);
        assert_eq!(parse(&trie, "\u{f1}"), vec!["\u{f1}"]);
    }

    #[test]
    fn test_segment() {
        let trie = GraphemeTrie::build(["t", "o", "oː"]);
        assert_eq!(
            trie.segment("toː="),
            vec![
                Segment::Grapheme { id: 0, text: "t" },
                Segment::Grapheme { id: 2, text: "oː" },
                Segment::Unmatched("="),
            ]
        );
    }

    #[test]
    fn test_lookup() {
        let trie = GraphemeTrie::build(["c", "ch", "sch"]);
        assert_eq!(trie.lookup("c"), TrieLookupResult::ExactAndPrefix(0));
        assert_eq!(trie.lookup("ch"), TrieLookupResult::Exact(1));
        assert_eq!(trie.lookup("sc"), TrieLookupResult::Prefix);
        assert_eq!(trie.lookup("x"), TrieLookupResult::None);
        assert_eq!(trie.lookup(""), TrieLookupResult::Prefix);
        assert!(trie.contains("sch"));
        assert!(!trie.contains("s"));
        assert_eq!(trie.len(), 3);
    }

    #[test]
    fn test_duplicate_keeps_first_id() {
        let trie = GraphemeTrie::build(["a", "b", "a"]);
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.lookup("a"), TrieLookupResult::Exact(0));
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn concatenation_reconstructs_word(
                graphemes in proptest::collection::vec("[abc]{1,3}", 0..8),
                word in "[abcd]{0,16}",
            ) {
                let trie = GraphemeTrie::build(&graphemes);
                let tokens = trie
                    .parse(&word, |c| Ok::<_, Infallible>(c.to_string()))
                    .unwrap();
                prop_assert_eq!(tokens.concat(), word);
            }

            #[test]
            fn error_replaces_exactly_one_code_point(word in "[a-z=]{0,16}") {
                let trie = GraphemeTrie::build(["a", "e", "i", "o", "u"]);
                let tokens = trie
                    .parse(&word, |_| Ok::<_, Infallible>("#".to_string()))
                    .unwrap();
                let expected: String = word
                    .chars()
                    .map(|c| if "aeiou".contains(c) { c } else { '#' })
                    .collect();
                prop_assert_eq!(tokens.concat(), expected);
            }
        }
    }
}

//! Property-based tests for the manifest reader.
//!
//! These tests use proptest to generate random manifests and verify that
//! malformed lines never disturb the well-formed ones around them.

#[cfg(test)]
mod proptest_tests {
    use crate::error::Error;
    use crate::manifest::{self, ManifestEntry};
    use proptest::prelude::*;

    fn token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._-]{1,12}"
    }

    fn separator() -> impl Strategy<Value = String> {
        "[ \t]{1,4}"
    }

    /// A line that is either a valid triple or has the wrong token count.
    #[derive(Debug, Clone)]
    enum Line {
        Valid(String, String, String),
        Invalid(Vec<String>),
    }

    fn line() -> impl Strategy<Value = Line> {
        prop_oneof![
            (token(), token(), token()).prop_map(|(o, r, c)| Line::Valid(o, r, c)),
            prop_oneof![
                prop::collection::vec(token(), 1..3),
                prop::collection::vec(token(), 4..7),
            ]
            .prop_map(Line::Invalid),
        ]
    }

    proptest! {
        /// Property: any three whitespace-separated tokens parse back exactly
        #[test]
        fn three_tokens_always_parse(
            org in token(),
            repo in token(),
            commit in token(),
            sep1 in separator(),
            sep2 in separator(),
        ) {
            let line = format!("{}{}{}{}{}", org, sep1, repo, sep2, commit);
            let parsed = ManifestEntry::parse_line(&line);
            prop_assert_eq!(
                parsed,
                Some(ManifestEntry { organization: org, repository: repo, commit })
            );
        }

        /// Property: any other token count is rejected
        #[test]
        fn wrong_token_count_rejected(tokens in prop::collection::vec(token(), 0..10)) {
            prop_assume!(tokens.len() != 3);
            let line = tokens.join(" ");
            prop_assert!(ManifestEntry::parse_line(&line).is_none());
        }

        /// Property: well-formed lines come out in order, malformed lines are
        /// flagged individually, and neither affects the other
        #[test]
        fn malformed_lines_are_isolated(lines in prop::collection::vec(line(), 0..20)) {
            let text: String = lines
                .iter()
                .map(|line| match line {
                    Line::Valid(o, r, c) => format!("{} {} {}\n", o, r, c),
                    Line::Invalid(tokens) => format!("{}\n", tokens.join(" ")),
                })
                .collect();

            let results: Vec<_> = manifest::parse(&text).collect();
            prop_assert_eq!(results.len(), lines.len());

            for (index, (line, result)) in lines.iter().zip(&results).enumerate() {
                match (line, result) {
                    (Line::Valid(o, r, c), Ok(entry)) => {
                        prop_assert_eq!(&entry.organization, o);
                        prop_assert_eq!(&entry.repository, r);
                        prop_assert_eq!(&entry.commit, c);
                    }
                    (Line::Invalid(_), Err(Error::MalformedEntry { line_number, .. })) => {
                        prop_assert_eq!(*line_number, index + 1);
                    }
                    (line, result) => {
                        prop_assert!(false, "line {:?} produced {:?}", line, result);
                    }
                }
            }
        }

        /// Property: blank lines never produce results
        #[test]
        fn blank_lines_ignored(blanks in prop::collection::vec("[ \t]{0,5}", 0..10)) {
            let text = blanks.join("\n");
            prop_assert_eq!(manifest::parse(&text).count(), 0);
        }
    }
}

use std::collections::BTreeSet;

use thiserror::Error;

const SEPARATORS: &[char] = &[',', ' ', '\t', '\n'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    All,
    Single(u32),
    Many(Vec<u32>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid relay number '{0}'")]
    InvalidRelayNumber(String),

    #[error("Relay number {relay} out of range {first}..={last}")]
    OutOfRange { relay: u32, first: u32, last: u32 },

    #[error("Relay lists are not accepted here: '{0}'")]
    ListNotAllowed(String),
}

pub fn parse_selection(input: &str) -> Result<Selection, SelectionError> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(Selection::All);
    }

    // any separator, even trailing whitespace, makes the target a list
    if !input.contains(SEPARATORS) {
        return match input.parse::<u32>() {
            Ok(relay) => Ok(Selection::Single(relay)),
            Err(_) => Err(SelectionError::InvalidRelayNumber(input.to_string())),
        };
    }

    // unparsable tokens collapse to 0, which never names a relay
    let relays: BTreeSet<u32> = input
        .split(SEPARATORS)
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<u32>().unwrap_or(0))
        .collect();

    Ok(Selection::Many(relays.into_iter().collect()))
}

pub fn parse_status_target(input: &str) -> Result<Selection, SelectionError> {
    match parse_selection(input)? {
        Selection::Many(_) => Err(SelectionError::ListNotAllowed(input.to_string())),
        selection => Ok(selection),
    }
}

pub fn validate(selection: &Selection, first: u32, count: usize) -> Result<(), SelectionError> {
    match selection {
        Selection::Single(relay) if !in_range(*relay, first, count) => {
            Err(SelectionError::OutOfRange {
                relay: *relay,
                first,
                last: last_relay(first, count),
            })
        }
        _ => Ok(()),
    }
}

impl Selection {
    pub fn is_all(&self) -> bool {
        *self == Selection::All
    }

    pub fn indices(&self, first: u32, count: usize) -> Vec<usize> {
        let to_index = |relay: &u32| (*relay - first) as usize;
        match self {
            Selection::All => (0..count).collect(),
            Selection::Single(relay) => Some(relay)
                .filter(|relay| in_range(**relay, first, count))
                .map(to_index)
                .into_iter()
                .collect(),
            Selection::Many(relays) => relays
                .iter()
                .filter(|relay| in_range(**relay, first, count))
                .map(to_index)
                .collect(),
        }
    }
}

fn in_range(relay: u32, first: u32, count: usize) -> bool {
    count > 0 && relay >= first && relay <= last_relay(first, count)
}

fn last_relay(first: u32, count: usize) -> u32 {
    first + (count as u32).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_set(selection: Selection) -> BTreeSet<u32> {
        match selection {
            Selection::Many(relays) => relays.into_iter().collect(),
            other => panic!("expected a relay list, got {:?}", other),
        }
    }

    #[test]
    fn test_all_keyword_ignores_case() {
        assert_eq!(parse_selection("all"), Ok(Selection::All));
        assert_eq!(parse_selection("ALL"), Ok(Selection::All));
        assert_eq!(parse_selection("aLl"), Ok(Selection::All));
        assert_ne!(parse_selection("all"), parse_selection("4"));
    }

    #[test]
    fn test_single_relay() {
        assert_eq!(parse_selection("4"), Ok(Selection::Single(4)));
        assert_eq!(
            parse_selection("four"),
            Err(SelectionError::InvalidRelayNumber("four".to_string()))
        );
        assert!(parse_selection("").is_err());
    }

    #[test]
    fn test_list_collapses_duplicates() {
        let relays = as_set(parse_selection("2,4,2").unwrap());
        assert_eq!(relays, BTreeSet::from([2, 4]));
    }

    #[test]
    fn test_list_mixed_separators_and_junk() {
        let relays = as_set(parse_selection("1, 3\tx\n3,,").unwrap());
        assert_eq!(relays, BTreeSet::from([0, 1, 3]));
    }

    #[test]
    fn test_trailing_whitespace_makes_a_list() {
        assert_eq!(parse_selection("9\n"), Ok(Selection::Many(vec![9])));
        assert_eq!(parse_selection("9 "), Ok(Selection::Many(vec![9])));
        assert!(validate(&parse_selection("9 ").unwrap(), 1, 4).is_ok());
        assert!(Selection::Many(vec![9]).indices(1, 4).is_empty());
    }

    #[test]
    fn test_validate_single() {
        assert!(validate(&Selection::Single(4), 1, 4).is_ok());
        assert!(validate(&Selection::Single(4), 1, 3).is_err());
        assert_eq!(
            validate(&Selection::Single(9), 1, 4),
            Err(SelectionError::OutOfRange {
                relay: 9,
                first: 1,
                last: 4
            })
        );
        assert!(validate(&Selection::Single(0), 1, 4).is_err());
    }

    #[test]
    fn test_validate_lists_never_fail() {
        assert!(validate(&Selection::Many(vec![0, 9, 2]), 1, 4).is_ok());
        assert!(validate(&Selection::All, 1, 4).is_ok());
    }

    #[test]
    fn test_indices_skip_out_of_range() {
        let mut indices = Selection::Many(vec![0, 2, 4, 9]).indices(1, 4);
        indices.sort_unstable();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(Selection::All.indices(1, 4), vec![0, 1, 2, 3]);
        assert!(Selection::Single(5).indices(1, 4).is_empty());
    }

    #[test]
    fn test_status_target_rejects_lists() {
        assert_eq!(parse_status_target("all"), Ok(Selection::All));
        assert_eq!(parse_status_target("3"), Ok(Selection::Single(3)));
        assert!(matches!(
            parse_status_target("1,2"),
            Err(SelectionError::ListNotAllowed(_))
        ));
    }
}

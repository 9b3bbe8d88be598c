//! Natural ordering of labels, `Play_vo_2` before `Play_vo_10`

use std::{cmp::Ordering, iter::Peekable, str::Chars};

fn take_number(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

fn compare_numbers(left: &str, right: &str) -> Ordering {
    let left_value = left.trim_start_matches('0');
    let right_value = right.trim_start_matches('0');
    left_value
        .len()
        .cmp(&right_value.len())
        .then_with(|| left_value.cmp(right_value))
        // fewer leading zeros first
        .then_with(|| left.len().cmp(&right.len()))
}

/// Compare runs of digits by value and everything else without case
///
/// Labels equal under that rule fall back to plain string order, so the ordering is total.
///
/// ```
/// use std::cmp::Ordering;
/// use lol_bnk::sort::natural_cmp;
///
/// assert_eq!(natural_cmp("Play_vo_2", "Play_vo_10"), Ordering::Less);
/// assert_eq!(natural_cmp("play_b", "Play_C"), Ordering::Less);
/// ```
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut lefts = left.chars().peekable();
    let mut rights = right.chars().peekable();

    loop {
        let ordering = match (lefts.peek().copied(), rights.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                compare_numbers(&take_number(&mut lefts), &take_number(&mut rights))
            }
            (Some(l), Some(r)) => {
                lefts.next();
                rights.next();
                l.to_lowercase().cmp(r.to_lowercase())
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.cmp(right)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::natural_cmp;

    #[test]
    fn sort_labels() {
        let mut labels = vec![
            "Play_vo_10",
            "Play_vo_2",
            "123456",
            "play_vo_1",
            "98",
            "Play_sfx",
            "Play_vo_02",
        ];
        labels.sort_by(|a, b| natural_cmp(a, b));

        assert_eq!(
            labels,
            [
                "98",
                "123456",
                "Play_sfx",
                "play_vo_1",
                "Play_vo_2",
                "Play_vo_02",
                "Play_vo_10",
            ]
        );
    }
}

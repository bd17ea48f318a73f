use model::line::{Direction, Mode};
use phf::phf_map;

/// The only direction label encoded as `0`.
pub const SUBURB_LABEL: &str = "Suburb";

/// Mode letters used in composite line keys.
pub static MODE_TABLE: phf::Map<&'static str, Mode> = phf_map! {
    "m" => Mode::Metro,
    "b" => Mode::Bus,
    "t" => Mode::Tram,
};

/// `Suburb` is the suburb direction, every other label (`City` included) is
/// the city direction.
pub fn direction_from_label(label: &str) -> Direction {
    if label == SUBURB_LABEL {
        Direction::Suburb
    } else {
        Direction::City
    }
}

pub fn mode_from_letter(letter: &str) -> Option<Mode> {
    MODE_TABLE.get(letter).copied()
}

/// Drops a single trailing ASCII letter, e.g. `123a` -> `123`.
pub fn strip_trailing_letter(code: &str) -> &str {
    match code.chars().last() {
        Some(last) if last.is_ascii_alphabetic() => &code[..code.len() - 1],
        _ => code,
    }
}

/// Numeric part of a code which may carry a trailing letter. `None` when what
/// remains is not a number, e.g. for the night line `N12`.
pub fn numeric_prefix(code: &str) -> Option<u32> {
    let digits = strip_trailing_letter(code.trim());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_suburb_maps_to_zero() {
        assert_eq!(direction_from_label("Suburb").as_flag(), 0);
        assert_eq!(direction_from_label("City").as_flag(), 1);
        for label in ["", "suburb", "SUBURB", "Suburbs", "Gare", " Suburb"] {
            assert_eq!(direction_from_label(label).as_flag(), 1, "{label:?}");
        }
    }

    #[test]
    fn mode_letters_are_a_closed_set() {
        assert_eq!(mode_from_letter("m"), Some(Mode::Metro));
        assert_eq!(mode_from_letter("b"), Some(Mode::Bus));
        assert_eq!(mode_from_letter("t"), Some(Mode::Tram));
        for letter in ["x", "M", "n", "", "mb"] {
            assert_eq!(mode_from_letter(letter), None, "{letter:?}");
        }
    }

    #[test]
    fn trailing_letter_is_stripped() {
        assert_eq!(strip_trailing_letter("123a"), "123");
        assert_eq!(strip_trailing_letter("123"), "123");
        assert_eq!(strip_trailing_letter("N12"), "N12");
        assert_eq!(strip_trailing_letter(""), "");
    }

    #[test]
    fn numeric_prefixes() {
        assert_eq!(numeric_prefix("123a"), Some(123));
        assert_eq!(numeric_prefix("0089"), Some(89));
        assert_eq!(numeric_prefix("5710F"), Some(5710));
        assert_eq!(numeric_prefix("N12"), None);
        assert_eq!(numeric_prefix("a"), None);
        assert_eq!(numeric_prefix(""), None);
    }
}

use super::*;

#[test]
fn valid_value_returns_none() {
    let filter = InputFilter::default();
    assert_eq!(filter.filter("Hello, world!"), None);
}

#[test]
fn disallowed_characters_are_dropped() {
    let filter = InputFilter::new(&[ALPHABET_LOWER], None);
    assert_eq!(filter.filter("ab1c-D"), Some("abc".to_owned()));
}

#[test]
fn sets_are_combined() {
    let filter = InputFilter::new(&[NUMERIC, SPACE], None);
    assert_eq!(filter.filter("12 ab 34"), Some("12  34".to_owned()));
}

#[test]
fn empty_sets_mean_all() {
    assert_eq!(InputFilter::new(&[], None), InputFilter::new(&[ALL], None));
}

#[test]
fn max_length_truncates_after_filtering() {
    let filter = InputFilter::new(&[NUMERIC], Some(4));
    assert_eq!(filter.filter("2-0-2-4-9"), Some("2024".to_owned()));
}

#[test]
fn max_length_alone_truncates() {
    let filter = InputFilter::new(&[], Some(3));
    assert_eq!(filter.filter("abcd"), Some("abc".to_owned()));
    assert_eq!(filter.filter("abc"), None);
}

#[test]
fn unicode_outside_set_is_dropped() {
    let filter = InputFilter::default();
    assert_eq!(filter.filter("café"), Some("caf".to_owned()));
}

#[test]
fn all_is_union_of_named_sets() {
    let union: String = [SPACE, SPECIAL_CHARACTERS, NUMERIC, ALPHABET_UPPER, ALPHABET_LOWER].concat();
    assert_eq!(ALL, union);
}

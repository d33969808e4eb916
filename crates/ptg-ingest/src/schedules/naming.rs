//! Display names for trips, and the "first non-empty" fallback used for
//! train numbers and platforms.

/// First candidate that is present and not the empty string.
///
/// `None` and `Some("")` are both treated as missing; order is priority order.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
}

/// Combine a train number with a train name into one short name.
///
/// A number already present in the name is not repeated.
pub fn merge_number_and_name(number: &str, name: &str) -> String {
    match (number.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => number.to_string(),
        (false, false) if name.contains(number) => name.to_string(),
        (false, false) => format!("{number} {name}"),
    }
}

/// Title-case a name published in capitals: `"BOLESŁAW PRUS"` -> `"Bolesław Prus"`.
///
/// The first letter of every run of alphabetic characters is upper-cased and
/// the rest lower-cased.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

//! `*` wildcard matching for the `=` operator

/// match `subject` against `pattern`, where `*` stands for any run of characters
///
/// fragments between stars are located greedily by first occurrence, and a
/// leading literal fragment must sit at the very start of the subject, so
/// `abc*` does not match `xabc`.
pub fn wildcard_match(pattern: &str, subject: &str) -> bool {
    if pattern.is_empty() {
        return subject.is_empty();
    }

    let fragments: Vec<&str> = pattern.split('*').collect();
    let last = fragments.len() - 1;
    let mut rest = subject;

    for (i, fragment) in fragments.iter().enumerate() {
        // pattern ends with '*'
        if i == last && fragment.is_empty() {
            return true;
        }
        let Some(at) = rest.find(fragment) else {
            return false;
        };
        if i == 0 && !fragment.is_empty() && at != 0 {
            return false;
        }
        rest = &rest[at + fragment.len()..];
    }

    rest.is_empty()
}

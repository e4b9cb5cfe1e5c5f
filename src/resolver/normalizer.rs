//! Text normalizer - reduces free text to a compact `[a-z0-9]*` matching key.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]").expect("static pattern is valid");
}

/// Lower-case `s` and drop every character that is not an ASCII letter or digit.
///
/// "Total Sales!" -> "totalsales". Applied identically to queries and column
/// names so substring containment between them is meaningful.
pub fn normalize(s: &str) -> String {
    NON_ALNUM.replace_all(&s.to_lowercase(), "").into_owned()
}

//! psql option grammar
//!
//! Which psql options take a value, in short and long form. The username
//! scan has to skip option values exactly the way psql's getopt does, even
//! for options it does not care about, otherwise a value such as the `mydb`
//! in `-d mydb` would be mistaken for a positional argument.
//!
//! Keep these tables in sync with psql's `parse_psql_options`:
//! getopt string `aAbc:d:eEf:F:h:HlL:no:p:P:qR:sStT:U:v:VwWxXz?01`.

/// Short option carrying the username
pub const USERNAME_SHORT_OPTION: char = 'U';

/// Long option carrying the username
pub const USERNAME_LONG_OPTION: &str = "username";

/// psql short options and whether each takes a value
pub const SHORT_OPTIONS: &[(char, bool)] = &[
    ('a', false),
    ('A', false),
    ('b', false),
    ('c', true),
    ('d', true),
    ('e', false),
    ('E', false),
    ('f', true),
    ('F', true),
    ('h', true),
    ('H', false),
    ('l', false),
    ('L', true),
    ('n', false),
    ('o', true),
    ('p', true),
    ('P', true),
    ('q', false),
    ('R', true),
    ('s', false),
    ('S', false),
    ('t', false),
    ('T', true),
    ('U', true),
    ('v', true),
    ('V', false),
    ('w', false),
    ('W', false),
    ('x', false),
    ('X', false),
    ('z', false),
    ('?', false),
    ('0', false),
    ('1', false),
];

/// psql long options and whether each takes a value.
///
/// `help` has an optional argument in psql, which getopt only accepts in the
/// `--help=topic` form, so it never consumes the next token.
pub const LONG_OPTIONS: &[(&str, bool)] = &[
    ("echo-all", false),
    ("no-align", false),
    ("command", true),
    ("dbname", true),
    ("echo-queries", false),
    ("echo-errors", false),
    ("echo-hidden", false),
    ("file", true),
    ("field-separator", true),
    ("field-separator-zero", false),
    ("host", true),
    ("html", false),
    ("list", false),
    ("log-file", true),
    ("no-readline", false),
    ("single-transaction", false),
    ("output", true),
    ("port", true),
    ("pset", true),
    ("quiet", false),
    ("record-separator", true),
    ("record-separator-zero", false),
    ("single-step", false),
    ("single-line", false),
    ("tuples-only", false),
    ("table-attr", true),
    ("username", true),
    ("set", true),
    ("variable", true),
    ("version", false),
    ("no-password", false),
    ("password", false),
    ("expanded", false),
    ("no-psqlrc", false),
    ("csv", false),
    ("help", false),
];

/// Whether `-<letter>` takes a value. Unknown letters never do.
pub fn short_option_takes_value(letter: char) -> bool {
    SHORT_OPTIONS
        .iter()
        .find(|(l, _)| *l == letter)
        .is_some_and(|(_, takes_value)| *takes_value)
}

/// Whether `--<name>` takes a value. Unknown names never do.
pub fn long_option_takes_value(name: &str) -> bool {
    LONG_OPTIONS
        .iter()
        .find(|(n, _)| *n == name)
        .is_some_and(|(_, takes_value)| *takes_value)
}

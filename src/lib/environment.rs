//! Child process environment
//!
//! A private copy of the wrapper's environment that the child is started
//! with. Adding the password here never touches the wrapper's own
//! environment, so nothing else in the process (or a later `env::vars`) can
//! observe it.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;

/// Ordered environment snapshot; a later entry wins over an earlier one
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: Vec<(OsString, OsString)>,
}

impl Environment {
    /// Copy of the current process environment
    pub fn capture() -> Self {
        env::vars_os().collect()
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name=value`. The appended entry is what the child sees even if
    /// `name` was already present.
    pub fn push(&mut self, name: impl Into<OsString>, value: impl Into<OsString>) {
        self.vars.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.push(name, value);
        self
    }

    /// Effective value of `name`
    pub fn get(&self, name: impl AsRef<OsStr>) -> Option<&OsStr> {
        let name = name.as_ref();
        self.vars
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn contains(&self, name: impl AsRef<OsStr>) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(n, v)| (n.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<OsString>, V: Into<OsString>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

// Hand-rolled so a PGPASSWORD entry never ends up in a debug log
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.vars.iter().map(|(n, _)| n))
            .finish()
    }
}

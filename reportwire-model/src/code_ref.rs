// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A deterministic, hierarchical identity string for a node in the remote
/// item tree.
///
/// A code reference is the test file's path relative to the working root
/// (separators normalized to `/`), followed by the chain of suite titles and,
/// for leaf nodes, the test title, all joined by `/`. Two nodes with equal
/// code references are the same node, and the reference is stable across
/// repeated invocations (retries) of the same test.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeRef(String);

impl CodeRef {
    /// Creates the code reference for a test file.
    ///
    /// `file_path` is taken relative to `root` if possible; paths outside the
    /// root are used as given. Backslash separators are normalized to `/` so
    /// that references are identical regardless of the platform the run
    /// happened on.
    pub fn for_file(root: &Utf8Path, file_path: &Utf8Path) -> Self {
        let relative = file_path.strip_prefix(root).unwrap_or(file_path);
        CodeRef(relative.as_str().replace('\\', "/"))
    }

    /// Creates the code reference for a node under a file, identified by its
    /// chain of titles.
    ///
    /// An empty title chain yields the bare file reference.
    pub fn for_titles<S: AsRef<str>>(
        root: &Utf8Path,
        file_path: &Utf8Path,
        titles: &[S],
    ) -> Self {
        let mut code_ref = Self::for_file(root, file_path);
        for title in titles {
            code_ref = code_ref.child(title.as_ref());
        }
        code_ref
    }

    /// Returns the code reference for a child node with the given title.
    pub fn child(&self, title: &str) -> Self {
        CodeRef(format!("{}/{}", self.0, title))
    }

    /// Returns true if this node belongs to the subtree identified by
    /// `ancestor`: either the two references are equal, or `ancestor` is a
    /// proper path prefix of this reference.
    ///
    /// The check is segment-aware: `a.js/S10` does not belong to `a.js/S1`.
    pub fn belongs_to(&self, ancestor: &CodeRef) -> bool {
        let rest = match self.0.strip_prefix(&ancestor.0) {
            Some(rest) => rest,
            None => return false,
        };
        rest.is_empty() || rest.starts_with('/')
    }

    /// Returns the code reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full name of a suite or intermediate test node: its ancestor titles
/// joined by `/`.
///
/// The node itself is named by the last ancestor segment, so the chain
/// carries no separate own title.
pub fn full_test_name<S: AsRef<str>>(ancestor_titles: &[S]) -> String {
    join_titles(ancestor_titles)
}

/// The full name of a step: its ancestor titles joined by `/`, followed by
/// the step's own title.
pub fn full_step_name<S: AsRef<str>>(ancestor_titles: &[S], title: &str) -> String {
    if ancestor_titles.is_empty() {
        title.to_owned()
    } else {
        format!("{}/{}", join_titles(ancestor_titles), title)
    }
}

fn join_titles<S: AsRef<str>>(titles: &[S]) -> String {
    titles
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/")
}

// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One of the two entity families a record belongs to.
///
/// `Kind` is a closed enum rather than a free-form string: a `match` over it
/// is exhaustive, so adding a third kind is a compile error everywhere that
/// needs updating, not a silent runtime gap. This is the "parameterized
/// lookup, not an object hierarchy" design called for when the two kinds
/// differ only in one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
	Todos,
	Notes,
}

impl Kind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Kind::Todos => "todos",
			Kind::Notes => "notes",
		}
	}

	/// Name of the SQL table this kind is stored in.
	pub fn table_name(&self) -> &'static str {
		match self {
			Kind::Todos => "records_todos",
			Kind::Notes => "records_notes",
		}
	}

	/// Whether this kind carries the `status` field.
	pub fn has_status(&self) -> bool {
		matches!(self, Kind::Todos)
	}
}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Kind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"todos" => Ok(Kind::Todos),
			"notes" => Ok(Kind::Notes),
			other => Err(Error::ShapeViolation(format!("unknown kind '{other}'"))),
		}
	}
}

// Copyright (c) 2026 Reconcile Contributors
// Licensed under the Apache-2.0 license, see LICENSE file

use serde::{Deserialize, Serialize};

/// Which side of a conflict the operator chose to keep (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResolutionChoice {
	Client,
	Server,
	Custom,
}

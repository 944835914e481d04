// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failure kinds that callers may want to treat differently: a transport
/// failure can be retried or surfaced, bad input is the user's to fix, and a
/// schema violation means the upstream service replied with something we
/// cannot use.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("upstream schema violation: {0}")]
    SchemaViolation(String),
}

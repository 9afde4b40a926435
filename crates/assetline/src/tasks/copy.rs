// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Verbatim copy, used by the fonts, plugins and icons tasks.

use super::{read_bytes, Emitted, TaskContext};
use crate::error::Result;
use std::path::PathBuf;

pub(crate) fn build(ctx: &TaskContext<'_>, sources: &[PathBuf]) -> Result<Vec<Emitted>> {
    sources
        .iter()
        .map(|source| Ok(Emitted::new(ctx.dest_for(source, None), read_bytes(source)?)))
        .collect()
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Reload signals pushed to connected browser sessions.

use std::fmt;

/// What a connected browser should do after a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadEvent {
    /// Reload the whole page.
    Page,
    /// Re-fetch stylesheets in place.
    Styles,
}

impl ReloadEvent {
    /// Text frame sent over the reload socket.
    pub fn as_message(&self) -> &'static str {
        match self {
            ReloadEvent::Page => "reload",
            ReloadEvent::Styles => "css",
        }
    }

    /// Combines two pending events; a page reload subsumes a style refresh.
    pub fn merge(self, other: ReloadEvent) -> ReloadEvent {
        if self == ReloadEvent::Styles && other == ReloadEvent::Styles {
            ReloadEvent::Styles
        } else {
            ReloadEvent::Page
        }
    }
}

impl fmt::Display for ReloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_message())
    }
}

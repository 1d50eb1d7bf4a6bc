// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::{Deserialize, Serialize};

/// Status of a dependency edge, chain, or runtime instance.
///
/// `Pending → {Connected, CycleDetected}` on creation,
/// `Connected/Ready ↔ Suspended` on suspend/resume, any state `→ Error` on a
/// failed pull or rejected update. `CycleDetected` holds until the edge that
/// closes the loop is removed. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyStatus {
    #[default]
    Pending,
    Connecting,
    Connected,
    Ready,
    Suspended,
    Disconnected,
    Error,
    CycleDetected,
}

impl DependencyStatus {
    /// Whether data should flow across a link in this status.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connected | Self::Ready)
    }

    /// `Connected/Ready → Suspended`.
    pub fn can_suspend(self) -> bool {
        matches!(self, Self::Connected | Self::Ready)
    }

    /// Aggregate edge statuses into a chain status.
    ///
    /// Priority: any `Error`, then any `Disconnected`, then any `Connecting`;
    /// all `Ready` yields `Ready`, anything else `Connected`.
    pub fn aggregate<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let statuses: Vec<Self> = statuses.into_iter().collect();
        if statuses.contains(&Self::Error) {
            Self::Error
        } else if statuses.contains(&Self::Disconnected) {
            Self::Disconnected
        } else if statuses.contains(&Self::Connecting) {
            Self::Connecting
        } else if !statuses.is_empty() && statuses.iter().all(|s| *s == Self::Ready) {
            Self::Ready
        } else {
            Self::Connected
        }
    }
}

impl std::fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Connecting => write!(f, "CONNECTING"),
            Self::Connected => write!(f, "CONNECTED"),
            Self::Ready => write!(f, "READY"),
            Self::Suspended => write!(f, "SUSPENDED"),
            Self::Disconnected => write!(f, "DISCONNECTED"),
            Self::Error => write!(f, "ERROR"),
            Self::CycleDetected => write!(f, "CYCLE_DETECTED"),
        }
    }
}

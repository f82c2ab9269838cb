//! Per-surface sponsor placement filters
//!
//! Pure and idempotent: filtering an already-filtered list is a no-op.
//! A sponsor is placed on a surface either by the legacy single `placement`
//! field or by the matching keys of the per-surface `placements` map.

use serde::Serialize;

use crate::model::event::Sponsor;

/// The rendering context a bundle is composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Public,
    Display,
    Poster,
    Admin,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Display => "display",
            Self::Poster => "poster",
            Self::Admin => "admin",
        }
    }

    /// Response cache policy for this surface's bundle endpoint.
    pub fn cache_control(&self) -> &'static str {
        match self {
            Self::Public => "private, max-age=60, stale-while-revalidate=300",
            Self::Display => "private, max-age=30, stale-while-revalidate=120",
            Self::Poster => "private, max-age=300, stale-while-revalidate=600",
            Self::Admin => "private, no-cache",
        }
    }
}

fn placed_on(sponsor: &Sponsor, surface: Surface) -> bool {
    let legacy = sponsor.placement.as_deref() == Some(surface.as_str());
    legacy
        || match surface {
            Surface::Public => sponsor.placed("mobileBanner"),
            Surface::Display => sponsor.placed("tvTop") || sponsor.placed("tvSide"),
            Surface::Poster => sponsor.placed("posterTop"),
            Surface::Admin => true,
        }
}

/// Keep the sponsors placed on `surface`, preserving order.
pub fn filter_sponsors(sponsors: &[Sponsor], surface: Surface) -> Vec<Sponsor> {
    sponsors
        .iter()
        .filter(|s| placed_on(s, surface))
        .cloned()
        .collect()
}

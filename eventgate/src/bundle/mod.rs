//! Per-surface bundle composition
//!
//! Pure projections of `(event, brand)` — handlers do the I/O, these
//! functions only shape data. Each bundle type serializes with a fixed
//! field order so the strong ETag over its JSON is deterministic.

pub mod etag;
pub mod lifecycle;
pub mod sponsors;

use chrono::NaiveDate;
use serde::Serialize;

use crate::brand::{AdminBrandConfig, Brand, PublicBrandConfig, Template};
use crate::model::event::{Bracket, Ctas, Event, Links, Qr, ScheduleItem, Settings, Sponsor, Standing};

pub use etag::{if_none_match_hits, strong_etag};
pub use lifecycle::{lifecycle_phase, LifecycleInfo};
pub use sponsors::{filter_sponsors, Surface};

/// Everything an unauthenticated event page needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicBundle {
    pub event: Event,
    pub brand: PublicBrandConfig,
    pub lifecycle: LifecycleInfo,
}

pub fn compose_public(event: &Event, brand: &Brand, today: NaiveDate) -> PublicBundle {
    let mut event = event.clone();
    event.sponsors = filter_sponsors(&event.sponsors, Surface::Public);
    PublicBundle {
        lifecycle: lifecycle_phase(&event.start_date_iso, today),
        event,
        brand: brand.public_config(),
    }
}

/// The narrow projection TV kiosks poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEvent {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(rename = "startDateISO")]
    pub start_date_iso: String,
    pub venue: String,
    pub links: Links,
    pub schedule: Vec<ScheduleItem>,
    pub standings: Vec<Standing>,
    pub bracket: Bracket,
    pub sponsors: Vec<Sponsor>,
    pub settings: Settings,
    #[serde(rename = "createdAtISO")]
    pub created_at_iso: String,
    #[serde(rename = "updatedAtISO")]
    pub updated_at_iso: String,
}

fn display_event(event: &Event, surface: Surface) -> DisplayEvent {
    DisplayEvent {
        id: event.id.clone(),
        slug: event.slug.clone(),
        name: event.name.clone(),
        start_date_iso: event.start_date_iso.clone(),
        venue: event.venue.clone(),
        links: event.links.clone(),
        schedule: event.schedule.clone(),
        standings: event.standings.clone(),
        bracket: event.bracket.clone(),
        sponsors: filter_sponsors(&event.sponsors, surface),
        settings: event.settings.clone(),
        created_at_iso: event.created_at_iso.clone(),
        updated_at_iso: event.updated_at_iso.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBundle {
    pub event: DisplayEvent,
    pub brand: PublicBrandConfig,
}

pub fn compose_display(event: &Event, brand: &Brand) -> DisplayBundle {
    DisplayBundle {
        event: display_event(event, Surface::Display),
        brand: brand.public_config(),
    }
}

/// The display projection plus CTAs and the (verified) QR block.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterEvent {
    #[serde(flatten)]
    pub base: DisplayEvent,
    pub ctas: Ctas,
    pub qr: Option<Qr>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterBundle {
    pub event: PosterEvent,
    pub qr_valid: bool,
    pub brand: PublicBrandConfig,
}

/// A poster never shows an unverified QR: the code must be a `data:image`
/// payload and the event must have a public URL for it to point at.
fn qr_is_presentable(event: &Event) -> bool {
    event.qr.public.starts_with("data:image") && !event.links.public_url.is_empty()
}

pub fn compose_poster(event: &Event, brand: &Brand) -> PosterBundle {
    let qr_valid = qr_is_presentable(event);
    PosterBundle {
        event: PosterEvent {
            base: display_event(event, Surface::Poster),
            ctas: event.ctas.clone(),
            qr: qr_valid.then(|| event.qr.clone()),
        },
        qr_valid,
        brand: brand.public_config(),
    }
}

/// Sponsor summary rows for the admin console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSponsorSummary {
    pub id: String,
    pub name: String,
    pub has_logo: bool,
    pub has_link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placements: Option<std::collections::BTreeMap<String, bool>>,
}

impl From<&Sponsor> for AdminSponsorSummary {
    fn from(s: &Sponsor) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            has_logo: s.logo_url.as_deref().is_some_and(|u| !u.is_empty()),
            has_link: s.link_url.as_deref().is_some_and(|u| !u.is_empty()),
            placement: s.placement.clone(),
            placements: s.placements.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDiagnostics {
    pub form_status: &'static str,
    pub shortlinks_count: usize,
    pub last_synced_at: String,
    pub warnings: Vec<String>,
}

/// Handler-gathered context the pure composition folds in.
#[derive(Debug, Clone, Default)]
pub struct AdminContext {
    pub shortlinks_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBundle {
    pub event: Event,
    pub brand: AdminBrandConfig,
    pub templates: Vec<Template>,
    pub diagnostics: AdminDiagnostics,
    pub all_sponsors: Vec<AdminSponsorSummary>,
    pub lifecycle: LifecycleInfo,
}

pub fn compose_admin(
    event: &Event,
    brand: &Brand,
    ctx: &AdminContext,
    today: NaiveDate,
) -> AdminBundle {
    let mut warnings = Vec::new();
    let has_signup = event
        .links
        .signup_url
        .as_deref()
        .is_some_and(|u| !u.is_empty());
    if !has_signup {
        warnings.push("Signup URL is not set".to_string());
    }
    if event.qr.public.is_empty() {
        warnings.push("Public QR code has not been generated".to_string());
    }

    AdminBundle {
        event: event.clone(),
        brand: brand.admin_config(),
        templates: brand.templates.to_vec(),
        diagnostics: AdminDiagnostics {
            form_status: if has_signup { "ready" } else { "missing-signup" },
            shortlinks_count: ctx.shortlinks_count,
            last_synced_at: event.updated_at_iso.clone(),
            warnings,
        },
        all_sponsors: event.sponsors.iter().map(AdminSponsorSummary::from).collect(),
        lifecycle: lifecycle_phase(&event.start_date_iso, today),
    }
}

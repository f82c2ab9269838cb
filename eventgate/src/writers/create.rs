//! Event creation
//!
//! Creation is idempotent on `(brandId, lower(trim(name)), startDateISO,
//! lower(trim(venue)))`: a request matching an existing event returns that
//! event instead of appending a duplicate. Slug uniqueness is per brand,
//! resolved by probing `-2`..`-100` suffixes with a timestamp fallback.
//! The slug scan and the append are not atomic at the store, so creates
//! serialize per `(brand, baseSlug)` on the keyed lock. The only mutating
//! step is the single append: any failure leaves the store unchanged.

use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;

use crate::brand::{self, Brand};
use crate::error::{Error, StoreError, StoreErrorKind};
use crate::ids;
use crate::model::event::{idempotency_key, Cta, Ctas, Event, Links};
use crate::store::EventStore;
use crate::sync::KeyedLocks;

use super::slug::to_slug;

/// Highest numbered suffix probed before falling back to a timestamp.
const MAX_SLUG_PROBE: u32 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "startDateISO")]
    pub start_date_iso: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub brand_id: String,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub signup_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub event: Event,
    /// True when the idempotency key matched an existing event.
    pub duplicate: bool,
}

#[derive(Clone)]
pub struct EventCreator {
    events: EventStore,
    locks: KeyedLocks,
    public_base_url: String,
}

impl EventCreator {
    pub fn new(events: EventStore, locks: KeyedLocks, public_base_url: String) -> Self {
        Self {
            events,
            locks,
            public_base_url,
        }
    }

    pub async fn create(&self, input: &CreateEventInput) -> Result<CreateOutcome, Error> {
        let brand = validate(input)?;
        let base_slug = to_slug(&input.name);

        let _guard = self
            .locks
            .acquire(&KeyedLocks::create_key(brand.id, &base_slug))
            .await?;

        let rows = self
            .events
            .brand_rows(brand.id)
            .await
            .map_err(write_path_error)?;

        let key = idempotency_key(brand.id, &input.name, &input.start_date_iso, &input.venue);
        if let Some(existing) = rows
            .events
            .iter()
            .find(|stored| stored.event.idempotency_key() == key)
        {
            return Ok(CreateOutcome {
                event: existing.event.clone(),
                duplicate: true,
            });
        }

        let slug = resolve_slug(&base_slug, |candidate| rows.slugs.contains(candidate));
        let id = ids::event_id();
        let event_tag = format!(
            "{}-{}-{}",
            brand.id.to_uppercase(),
            slug.to_uppercase(),
            input.start_date_iso
        );
        let links = build_links(&self.public_base_url, brand, &id, input.signup_url.clone());
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        let event = Event {
            id,
            brand_id: brand.id.to_string(),
            slug,
            event_tag,
            name: input.name.trim().to_string(),
            start_date_iso: input.start_date_iso.clone(),
            venue: input.venue.trim().to_string(),
            template_id: input.template_id.clone(),
            ctas: default_ctas(&links),
            links,
            created_at_iso: now.clone(),
            updated_at_iso: now,
            ..Default::default()
        };

        self.events.append(&event).await.map_err(write_path_error)?;

        Ok(CreateOutcome {
            event,
            duplicate: false,
        })
    }
}

fn validate(input: &CreateEventInput) -> Result<&'static Brand, Error> {
    if input.name.trim().is_empty() {
        return Err(Error::BadInput("name is required".to_string()));
    }
    if input.venue.trim().is_empty() {
        return Err(Error::BadInput("venue is required".to_string()));
    }
    if !is_strict_date(&input.start_date_iso) {
        return Err(Error::BadInput(
            "startDateISO must be a valid YYYY-MM-DD date".to_string(),
        ));
    }
    let brand = brand::lookup(&input.brand_id).ok_or_else(|| {
        Error::BadInput(format!("brandId {:?} is not a known brand", input.brand_id))
    })?;
    if let Some(template_id) = input.template_id.as_deref() {
        if !brand.allows_template(template_id) {
            return Err(Error::BadInput(format!(
                "templateId {:?} is not allowed for brand {}",
                template_id, brand.id
            )));
        }
    }
    Ok(brand)
}

fn is_strict_date(s: &str) -> bool {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string() == s,
        Err(_) => false,
    }
}

/// Pick the first free slug: the base, then `-2`..`-100`, then a
/// timestamp suffix that cannot collide in practice.
fn resolve_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    for n in 2..=MAX_SLUG_PROBE {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
    }
    format!("{base}-{}", Utc::now().timestamp_millis())
}

fn build_links(
    public_base_url: &str,
    brand: &Brand,
    event_id: &str,
    signup_url: Option<String>,
) -> Links {
    let prefix = if brand.id == "root" {
        String::new()
    } else {
        format!("/{}", brand.id)
    };
    Links {
        public_url: format!("{public_base_url}{prefix}/?event={event_id}"),
        display_url: format!("{public_base_url}{prefix}/display?event={event_id}"),
        poster_url: format!("{public_base_url}{prefix}/poster?event={event_id}"),
        signup_url: signup_url.filter(|u| !u.trim().is_empty()),
    }
}

fn default_ctas(links: &Links) -> Ctas {
    Ctas {
        primary: Some(Cta {
            label: "View Event".to_string(),
            url: links.public_url.clone(),
        }),
        secondary: links.signup_url.as_ref().map(|url| Cta {
            label: "Sign Up".to_string(),
            url: url.clone(),
        }),
    }
}

/// Adapter failures on the write path surface as INTERNAL with a
/// correlation id; only a missing configuration keeps its own status.
pub(crate) fn write_path_error(e: StoreError) -> Error {
    if e.kind == StoreErrorKind::NotConfigured {
        Error::Store(e)
    } else {
        Error::Internal(e.to_string())
    }
}

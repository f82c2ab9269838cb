//! Static brand (tenant) registry
//!
//! Brands are configuration, not data: the set is closed and compiled in.
//! Each brand carries its display identity, theme, feature flags, and the
//! template allowlist used to validate `templateId` on event creation. The
//! `root` brand is the fallback when no brand is parsed from the path or
//! query.

use serde::Serialize;

/// A single template a brand may render events with.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Brand theme colors (hex).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

/// Per-brand feature switches.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandFeatures {
    pub shortlinks: bool,
    pub qr: bool,
    pub signup: bool,
    pub sponsors: bool,
}

/// A tenant partition.
#[derive(Debug, Clone, Copy)]
pub struct Brand {
    pub id: &'static str,
    pub name: &'static str,
    pub app_title: &'static str,
    pub logo_url: &'static str,
    pub theme: Theme,
    pub features: BrandFeatures,
    pub templates: &'static [Template],
    pub default_template: &'static str,
}

const CLASSIC: Template = Template {
    id: "classic",
    name: "Classic",
    description: "Single-column event page with schedule and standings",
};
const SCOREBOARD: Template = Template {
    id: "scoreboard",
    name: "Scoreboard",
    description: "Standings-first layout for competitive events",
};
const SHOWCASE: Template = Template {
    id: "showcase",
    name: "Showcase",
    description: "Hero layout with sponsor band and CTA focus",
};
const GAME_NIGHT: Template = Template {
    id: "game-night",
    name: "Game Night",
    description: "Bracket-forward layout for tournament evenings",
};

/// The closed brand set. `root` must stay first.
pub static BRANDS: &[Brand] = &[
    Brand {
        id: "root",
        name: "Eventgate",
        app_title: "Eventgate Events",
        logo_url: "/assets/root/logo.svg",
        theme: Theme {
            primary: "#1a1a2e",
            secondary: "#16213e",
            accent: "#e94560",
        },
        features: BrandFeatures {
            shortlinks: true,
            qr: true,
            signup: true,
            sponsors: true,
        },
        templates: &[CLASSIC, SCOREBOARD, SHOWCASE],
        default_template: "classic",
    },
    Brand {
        id: "abc",
        name: "ABC Social Club",
        app_title: "ABC Events",
        logo_url: "/assets/abc/logo.svg",
        theme: Theme {
            primary: "#0f4c81",
            secondary: "#f5f5f5",
            accent: "#ffb400",
        },
        features: BrandFeatures {
            shortlinks: true,
            qr: true,
            signup: true,
            sponsors: true,
        },
        templates: &[CLASSIC, GAME_NIGHT],
        default_template: "classic",
    },
    Brand {
        id: "cbc",
        name: "CBC League",
        app_title: "CBC League Nights",
        logo_url: "/assets/cbc/logo.svg",
        theme: Theme {
            primary: "#14532d",
            secondary: "#ecfdf5",
            accent: "#f97316",
        },
        features: BrandFeatures {
            shortlinks: true,
            qr: true,
            signup: false,
            sponsors: true,
        },
        templates: &[CLASSIC, SCOREBOARD, GAME_NIGHT],
        default_template: "scoreboard",
    },
    Brand {
        id: "cbl",
        name: "CBL Community",
        app_title: "CBL Community Events",
        logo_url: "/assets/cbl/logo.svg",
        theme: Theme {
            primary: "#4c1d95",
            secondary: "#faf5ff",
            accent: "#22d3ee",
        },
        features: BrandFeatures {
            shortlinks: true,
            qr: false,
            signup: true,
            sponsors: false,
        },
        templates: &[CLASSIC, SHOWCASE],
        default_template: "classic",
    },
];

/// The fallback brand.
pub fn root() -> &'static Brand {
    &BRANDS[0]
}

/// Look up a brand by id.
pub fn lookup(id: &str) -> Option<&'static Brand> {
    BRANDS.iter().find(|b| b.id == id)
}

/// Whether `s` names a brand in the closed set.
pub fn is_brand_id(s: &str) -> bool {
    lookup(s).is_some()
}

impl Brand {
    /// Whether `template_id` is in this brand's allowlist.
    pub fn allows_template(&self, template_id: &str) -> bool {
        self.templates.iter().any(|t| t.id == template_id)
    }

    pub fn template_ids(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.id).collect()
    }

    /// The projection embedded in public, display, and poster bundles.
    pub fn public_config(&self) -> PublicBrandConfig {
        PublicBrandConfig {
            id: self.id,
            name: self.name,
            app_title: self.app_title,
            logo_url: self.logo_url,
            theme: self.theme,
            features: self.features,
        }
    }

    /// The projection embedded in admin bundles.
    pub fn admin_config(&self) -> AdminBrandConfig {
        AdminBrandConfig {
            id: self.id,
            name: self.name,
            app_title: self.app_title,
            logo_url: self.logo_url,
            theme: self.theme,
            features: self.features,
            allowed_templates: self.template_ids(),
            default_template_id: self.default_template,
        }
    }
}

/// Brand fields exposed to unauthenticated surfaces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicBrandConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub app_title: &'static str,
    pub logo_url: &'static str,
    pub theme: Theme,
    pub features: BrandFeatures,
}

/// Brand fields exposed to the admin console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBrandConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub app_title: &'static str,
    pub logo_url: &'static str,
    pub theme: Theme,
    pub features: BrandFeatures,
    pub allowed_templates: Vec<&'static str>,
    pub default_template_id: &'static str,
}

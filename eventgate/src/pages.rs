//! Server-rendered HTML shells
//!
//! The browser surfaces are thin single-page shells: the gateway substitutes
//! brand identity at request time and the page's script talks to the bundle
//! endpoints for everything else. Substitution is plain `{{VAR}}`
//! replacement over compiled-in templates.

use crate::brand::Brand;

/// The page families the alias table resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Public,
    Admin,
    Display,
    Poster,
    Report,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Admin => "admin",
            Self::Display => "display",
            Self::Poster => "poster",
            Self::Report => "report",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Self::Public => PUBLIC_SHELL,
            Self::Admin => ADMIN_SHELL,
            Self::Display => DISPLAY_SHELL,
            Self::Poster => POSTER_SHELL,
            Self::Report => REPORT_SHELL,
        }
    }
}

/// Replace each `{{KEY}}` with its value. Unknown keys are left in place so
/// a missing variable is visible rather than silently blank.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// Render a page shell for a brand.
pub fn render(page: PageKind, brand: &Brand) -> String {
    substitute(
        page.template(),
        &[
            ("APP_TITLE", brand.app_title),
            ("BRAND_ID", brand.id),
            ("BRAND_NAME", brand.name),
            ("LOGO_URL", brand.logo_url),
            ("THEME_PRIMARY", brand.theme.primary),
            ("THEME_SECONDARY", brand.theme.secondary),
            ("THEME_ACCENT", brand.theme.accent),
            ("PAGE", page.as_str()),
        ],
    )
}

const PUBLIC_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{APP_TITLE}}</title>
<style>
  :root { --primary: {{THEME_PRIMARY}}; --secondary: {{THEME_SECONDARY}}; --accent: {{THEME_ACCENT}}; }
  body { margin: 0; font-family: system-ui, sans-serif; background: var(--secondary); color: var(--primary); }
  header { padding: 1rem 1.5rem; background: var(--primary); color: #fff; display: flex; align-items: center; gap: .75rem; }
  header img { height: 2rem; }
</style>
</head>
<body data-brand="{{BRAND_ID}}" data-page="{{PAGE}}">
<header><img src="{{LOGO_URL}}" alt=""><h1>{{APP_TITLE}}</h1></header>
<main id="app">Loading event&hellip;</main>
<script type="module" src="/assets/js/public.js"></script>
</body>
</html>
"#;

const ADMIN_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{BRAND_NAME}} Admin</title>
<style>
  :root { --primary: {{THEME_PRIMARY}}; --accent: {{THEME_ACCENT}}; }
  body { margin: 0; font-family: system-ui, sans-serif; }
</style>
</head>
<body data-brand="{{BRAND_ID}}" data-page="{{PAGE}}">
<main id="admin">Loading console&hellip;</main>
<script type="module" src="/assets/js/admin.js"></script>
</body>
</html>
"#;

const DISPLAY_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{APP_TITLE}} — Display</title>
<style>
  :root { --primary: {{THEME_PRIMARY}}; --accent: {{THEME_ACCENT}}; }
  body { margin: 0; background: #000; color: #fff; font-family: system-ui, sans-serif; overflow: hidden; }
</style>
</head>
<body data-brand="{{BRAND_ID}}" data-page="{{PAGE}}">
<main id="screen"></main>
<script type="module" src="/assets/js/display.js"></script>
</body>
</html>
"#;

const POSTER_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{APP_TITLE}} — Poster</title>
<style>
  :root { --primary: {{THEME_PRIMARY}}; --accent: {{THEME_ACCENT}}; }
  @page { size: A4 portrait; margin: 0; }
  body { margin: 0; font-family: system-ui, sans-serif; }
</style>
</head>
<body data-brand="{{BRAND_ID}}" data-page="{{PAGE}}">
<main id="poster"></main>
<script type="module" src="/assets/js/poster.js"></script>
</body>
</html>
"#;

const REPORT_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{BRAND_NAME}} Reports</title>
<style>
  :root { --primary: {{THEME_PRIMARY}}; --accent: {{THEME_ACCENT}}; }
  body { margin: 0; font-family: system-ui, sans-serif; }
</style>
</head>
<body data-brand="{{BRAND_ID}}" data-page="{{PAGE}}">
<main id="report">Loading report&hellip;</main>
<script type="module" src="/assets/js/report.js"></script>
</body>
</html>
"#;

/// The shell served when a shortlink token is missing, invalid, or unknown.
pub fn link_not_found_html() -> &'static str {
    r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Link Not Found</title>
<style>
  body { margin: 0; font-family: system-ui, sans-serif; display: grid; place-items: center; min-height: 100vh; }
  main { text-align: center; }
</style>
</head>
<body>
<main>
<h1>Link Not Found</h1>
<p>This link doesn&rsquo;t exist or has expired.</p>
<p><a href="/">Back to events</a></p>
</main>
</body>
</html>
"#
}

/// The shell served when a stored shortlink target is unusable.
pub fn link_failure_html() -> &'static str {
    r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Something Went Wrong</title>
<style>
  body { margin: 0; font-family: system-ui, sans-serif; display: grid; place-items: center; min-height: 100vh; }
  main { text-align: center; }
</style>
</head>
<body>
<main>
<h1>Something Went Wrong</h1>
<p>This link can&rsquo;t be followed right now.</p>
<p><a href="/">Back to events</a></p>
</main>
</body>
</html>
"#
}

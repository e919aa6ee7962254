use anyhow::Context;
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

/// A slug and the URL it redirects to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub slug: String,
    #[serde(alias = "url")]
    pub target_url: String,
}

/// Static slug → URL mapping, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

/// Campaign routes shipped with the service
const BUILTIN_ROUTES: &[(&str, &str)] = &[
    (
        "fb-home-living",
        "https://app.aiprlassist.com/r/1192437/Facebook%20Home%20And%20Living",
    ),
    (
        "web-home-living",
        "https://app.aiprlassist.com/r/1192437/Website%20Home%20and%20Living",
    ),
    (
        "voice-furniture",
        "https://app.aiprlassist.com/r/1192437/AiPRL%20Furniture%20Voice%20Demk",
    ),
    ("aiprl", "https://aiprlassist.com"),
    (
        "orbit-games",
        "https://app.aiprlassist.com/bots/1453419/176041449991",
    ),
    ("demo-video", "https://aiprlassist.com/demo"),
];

impl RouteTable {
    pub fn new<I, S, U>(routes: I) -> Self
    where
        I: IntoIterator<Item = (S, U)>,
        S: Into<String>,
        U: Into<String>,
    {
        let mut table = Self::default();
        for (slug, url) in routes {
            table.insert(slug, url);
        }
        table
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_ROUTES.iter().copied())
    }

    /// Insert or replace a route; a replaced slug keeps its position
    pub fn insert(&mut self, slug: impl Into<String>, target_url: impl Into<String>) {
        let slug = slug.into();
        let target_url = target_url.into();
        match self.routes.iter_mut().find(|r| r.slug == slug) {
            Some(existing) => existing.target_url = target_url,
            None => self.routes.push(Route { slug, target_url }),
        }
    }

    pub fn extend(&mut self, routes: impl IntoIterator<Item = Route>) {
        for route in routes {
            self.insert(route.slug, route.target_url);
        }
    }

    /// Replace target URLs from `REDIRECT_<SLUG>` style variables
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for route in &mut self.routes {
            if let Some(url) = lookup(&env_key(&route.slug)).filter(|u| !u.is_empty()) {
                route.target_url = url;
            }
        }
    }

    pub fn get(&self, slug: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.slug == slug)
            .map(|r| r.target_url.as_str())
    }

    pub fn slugs(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.slug.clone()).collect()
    }

    /// Redirect paths, e.g. `/r/aiprl`
    pub fn paths(&self) -> Vec<String> {
        self.routes.iter().map(|r| format!("/r/{}", r.slug)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Every target must be usable as a `Location` header value
    pub fn validate(&self) -> anyhow::Result<()> {
        for route in &self.routes {
            HeaderValue::from_str(&route.target_url).with_context(|| {
                format!(
                    "Route '{}' has a target URL that is not a valid Location header (set via {} or the routes file)",
                    route.slug,
                    env_key(&route.slug)
                )
            })?;
        }
        Ok(())
    }
}

/// Environment variable overriding a slug, e.g. `REDIRECT_FB_HOME_LIVING`
pub fn env_key(slug: &str) -> String {
    let mut key = String::from("REDIRECT_");
    key.extend(slug.chars().map(|c| match c {
        'a'..='z' => c.to_ascii_uppercase(),
        'A'..='Z' | '0'..='9' => c,
        _ => '_',
    }));
    key
}

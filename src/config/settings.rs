//! Runtime settings read from the environment.

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const DEFAULT_MAX_PER_PAGE: u64 = 100;

#[derive(Clone, Debug)]
pub struct AdminSettings {
    pub database_url: String,
    pub config_path: String,
    /// Mount point of the admin routes, without trailing slash (e.g. "/admin").
    pub prefix: String,
    /// When set, every admin request must carry `Authorization: Bearer <token>`.
    pub token: Option<String>,
    pub bind_addr: String,
    pub per_page: u64,
    pub max_per_page: u64,
}

impl Default for AdminSettings {
    fn default() -> Self {
        AdminSettings {
            database_url: "postgres://localhost/admin".into(),
            config_path: "admin.json".into(),
            prefix: "/admin".into(),
            token: None,
            bind_addr: "127.0.0.1:3000".into(),
            per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
        }
    }
}

impl AdminSettings {
    /// Read `DATABASE_URL`, `ADMIN_CONFIG_PATH`, `ADMIN_PREFIX`, `ADMIN_TOKEN`, `ADMIN_BIND`,
    /// `ADMIN_PER_PAGE` and `ADMIN_MAX_PER_PAGE`; anything unset keeps its default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AdminSettings::default();
        let per_page = parse_number(&lookup, "ADMIN_PER_PAGE", defaults.per_page);
        let max_per_page = parse_number(&lookup, "ADMIN_MAX_PER_PAGE", defaults.max_per_page);
        AdminSettings {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            config_path: lookup("ADMIN_CONFIG_PATH").unwrap_or(defaults.config_path),
            prefix: lookup("ADMIN_PREFIX")
                .map(|p| normalize_prefix(&p))
                .unwrap_or(defaults.prefix),
            token: lookup("ADMIN_TOKEN").filter(|t| !t.trim().is_empty()),
            bind_addr: lookup("ADMIN_BIND").unwrap_or(defaults.bind_addr),
            per_page: per_page.max(1),
            max_per_page: max_per_page.max(per_page).max(1),
        }
    }

    /// Path of a route inside the admin panel, e.g. `url(&["posts", "7"])` -> "/admin/posts/7".
    pub fn url(&self, segments: &[&str]) -> String {
        let mut out = self.prefix.clone();
        for s in segments {
            out.push('/');
            out.push_str(s);
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

fn parse_number(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "not a number, using default {}", default);
            default
        }),
    }
}

/// "admin/" and "/admin" both become "/admin"; "/" becomes "".
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

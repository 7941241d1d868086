use serde::Deserialize;

/// Browser user agent sent to the catalog site
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/95.0.4638.69 Safari/537.36";

/// Accept header sent with every catalog request
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
     image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

/// Main configuration structure for ICD-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Crawl target and retry behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Scheme and host of the catalog; child links are resolved against it
    pub domain: String,

    /// Path of the root category listing
    pub root_path: String,

    /// Selector for the region holding the listing on every page
    pub body_selector: String,

    /// Selector for the listing container inside the body region
    pub list_selector: String,

    /// Class that picks the right list on subcategory and code pages
    pub child_list_class: String,

    /// Fixed sleep between attempts for the same URL (seconds)
    pub retry_delay_secs: u64,

    /// Total attempts per URL before the fetch fails for good
    pub max_attempts: u32,

    /// Maximum number of HTTP exchanges in flight at once
    pub max_connections: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            domain: "https://www.icd10data.com".to_string(),
            root_path: "/ICD10CM/Codes".to_string(),
            body_selector: "div.body-content".to_string(),
            list_selector: "ul".to_string(),
            child_list_class: "i51".to_string(),
            retry_delay_secs: 180,
            max_attempts: 10,
            max_connections: 20,
        }
    }
}

/// Request identification headers
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    pub user_agent: String,
    pub accept: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

/// Relational store settings
///
/// The store is an embedded SQLite file named by `name`. The endpoint and
/// credential fields are carried so a run reports what it was pointed at;
/// the embedded backend does not dial them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,

    /// Database name; the path of the SQLite file
    pub name: String,

    /// Sleep between failed health probes (seconds)
    pub poll_interval_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            user: None,
            password: None,
            name: "medical_codes.db".to_string(),
            poll_interval_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Human-readable target for log lines, never including the password
    pub fn label(&self) -> String {
        match (&self.user, &self.host, self.port) {
            (Some(user), Some(host), Some(port)) => {
                format!("{}@{}:{}/{}", user, host, port, self.name)
            }
            (None, Some(host), Some(port)) => format!("{}:{}/{}", host, port, self.name),
            (_, Some(host), None) => format!("{}/{}", host, self.name),
            _ => self.name.clone(),
        }
    }

    /// Endpoint and credential settings that were given but have no effect
    /// on the embedded store
    pub fn ignored_settings(&self) -> Vec<&'static str> {
        [
            ("host", self.host.is_some()),
            ("port", self.port.is_some()),
            ("user", self.user.is_some()),
            ("password", self.password.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
        .collect()
    }
}

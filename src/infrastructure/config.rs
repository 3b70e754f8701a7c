use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub http: HttpSettings,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Published CSV URLs for the five sheets
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    pub cm: String,
    pub mou: String,
    pub slot: String,
    pub showcasing: String,
    pub total: String,
}

pub const CHART_SOURCES: [&str; 4] = ["cm", "mou", "slot", "showcasing"];

impl SourcesConfig {
    pub fn url(&self, source: &str) -> Option<&str> {
        match source {
            "cm" => Some(&self.cm),
            "mou" => Some(&self.mou),
            "slot" => Some(&self.slot),
            "showcasing" => Some(&self.showcasing),
            "total" => Some(&self.total),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VariantConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default = "default_total_column")]
    pub total_column: String,
    #[serde(default)]
    pub rank_labels: bool,
    #[serde(default)]
    pub entity_selector: bool,
    pub functions: Vec<String>,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    pub source: String,
    pub prefix: String,
    pub table_name: String,
    pub title: String,
    pub column: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_total_column() -> String {
    "Total Marks".to_string()
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl DashboardConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut ids = HashSet::new();
        for variant in &self.variants {
            if !ids.insert(variant.id.as_str()) {
                anyhow::bail!("duplicate dashboard variant '{}'", variant.id);
            }
            if variant.functions.is_empty() {
                anyhow::bail!("variant '{}' has no functions", variant.id);
            }
            for panel in &variant.panels {
                if !CHART_SOURCES.contains(&panel.source.as_str()) {
                    anyhow::bail!(
                        "variant '{}' panel refers to unknown source '{}'",
                        variant.id,
                        panel.source
                    );
                }
            }
        }
        Ok(())
    }

    pub fn variant(&self, id: &str) -> Option<&VariantConfig> {
        self.variants.iter().find(|v| v.id == id)
    }
}

impl VariantConfig {
    /// The literal text each panel template puts between the source prefix
    /// and the function placeholder, e.g. `i` for `CM_i${function} Marks`.
    pub fn function_markers(&self) -> Vec<(String, String)> {
        self.panels
            .iter()
            .map(|p| {
                let rest = p.column.strip_prefix(&p.prefix).unwrap_or(&p.column);
                let marker = rest.split("${function}").next().unwrap_or_default();
                (p.source.clone(), marker.to_string())
            })
            .collect()
    }

    pub fn has_inconsistent_markers(&self) -> bool {
        let markers: HashSet<String> =
            self.function_markers().into_iter().map(|(_, m)| m).collect();
        markers.len() > 1
    }
}

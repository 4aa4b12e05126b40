use std::time::Duration;

use crate::core::types::{CustodyStatus, Gender};

// ---------------------------------------------------------------------------
// ScoutConfig — file-based config loader (roster-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://inmatedatasearch.azcorrections.gov/";
pub const DEFAULT_OUTPUT_DIR: &str = "inmate_data";

/// The portal rejects queries without both name fields, so the sweep is a
/// cross-product of common surnames and every initial.
const DEFAULT_LAST_NAMES: &[&str] = &[
    "Smith",
    "Johnson",
    "Williams",
    "Brown",
    "Jones",
    "Garcia",
    "Miller",
    "Davis",
    "Rodriguez",
    "Wilson",
    "Martinez",
    "Hernandez",
    "Lopez",
    "Gonzalez",
    "Perez",
    "Taylor",
    "Anderson",
    "Thomas",
    "Jackson",
    "White",
];

pub const ENV_CONFIG_PATH: &str = "ROSTER_SCOUT_CONFIG";
pub const ENV_OUTPUT_DIR: &str = "ROSTER_SCOUT_OUTPUT_DIR";
pub const ENV_BASE_URL: &str = "ROSTER_SCOUT_BASE_URL";
pub const ENV_LAST_NAMES: &str = "ROSTER_SCOUT_LAST_NAMES";
pub const ENV_FIRST_INITIALS: &str = "ROSTER_SCOUT_FIRST_INITIALS";
pub const ENV_GENDER: &str = "ROSTER_SCOUT_GENDER";
pub const ENV_STATUS: &str = "ROSTER_SCOUT_STATUS";
pub const ENV_HEADLESS: &str = "ROSTER_SCOUT_HEADLESS";

/// Top-level config loaded from `roster-scout.json`. Every field is optional;
/// resolution order per field is JSON → env var → coded default.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutConfig {
    /// Directory receiving the CSV files and the `photos/` subdirectory.
    pub output_dir: Option<String>,
    /// Portal landing-page URL.
    pub base_url: Option<String>,
    /// Surnames to sweep. Default: a fixed list of 20 common surnames.
    pub last_names: Option<Vec<String>>,
    /// First initials to sweep. Default: A–Z.
    pub first_initials: Option<Vec<String>>,
    /// "Male" or "Female". Default: Male.
    pub gender: Option<String>,
    /// "Active" or "Inactive". Default: Active.
    pub status: Option<String>,
    /// Randomized pause between queries, in milliseconds. Default: 2000–6000.
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    /// Per-wait ceiling for a form control or detail table to appear.
    /// Default: 10 s.
    pub element_timeout_secs: Option<u64>,
    /// Run the browser headless. Default: true; set `ROSTER_SCOUT_HEADLESS=0`
    /// to watch the session.
    pub headless: Option<bool>,
}

impl ScoutConfig {
    /// Output dir: JSON field → `ROSTER_SCOUT_OUTPUT_DIR` env var → `inmate_data`.
    pub fn resolve_output_dir(&self) -> String {
        if let Some(d) = &self.output_dir {
            if !d.trim().is_empty() {
                return d.clone();
            }
        }
        std::env::var(ENV_OUTPUT_DIR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
    }

    /// Base URL: JSON field → `ROSTER_SCOUT_BASE_URL` env var → the portal.
    pub fn resolve_base_url(&self) -> String {
        if let Some(u) = &self.base_url {
            if !u.trim().is_empty() {
                return u.clone();
            }
        }
        std::env::var(ENV_BASE_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Surnames: JSON field → comma-separated `ROSTER_SCOUT_LAST_NAMES` → defaults.
    pub fn resolve_last_names(&self) -> Vec<String> {
        if let Some(names) = &self.last_names {
            if !names.is_empty() {
                return names.clone();
            }
        }
        if let Ok(v) = std::env::var(ENV_LAST_NAMES) {
            let names: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !names.is_empty() {
                return names;
            }
        }
        DEFAULT_LAST_NAMES.iter().map(|s| s.to_string()).collect()
    }

    /// Initials: JSON field → comma-separated `ROSTER_SCOUT_FIRST_INITIALS` → A–Z.
    pub fn resolve_first_initials(&self) -> Vec<String> {
        if let Some(initials) = &self.first_initials {
            if !initials.is_empty() {
                return initials.clone();
            }
        }
        if let Ok(v) = std::env::var(ENV_FIRST_INITIALS) {
            let initials: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !initials.is_empty() {
                return initials;
            }
        }
        ('A'..='Z').map(|c| c.to_string()).collect()
    }

    pub fn resolve_gender(&self) -> Gender {
        if let Some(g) = self.gender.as_deref().and_then(Gender::parse_str) {
            return g;
        }
        std::env::var(ENV_GENDER)
            .ok()
            .and_then(|v| Gender::parse_str(&v))
            .unwrap_or(Gender::Male)
    }

    pub fn resolve_status(&self) -> CustodyStatus {
        if let Some(s) = self.status.as_deref().and_then(CustodyStatus::parse_str) {
            return s;
        }
        std::env::var(ENV_STATUS)
            .ok()
            .and_then(|v| CustodyStatus::parse_str(&v))
            .unwrap_or(CustodyStatus::Active)
    }

    /// Inter-query pause bounds in milliseconds; always returns min ≤ max.
    pub fn resolve_delay_range(&self) -> (u64, u64) {
        let min = self.min_delay_ms.unwrap_or(2000);
        let max = self.max_delay_ms.unwrap_or(6000).max(min);
        (min, max)
    }

    pub fn resolve_element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs.unwrap_or(10))
    }

    /// Headless: JSON field → `ROSTER_SCOUT_HEADLESS` env var ("0"/"false"/"no"
    /// to disable) → true.
    pub fn resolve_headless(&self) -> bool {
        if let Some(b) = self.headless {
            return b;
        }
        let Ok(v) = std::env::var(ENV_HEADLESS) else {
            return true;
        };
        let v = v.trim().to_ascii_lowercase();
        if v.is_empty() {
            return true;
        }
        !matches!(v.as_str(), "0" | "false" | "no" | "off")
    }
}

/// Load `roster-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `ROSTER_SCOUT_CONFIG` env var path
/// 2. `./roster-scout.json` (process cwd)
/// 3. `../roster-scout.json` (one level up, when running from a subdirectory)
///
/// Missing file → `ScoutConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `ScoutConfig::default()`.
pub fn load_scout_config() -> ScoutConfig {
    let candidates: Vec<std::path::PathBuf> = {
        let mut v = vec![
            std::path::PathBuf::from("roster-scout.json"),
            std::path::PathBuf::from("../roster-scout.json"),
        ];
        if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
            v.insert(0, std::path::PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<ScoutConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("roster-scout.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "roster-scout.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return ScoutConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    ScoutConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_full_sweep() {
        let cfg = ScoutConfig::default();
        assert_eq!(cfg.resolve_last_names().len(), 20);
        assert_eq!(cfg.resolve_first_initials().len(), 26);
        assert_eq!(cfg.resolve_gender(), Gender::Male);
        assert_eq!(cfg.resolve_status(), CustodyStatus::Active);
        assert_eq!(cfg.resolve_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn delay_range_is_ordered_even_when_misconfigured() {
        let cfg = ScoutConfig {
            min_delay_ms: Some(5000),
            max_delay_ms: Some(100),
            ..Default::default()
        };
        let (min, max) = cfg.resolve_delay_range();
        assert!(min <= max);
    }

    #[test]
    fn json_fields_win_over_defaults() {
        let cfg: ScoutConfig = serde_json::from_str(
            r#"{
                "output_dir": "run7",
                "last_names": ["Nguyen"],
                "first_initials": ["T"],
                "gender": "female",
                "status": "inactive",
                "element_timeout_secs": 3
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.resolve_output_dir(), "run7");
        assert_eq!(cfg.resolve_last_names(), vec!["Nguyen".to_string()]);
        assert_eq!(cfg.resolve_gender(), Gender::Female);
        assert_eq!(cfg.resolve_status(), CustodyStatus::Inactive);
        assert_eq!(cfg.resolve_element_timeout(), Duration::from_secs(3));
    }
}

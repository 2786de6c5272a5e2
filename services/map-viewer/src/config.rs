//! Viewer configuration.
//!
//! Values come from an optional YAML file, then `VIEWER_*` environment
//! variables override individual keys. Everything has a default so the
//! service starts with no configuration at all.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use renderer::{PageSettings, MAX_MENU_DEPTH};
use wms_common::MenuPlacement;
use wms_protocol::wms::{CAPABILITIES_VERSION, DEFAULT_TILE_VERSION};
use wms_protocol::{capabilities_url, WfsVersion};

const GEOSERVER_ROOT: &str = "https://geoserverhomo23.sefin.fortaleza.ce.gov.br/geoserver";

/// Base map and initial viewport.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub basemap_url: String,
    pub basemap_attribution: String,
    pub basemap_subdomains: String,
    pub basemap_max_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [-3.7619, -38.534117],
            zoom: 12,
            basemap_url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
            basemap_attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>".to_string(),
            basemap_subdomains: "abcd".to_string(),
            basemap_max_zoom: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    /// Full GetCapabilities URL fetched once at startup.
    pub capabilities_url: String,
    pub wms_base_url: String,
    pub wfs_base_url: String,
    /// WFS version used for download links.
    pub wfs_version: WfsVersion,
    /// Download features in their native CRS instead of EPSG:4326.
    pub download_native_crs: bool,
    /// GeoServer root used for per-workspace service links.
    pub geoserver_root: String,
    /// WMS version used for overlay tile requests.
    pub tile_version: String,
    pub fetch_timeout_secs: u64,
    pub menu_placement: MenuPlacement,
    pub max_menu_depth: usize,
    /// Page sessions kept before the least recently used is evicted.
    pub max_sessions: usize,
    /// Overlay shown before the user picks anything.
    pub initial_layer: Option<String>,
    pub overlay_attribution: String,
    pub overlay_max_zoom: u8,
    pub map: MapConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "IDE Fortaleza".to_string(),
            capabilities_url: capabilities_url(&format!("{}/ows", GEOSERVER_ROOT), CAPABILITIES_VERSION),
            wms_base_url: format!("{}/wms", GEOSERVER_ROOT),
            wfs_base_url: format!("{}/wfs", GEOSERVER_ROOT),
            wfs_version: WfsVersion::V2_0_0,
            download_native_crs: false,
            geoserver_root: GEOSERVER_ROOT.to_string(),
            tile_version: DEFAULT_TILE_VERSION.to_string(),
            fetch_timeout_secs: 30,
            menu_placement: MenuPlacement::First,
            max_menu_depth: MAX_MENU_DEPTH,
            max_sessions: 1000,
            initial_layer: Some("LIMITES_ADMINISTRATIVOS:limite_municipal".to_string()),
            overlay_attribution: "IDESEFIN".to_string(),
            overlay_max_zoom: 22,
            map: MapConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Load from `path` if given, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No config file given, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded viewer configuration");
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `VIEWER_*` overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_keys: [(&str, &mut String); 5] = [
            ("VIEWER_CAPABILITIES_URL", &mut self.capabilities_url),
            ("VIEWER_WMS_URL", &mut self.wms_base_url),
            ("VIEWER_WFS_URL", &mut self.wfs_base_url),
            ("VIEWER_GEOSERVER_ROOT", &mut self.geoserver_root),
            ("VIEWER_TITLE", &mut self.title),
        ];
        for (key, slot) in string_keys {
            if let Some(value) = lookup(key) {
                debug!(key, "Config override from environment");
                *slot = value;
            }
        }

        if let Some(value) = lookup("VIEWER_FETCH_TIMEOUT_SECS") {
            match value.parse() {
                Ok(secs) => self.fetch_timeout_secs = secs,
                Err(_) => warn!(value = %value, "Ignoring invalid VIEWER_FETCH_TIMEOUT_SECS"),
            }
        }

        if let Some(value) = lookup("VIEWER_MENU_PLACEMENT") {
            match value.to_lowercase().as_str() {
                "first" => self.menu_placement = MenuPlacement::First,
                "all" => self.menu_placement = MenuPlacement::All,
                _ => warn!(value = %value, "Ignoring invalid VIEWER_MENU_PLACEMENT"),
            }
        }

        if let Some(value) = lookup("VIEWER_INITIAL_LAYER") {
            // An empty value disables the initial overlay.
            self.initial_layer = Some(value).filter(|v| !v.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("capabilities_url", &self.capabilities_url),
            ("wms_base_url", &self.wms_base_url),
            ("wfs_base_url", &self.wfs_base_url),
            ("geoserver_root", &self.geoserver_root),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("{} must be an http(s) URL, got '{}'", name, url);
            }
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch_timeout_secs must be greater than zero");
        }
        if self.max_menu_depth == 0 {
            bail!("max_menu_depth must be greater than zero");
        }
        if self.max_sessions == 0 {
            bail!("max_sessions must be greater than zero");
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            title: self.title.clone(),
            center: self.map.center,
            zoom: self.map.zoom,
            basemap_url: self.map.basemap_url.clone(),
            basemap_attribution: self.map.basemap_attribution.clone(),
            basemap_subdomains: self.map.basemap_subdomains.clone(),
            basemap_max_zoom: self.map.basemap_max_zoom,
            session_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ViewerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.menu_placement, MenuPlacement::First);
        assert_eq!(config.tile_version, "1.1.1");
        assert_eq!(
            config.capabilities_url,
            "https://geoserverhomo23.sefin.fortaleza.ce.gov.br/geoserver/ows?service=WMS&version=1.3.0&request=GetCapabilities"
        );
        assert_eq!(config.wfs_version, WfsVersion::V2_0_0);
        assert_eq!(config.max_sessions, 1000);
    }

    #[test]
    fn test_legacy_wfs_from_yaml() {
        let config = ViewerConfig::from_yaml_str(
            r#"
wfs_version: "1.1.0"
download_native_crs: true
max_sessions: 50
"#,
        )
        .unwrap();
        assert_eq!(config.wfs_version, WfsVersion::V1_1_0);
        assert!(config.download_native_crs);
        assert_eq!(config.max_sessions, 50);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ViewerConfig::from_yaml_str(
            r#"
title: Test viewer
menu_placement: all
map:
  zoom: 9
"#,
        )
        .unwrap();
        assert_eq!(config.title, "Test viewer");
        assert_eq!(config.menu_placement, MenuPlacement::All);
        assert_eq!(config.map.zoom, 9);
        assert_eq!(config.map.basemap_subdomains, "abcd");
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wfs_base_url: http://localhost:8600/geoserver/wfs").unwrap();
        writeln!(file, "fetch_timeout_secs: 5").unwrap();

        let config = ViewerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.wfs_base_url, "http://localhost:8600/geoserver/wfs");
        assert_eq!(config.fetch_timeout_secs, 5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::from_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("VIEWER_WMS_URL", "http://localhost/wms"),
            ("VIEWER_FETCH_TIMEOUT_SECS", "7"),
            ("VIEWER_MENU_PLACEMENT", "ALL"),
            ("VIEWER_INITIAL_LAYER", ""),
        ]
        .into_iter()
        .collect();

        let mut config = ViewerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.wms_base_url, "http://localhost/wms");
        assert_eq!(config.fetch_timeout_secs, 7);
        assert_eq!(config.menu_placement, MenuPlacement::All);
        assert_eq!(config.initial_layer, None);
    }

    #[test]
    fn test_invalid_override_is_ignored() {
        let mut config = ViewerConfig::default();
        config.apply_overrides(|key| {
            (key == "VIEWER_FETCH_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ViewerConfig::default();
        config.wfs_base_url = "ftp://example.org".to_string();
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.fetch_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ViewerConfig::default();
        config.max_sessions = 0;
        assert!(config.validate().is_err());
    }
}

//! WFS GetFeature download URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use wms_common::ViewerError;

use crate::build_url;

/// CRS requested for downloads.
pub const DOWNLOAD_SRS: &str = "EPSG:4326";

/// Download formats offered by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    #[serde(rename = "shp")]
    ShapeZip,
    GeoJson,
}

impl OutputFormat {
    /// All formats in button order.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Csv, OutputFormat::ShapeZip, OutputFormat::GeoJson];

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "CSV",
            OutputFormat::ShapeZip => "SHP",
            OutputFormat::GeoJson => "GeoJSON",
        }
    }

    /// Value of the `outputFormat` parameter.
    pub fn wfs_value(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::ShapeZip => "shape-zip",
            OutputFormat::GeoJson => "application/json",
        }
    }

    /// Path segment used by the download route.
    pub fn slug(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::ShapeZip => "shp",
            OutputFormat::GeoJson => "geojson",
        }
    }

    /// Bootstrap icon class.
    pub fn icon(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "bi-table",
            OutputFormat::ShapeZip => "bi-bounding-box",
            OutputFormat::GeoJson => "bi-braces",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputFormat {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "shp" | "shape-zip" | "shapefile" => Ok(OutputFormat::ShapeZip),
            "geojson" | "json" | "application/json" => Ok(OutputFormat::GeoJson),
            _ => Err(ViewerError::InvalidParameter {
                param: "format".to_string(),
                message: format!("unsupported download format '{}'", s),
            }),
        }
    }
}

/// Supported WFS protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WfsVersion {
    #[serde(rename = "1.1.0")]
    V1_1_0,
    #[default]
    #[serde(rename = "2.0.0")]
    V2_0_0,
}

impl WfsVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            WfsVersion::V1_1_0 => "1.1.0",
            WfsVersion::V2_0_0 => "2.0.0",
        }
    }
}

/// A WFS GetFeature request for a whole layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFeatureRequest {
    pub type_name: String,
    pub output_format: OutputFormat,
    pub version: WfsVersion,
    pub srs_name: Option<String>,
}

impl GetFeatureRequest {
    /// WFS 2.0.0 request reprojected to EPSG:4326.
    pub fn new(type_name: impl Into<String>, output_format: OutputFormat) -> Self {
        Self {
            type_name: type_name.into(),
            output_format,
            version: WfsVersion::V2_0_0,
            srs_name: Some(DOWNLOAD_SRS.to_string()),
        }
    }

    pub fn with_version(mut self, version: WfsVersion) -> Self {
        self.version = version;
        self
    }

    /// Keep features in the layer's native CRS.
    pub fn without_srs(mut self) -> Self {
        self.srs_name = None;
        self
    }

    pub fn url(&self, base_url: &str) -> String {
        let mut params = vec![
            ("service", "WFS"),
            ("version", self.version.as_str()),
            ("request", "GetFeature"),
            ("typeName", self.type_name.as_str()),
            ("outputFormat", self.output_format.wfs_value()),
        ];
        if let Some(srs) = &self.srs_name {
            params.push(("srsName", srs.as_str()));
        }
        build_url(base_url, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WFS: &str = "https://geo.example.org/geoserver/wfs";

    #[test]
    fn test_default_request_url() {
        let url = GetFeatureRequest::new("ZONE:A", OutputFormat::GeoJson).url(WFS);
        assert_eq!(
            url,
            "https://geo.example.org/geoserver/wfs?service=WFS&version=2.0.0&request=GetFeature&typeName=ZONE%3AA&outputFormat=application%2Fjson&srsName=EPSG%3A4326"
        );
    }

    #[test]
    fn test_legacy_version_without_srs() {
        let url = GetFeatureRequest::new("bairros", OutputFormat::ShapeZip)
            .with_version(WfsVersion::V1_1_0)
            .without_srs()
            .url(WFS);
        assert_eq!(
            url,
            "https://geo.example.org/geoserver/wfs?service=WFS&version=1.1.0&request=GetFeature&typeName=bairros&outputFormat=shape-zip"
        );
    }

    #[test]
    fn test_version_from_config_value() {
        let version: WfsVersion = serde_json::from_str(r#""1.1.0""#).unwrap();
        assert_eq!(version, WfsVersion::V1_1_0);
        assert!(serde_json::from_str::<WfsVersion>(r#""3.0""#).is_err());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("shp".parse::<OutputFormat>().unwrap(), OutputFormat::ShapeZip);
        assert_eq!("geojson".parse::<OutputFormat>().unwrap(), OutputFormat::GeoJson);
        assert!("kmz".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_slug_round_trips_through_from_str() {
        for format in OutputFormat::ALL {
            assert_eq!(format.slug().parse::<OutputFormat>().unwrap(), format);
        }
    }
}

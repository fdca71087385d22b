//! Reading GeoJSON features.
//!
//! Input is either a single GeoJSON document (FeatureCollection, Feature or
//! bare Geometry) or a sequence of such documents, one per line. Lines may be
//! prefixed with the RFC 8142 record separator.

use std::io::Read;
use std::path::Path;

use geojson::{Feature, GeoJson};

use crate::error::{Result, TourError};

const RECORD_SEPARATOR: char = '\u{1e}';

fn strip(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == RECORD_SEPARATOR)
}

fn flatten(geojson: GeoJson) -> Vec<Feature> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    }
}

/// Parse every feature found in `text`, in order
pub fn parse_features(text: &str) -> Result<Vec<Feature>> {
    let document = strip(text);
    if document.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(geojson) = document.parse::<GeoJson>() {
        return Ok(flatten(geojson));
    }

    let mut features = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = strip(line);
        if line.is_empty() {
            continue;
        }
        let geojson = line
            .parse::<GeoJson>()
            .map_err(|e| TourError::Input(format!("line {}: {}", number + 1, e)))?;
        features.extend(flatten(geojson));
    }

    Ok(features)
}

/// Read features from `path`, or from stdin when `path` is `None` or `-`
pub fn read_features(path: Option<&Path>) -> Result<Vec<Feature>> {
    let text = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let features = parse_features(&text)?;
    log::info!("read {} features", features.len());
    Ok(features)
}

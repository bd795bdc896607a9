//! Report annotation wire records.
//!
//! The report document stores each side's annotations as a flat array of
//! records:
//!
//! ```json
//! {
//!   "leftFundusAnnotationCoordinates": [
//!     { "id": "1718000000000", "type": "rectangle", "x": 10, "y": 20,
//!       "width": 30, "height": -5, "stroke": "red", "label": "drusen" }
//!   ],
//!   "rightFundusAnnotationCoordinates": []
//! }
//! ```
//!
//! Records written by older clients are decoded leniently: numeric ids become
//! strings and missing extents fall back to defaults. A record without a
//! usable `type`, `x` or `y` fails the whole seed so that nothing half-loaded
//! reaches the store.

use serde::{Deserialize, Deserializer, Serialize};

use super::error::PersistenceError;
use crate::model::{Annotation, AnnotationId, ReportId, Shape, ShapeKind, Side, Style};
use crate::store::{AnnotationStore, ReportSeed};

/// Both sides' annotations, as fetched from and saved to a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportAnnotations {
    #[serde(
        rename = "leftFundusAnnotationCoordinates",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub left: Vec<AnnotationRecord>,
    #[serde(
        rename = "rightFundusAnnotationCoordinates",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub right: Vec<AnnotationRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<AnnotationRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<AnnotationRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A report as returned by the report fetch endpoint.
///
/// Only the id and the annotation arrays are read; other report fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedReport {
    #[serde(rename = "_id", alias = "id")]
    pub id: ReportId,
    #[serde(flatten)]
    pub annotations: ReportAnnotations,
}

/// One annotation as stored in the report document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    /// String or number; older clients wrote millisecond timestamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

impl AnnotationRecord {
    /// Build the record for a stored annotation.
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let mut record = Self {
            id: Some(serde_json::Value::String(annotation.id.as_str().to_string())),
            shape_type: Some(annotation.kind().tag().to_string()),
            stroke: annotation.style.stroke.clone(),
            fill: annotation.style.fill.clone(),
            stroke_width: annotation.style.stroke_width,
            label: Some(annotation.label.clone()),
            ..Self::default()
        };

        match annotation.shape {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                record.x = Some(x);
                record.y = Some(y);
                record.width = Some(width);
                record.height = Some(height);
            }
            Shape::Oval {
                x,
                y,
                radius_x,
                radius_y,
            } => {
                record.x = Some(x);
                record.y = Some(y);
                record.radius_x = Some(radius_x);
                record.radius_y = Some(radius_y);
            }
            Shape::Point { x, y, radius } => {
                record.x = Some(x);
                record.y = Some(y);
                record.radius = Some(radius);
            }
        }

        record
    }

    /// Decode into an annotation.
    ///
    /// `side` and `index` only locate the record in error messages.
    /// `point_radius` fills in points saved without a radius.
    pub fn to_annotation(
        &self,
        side: Side,
        index: usize,
        point_radius: f64,
    ) -> Result<Annotation, PersistenceError> {
        let tag = self
            .shape_type
            .as_deref()
            .ok_or(PersistenceError::MissingShapeType { side, index })?;
        let kind = ShapeKind::from_tag(tag).ok_or_else(|| PersistenceError::UnknownShapeType {
            side,
            index,
            found: tag.to_string(),
        })?;

        let required = |value: Option<f64>, field: &'static str| {
            value.ok_or(PersistenceError::MissingField { side, index, field })
        };
        let x = required(self.x, "x")?;
        let y = required(self.y, "y")?;

        let extent = |value: Option<f64>, field: &str, fallback: f64| {
            value.unwrap_or_else(|| {
                log::warn!(
                    "{} annotation #{} ({}) has no '{}', using {}",
                    side,
                    index,
                    kind,
                    field,
                    fallback
                );
                fallback
            })
        };

        let shape = match kind {
            ShapeKind::Rectangle => Shape::Rectangle {
                x,
                y,
                width: extent(self.width, "width", 0.0),
                height: extent(self.height, "height", 0.0),
            },
            ShapeKind::Oval => Shape::Oval {
                x,
                y,
                radius_x: extent(self.radius_x, "radiusX", 0.0).abs(),
                radius_y: extent(self.radius_y, "radiusY", 0.0).abs(),
            },
            ShapeKind::Point => Shape::Point {
                x,
                y,
                radius: extent(self.radius, "radius", point_radius).abs(),
            },
        };

        let style = Style {
            stroke: self.stroke.clone(),
            fill: self.fill.clone(),
            stroke_width: self.stroke_width,
        };

        Ok(Annotation::new(self.decode_id(side, index), shape)
            .with_label(self.label.clone().unwrap_or_default())
            .with_style(style))
    }

    /// Ids that are neither strings nor numbers are treated as missing.
    fn decode_id(&self, side: Side, index: usize) -> AnnotationId {
        match &self.id {
            Some(serde_json::Value::String(s)) => AnnotationId::new(s.as_str()),
            Some(serde_json::Value::Number(n)) => AnnotationId::new(n.to_string()),
            None | Some(serde_json::Value::Null) => AnnotationId::new(""),
            Some(other) => {
                log::warn!(
                    "{} annotation #{} has unusable id {}, a new one will be assigned",
                    side,
                    index,
                    other
                );
                AnnotationId::new("")
            }
        }
    }
}

impl ReportAnnotations {
    /// The save payload for a report's current state.
    pub fn from_store(store: &AnnotationStore) -> Self {
        let records = |side: Side| -> Vec<AnnotationRecord> {
            store
                .annotations(side)
                .iter()
                .map(AnnotationRecord::from_annotation)
                .collect()
        };
        Self {
            left: records(Side::Left),
            right: records(Side::Right),
        }
    }

    fn records(&self, side: Side) -> &[AnnotationRecord] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Decode both sides. The first bad record fails the whole seed.
    pub fn decode(&self, point_radius: f64) -> Result<ReportSeed, PersistenceError> {
        let decode_side = |side: Side| {
            self.records(side)
                .iter()
                .enumerate()
                .map(|(index, record)| record.to_annotation(side, index, point_radius))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(ReportSeed {
            left: decode_side(Side::Left)?,
            right: decode_side(Side::Right)?,
        })
    }

    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

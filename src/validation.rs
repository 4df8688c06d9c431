//! Schema validation of features against a dataset schema.
//!
//! `validate` is a pure function returning every mismatch at once. `require_valid`
//! is the guard the dataset operations call before projecting anything.

use std::fmt;

use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

use crate::error::FerryError;
use crate::types::Feature;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    MissingColumn,
    TypeMismatch,
}

/// One reason a feature does not match the schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub feature_name: String,
    pub kind: DiagnosticKind,
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feature '{}': {}", self.feature_name, self.reason)
    }
}

/// Checks each feature against the schema, in feature order.
///
/// A feature whose name is absent yields a `MissingColumn` diagnostic; one whose
/// column type is incompatible with its feature type yields a `TypeMismatch`.
pub fn validate(schema: &Schema, features: &[Feature]) -> Vec<Diagnostic> {
    features
        .iter()
        .filter_map(|feature| match schema.field_with_name(&feature.name) {
            Err(_) => Some(Diagnostic {
                feature_name: feature.name.clone(),
                kind: DiagnosticKind::MissingColumn,
                reason: format!("no column named '{}' in schema", feature.name),
            }),
            Ok(field) if !feature.feature_type.is_compatible(field.data_type()) => Some(Diagnostic {
                feature_name: feature.name.clone(),
                kind: DiagnosticKind::TypeMismatch,
                reason: format!(
                    "expected {} but column has type {}",
                    feature.feature_type,
                    field.data_type()
                ),
            }),
            Ok(_) => None,
        })
        .collect()
}

/// Fails with `FerryError::Argument` carrying every diagnostic unless all features match.
pub fn require_valid(schema: &Schema, features: &[Feature]) -> Result<(), FerryError> {
    let diagnostics = validate(schema, features);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(FerryError::Argument { diagnostics })
    }
}

pub(crate) fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureType;
    use arrow::datatypes::{DataType, Field};

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("age", DataType::Int32, true),
            Field::new("name", DataType::Utf8, true),
            Field::new("score", DataType::Float64, false),
        ])
    }

    #[test]
    fn test_valid_features_produce_no_diagnostics() {
        let features = vec![
            Feature::new("age", FeatureType::Integral),
            Feature::new("score", FeatureType::Real),
        ];
        assert!(validate(&schema(), &features).is_empty());
        assert!(require_valid(&schema(), &features).is_ok());
    }

    #[test]
    fn test_missing_column_yields_exactly_one_diagnostic() {
        let features = vec![Feature::new("income", FeatureType::Real)];
        let diagnostics = validate(&schema(), &features);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].feature_name, "income");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingColumn);
    }

    #[test]
    fn test_reports_every_problem_in_feature_order() {
        let features = vec![
            Feature::new("name", FeatureType::Real),
            Feature::new("age", FeatureType::Integral),
            Feature::new("zip", FeatureType::Text),
        ];
        let diagnostics = validate(&schema(), &features);
        let kinds: Vec<_> = diagnostics.iter().map(|d| (d.feature_name.as_str(), d.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("name", DiagnosticKind::TypeMismatch),
                ("zip", DiagnosticKind::MissingColumn)
            ]
        );
        // Pure: same input, same output.
        assert_eq!(validate(&schema(), &features), diagnostics);
    }

    #[test]
    fn test_require_valid_error_carries_all_diagnostic_text() {
        let features = vec![
            Feature::new("zip", FeatureType::Text),
            Feature::new("name", FeatureType::Binary),
        ];
        let err = require_valid(&schema(), &features).unwrap_err();
        let message = err.to_string();
        for diagnostic in validate(&schema(), &features) {
            assert!(message.contains(&diagnostic.to_string()), "{}", message);
        }
        match err {
            FerryError::Argument { diagnostics } => assert_eq!(diagnostics.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

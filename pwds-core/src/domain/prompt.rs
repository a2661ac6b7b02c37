//! Size-reference prompts
//!
//! Builds the "adult dog next to a person" prompt from a prediction-log
//! record, so the generated image shows the predicted adult size.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when a record cannot be turned into a prompt
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PromptError {
    #[error("breed must not be empty")]
    EmptyBreed,

    #[error("unknown gender: {0}")]
    UnknownGender(String),

    #[error("predicted weight must be a positive number (got {0})")]
    InvalidWeight(f64),
}

/// Dog gender as stored in prediction logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = PromptError;

    /// Accepts the English labels and the labels used by the prediction app
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value.to_ascii_lowercase().as_str() {
            "male" | "m" | "オス" => Ok(Gender::Male),
            "female" | "f" | "メス" => Ok(Gender::Female),
            _ => Err(PromptError::UnknownGender(value.to_string())),
        }
    }
}

/// Subject of a size-reference image
#[derive(Debug, Clone, PartialEq)]
pub struct SizeReference {
    pub breed: String,
    pub gender: Gender,
    pub predicted_weight_kg: f64,
}

impl SizeReference {
    pub fn new(
        breed: impl Into<String>,
        gender: Gender,
        predicted_weight_kg: f64,
    ) -> Result<Self, PromptError> {
        let breed = breed.into().trim().to_string();
        if breed.is_empty() {
            return Err(PromptError::EmptyBreed);
        }

        if !predicted_weight_kg.is_finite() || predicted_weight_kg <= 0.0 {
            return Err(PromptError::InvalidWeight(predicted_weight_kg));
        }

        Ok(Self {
            breed,
            gender,
            predicted_weight_kg,
        })
    }

    /// Weight as written in prompts and file names
    ///
    /// Whole numbers keep their decimal point (`12.0`), matching the
    /// prediction log exports.
    pub fn weight_label(&self) -> String {
        format!("{:?}", self.predicted_weight_kg)
    }

    /// Text prompt showing the dog next to a person for scale
    pub fn prompt(&self) -> String {
        format!(
            "A realistic photo of an adult {} {} dog weighing approximately {}kg \
             standing next to a person for size comparison, full body shot, \
             high quality, professional photography",
            self.gender,
            self.breed,
            self.weight_label()
        )
    }
}

/// One row of the prediction log, as far as image generation cares
///
/// Unknown columns are ignored; every field is optional because rows are
/// written incrementally by the prediction app.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionRecord {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub predicted_weight: Option<f64>,
}

impl PredictionRecord {
    /// Size reference for this record
    ///
    /// Returns `None` when breed, gender or predicted weight is missing, and
    /// an error when they are present but unusable.
    pub fn size_reference(&self) -> Option<Result<SizeReference, PromptError>> {
        let breed = self.breed.as_deref().filter(|b| !b.trim().is_empty())?;
        let gender = self.gender.as_deref().filter(|g| !g.trim().is_empty())?;
        let weight = self.predicted_weight?;

        Some(
            gender
                .parse::<Gender>()
                .and_then(|gender| SizeReference::new(breed, gender, weight)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parsing() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" Female ".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("オス".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("メス".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(
            "unknown".parse::<Gender>().unwrap_err(),
            PromptError::UnknownGender("unknown".to_string())
        );
    }

    #[test]
    fn test_prompt_text() {
        let subject = SizeReference::new("Shiba Inu", Gender::Male, 9.5).unwrap();
        assert_eq!(
            subject.prompt(),
            "A realistic photo of an adult male Shiba Inu dog weighing approximately 9.5kg \
             standing next to a person for size comparison, full body shot, high quality, \
             professional photography"
        );
    }

    #[test]
    fn test_whole_weight_keeps_decimal_point() {
        let subject = SizeReference::new("Corgi", Gender::Female, 12.0).unwrap();
        assert_eq!(subject.weight_label(), "12.0");
        assert!(subject.prompt().contains("approximately 12.0kg"));
    }

    #[test]
    fn test_size_reference_validation() {
        assert_eq!(
            SizeReference::new("  ", Gender::Female, 3.0).unwrap_err(),
            PromptError::EmptyBreed
        );
        assert_eq!(
            SizeReference::new("Poodle", Gender::Female, 0.0).unwrap_err(),
            PromptError::InvalidWeight(0.0)
        );
    }

    #[test]
    fn test_record_with_missing_fields_is_skipped() {
        let record: PredictionRecord =
            serde_json::from_str(r#"{"id": 7, "breed": "Poodle", "gender": null}"#).unwrap();
        assert!(record.size_reference().is_none());

        let record: PredictionRecord =
            serde_json::from_str(r#"{"breed": "", "gender": "male", "predicted_weight": 4.2}"#)
                .unwrap();
        assert!(record.size_reference().is_none());
    }

    #[test]
    fn test_record_to_size_reference() {
        let record: PredictionRecord = serde_json::from_str(
            r#"{
                "id": 1,
                "breed": "Toy Poodle",
                "gender": "female",
                "predicted_weight": 3.2,
                "display_name": "ignored"
            }"#,
        )
        .unwrap();

        let subject = record.size_reference().unwrap().unwrap();
        assert_eq!(subject.breed, "Toy Poodle");
        assert_eq!(subject.gender, Gender::Female);
        assert_eq!(subject.predicted_weight_kg, 3.2);
    }

    #[test]
    fn test_record_with_bad_gender_is_an_error() {
        let record = PredictionRecord {
            breed: Some("Corgi".to_string()),
            gender: Some("x".to_string()),
            predicted_weight: Some(12.0),
            ..Default::default()
        };
        assert!(matches!(
            record.size_reference(),
            Some(Err(PromptError::UnknownGender(_)))
        ));
    }
}

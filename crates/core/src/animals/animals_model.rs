//! Add-animals entry flow domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grouping::{CorrelationId, GroupEntry, MemberEntry};

/// Head count for one sex within a basics card or batch row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SexDetail {
    pub sex: String,
    pub count: u32,
}

/// One card on the basics step of the add-animals wizard.
///
/// While detail rows reference the card, its batch-level summary fields
/// (`batch_name`, `count`, `sex_details`) mirror the batch row and are not
/// edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalBasics {
    pub correlation_id: CorrelationId,
    pub animal_type: Option<String>,
    pub breed: Option<String>,
    pub sex_details: Option<Vec<SexDetail>>,
    pub count: Option<u32>,
    pub create_individual_profiles: bool,
    pub group_name: String,
    pub batch_name: String,
}

impl GroupEntry for AnimalBasics {
    type Member = AnimalDetail;

    fn with_correlation_id(id: CorrelationId) -> Self {
        AnimalBasics {
            correlation_id: id,
            animal_type: None,
            breed: None,
            sex_details: None,
            count: None,
            create_individual_profiles: false,
            group_name: String::new(),
            batch_name: String::new(),
        }
    }

    fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    // Only batch rows carry fields that flow back to the card; individual
    // profile rows leave the summary untouched.
    fn apply_member(&mut self, member: &AnimalDetail) {
        if member.kind == DetailKind::Batch {
            self.batch_name = member.batch_name.clone().unwrap_or_default();
            self.count = member.count;
            self.sex_details = member.sex_details.clone();
        }
    }
}

/// Discriminates individual-profile rows from batch rows on the details
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailKind {
    Individual,
    Batch,
}

/// One row on the details step, referencing its basics card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalDetail {
    pub basics_correlation_id: CorrelationId,
    pub kind: DetailKind,
    pub animal_type: Option<String>,
    pub breed: Option<String>,
    // Individual profile fields
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub birth_date: Option<NaiveDate>,
    // Batch fields
    pub batch_name: Option<String>,
    pub count: Option<u32>,
    pub sex_details: Option<Vec<SexDetail>>,
}

impl AnimalDetail {
    /// Blank individual-profile row prefilled from a basics card.
    pub fn individual(basics: &AnimalBasics) -> Self {
        AnimalDetail {
            basics_correlation_id: basics.correlation_id.clone(),
            kind: DetailKind::Individual,
            animal_type: basics.animal_type.clone(),
            breed: basics.breed.clone(),
            name: None,
            identifier: None,
            birth_date: None,
            batch_name: None,
            count: None,
            sex_details: None,
        }
    }

    /// Batch row prefilled from a basics card.
    pub fn batch(basics: &AnimalBasics) -> Self {
        AnimalDetail {
            basics_correlation_id: basics.correlation_id.clone(),
            kind: DetailKind::Batch,
            animal_type: basics.animal_type.clone(),
            breed: basics.breed.clone(),
            name: None,
            identifier: None,
            birth_date: None,
            batch_name: Some(basics.batch_name.clone()),
            count: basics.count,
            sex_details: basics.sex_details.clone(),
        }
    }
}

impl MemberEntry for AnimalDetail {
    fn group_correlation_id(&self) -> &CorrelationId {
        &self.basics_correlation_id
    }
}

/// Steps of the add-animals wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddAnimalsStep {
    #[default]
    Basics,
    Details,
    Summary,
}

impl AddAnimalsStep {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basics => "Animal basics",
            Self::Details => "Animal details",
            Self::Summary => "Done",
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Basics => Some(Self::Details),
            Self::Details => Some(Self::Summary),
            Self::Summary => None,
        }
    }
}

/// Individual animal payload for the record-creation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimal {
    pub animal_type: String,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub identifier: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Animal batch payload for the record-creation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnimalBatch {
    pub animal_type: String,
    pub breed: Option<String>,
    pub name: Option<String>,
    pub count: u32,
    pub sex_details: Vec<SexDetail>,
}

/// Completed form content, partitioned for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalSubmission {
    pub animals: Vec<NewAnimal>,
    pub batches: Vec<NewAnimalBatch>,
}

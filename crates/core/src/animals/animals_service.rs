use log::debug;

use crate::errors::{Error, Result, ValidationError};
use crate::grouping::{EntryState, GroupSynchronizer};

use super::animals_model::{
    AddAnimalsStep, AnimalBasics, AnimalDetail, AnimalSubmission, DetailKind, NewAnimal,
    NewAnimalBatch,
};

/// In-memory state of the add-animals wizard.
///
/// Owns the basics cards through a [`GroupSynchronizer`] and the detail
/// rows directly. Every detail mutation is followed by a reconcile pass so
/// the cards never drift from the rows that reference them.
pub struct AddAnimalsForm {
    step: AddAnimalsStep,
    synchronizer: GroupSynchronizer<AnimalBasics>,
    details: Vec<AnimalDetail>,
}

impl AddAnimalsForm {
    /// Starts the wizard on the basics step with one blank card, matching
    /// the form's default values.
    pub fn new() -> Self {
        let mut synchronizer = GroupSynchronizer::new();
        synchronizer.add_group();
        AddAnimalsForm {
            step: AddAnimalsStep::Basics,
            synchronizer,
            details: Vec::new(),
        }
    }

    pub fn step(&self) -> AddAnimalsStep {
        self.step
    }

    /// Moves the wizard to the next step, seeding detail rows when entering
    /// the details step. Returns the new step, or `None` from the summary.
    pub fn advance(&mut self) -> Option<AddAnimalsStep> {
        let next = self.step.next()?;
        if next == AddAnimalsStep::Details {
            self.seed_details();
        }
        self.step = next;
        Some(next)
    }

    pub fn basics(&self) -> &[AnimalBasics] {
        self.synchronizer.groups()
    }

    pub fn details(&self) -> &[AnimalDetail] {
        &self.details
    }

    /// Lifecycle state of the card at `index`; standalone cards are edited
    /// directly, derived cards mirror their detail rows.
    pub fn card_state(&self, index: usize) -> EntryState {
        self.synchronizer.state(index)
    }

    /// Appends a blank basics card and returns a reference to it.
    pub fn add_basics_card(&mut self) -> &AnimalBasics {
        self.synchronizer.add_group()
    }

    /// Whether the remove button is shown; the form keeps at least one
    /// card.
    pub fn can_remove_card(&self) -> bool {
        self.synchronizer.len() > 1
    }

    /// Removes the card at `index` along with every detail row that
    /// references it.
    pub fn remove_basics_card(&mut self, index: usize) {
        self.synchronizer.remove_group(index, &mut self.details);
    }

    /// Edits the card at `index` in place. A derived card's batch-level
    /// fields are overwritten again on the next reconcile pass.
    pub fn update_basics_card(&mut self, index: usize, edit: impl FnOnce(&mut AnimalBasics)) {
        self.synchronizer.edit_group(index, edit);
    }

    pub fn push_detail(&mut self, detail: AnimalDetail) {
        self.details.push(detail);
        self.reconcile();
    }

    pub fn update_detail(&mut self, index: usize, edit: impl FnOnce(&mut AnimalDetail)) {
        edit(&mut self.details[index]);
        self.reconcile();
    }

    pub fn remove_detail(&mut self, index: usize) {
        self.details.remove(index);
        self.reconcile();
    }

    /// Materializes detail rows for cards that do not have any yet.
    ///
    /// A card creating individual profiles gets one row per head; any other
    /// card gets a single batch row prefilled from the card. Cards that
    /// already have rows are left alone, so re-entering the details step
    /// does not duplicate user input.
    pub fn seed_details(&mut self) {
        let mut seeded = Vec::new();
        for card in self.synchronizer.groups() {
            let has_rows = self
                .details
                .iter()
                .any(|detail| detail.basics_correlation_id == card.correlation_id);
            if has_rows {
                continue;
            }
            match (card.create_individual_profiles, card.count) {
                (true, Some(count)) => {
                    for _ in 0..count {
                        seeded.push(AnimalDetail::individual(card));
                    }
                }
                _ => seeded.push(AnimalDetail::batch(card)),
            }
        }
        if !seeded.is_empty() {
            debug!("seeded {} detail row(s) from basics cards", seeded.len());
            self.details.extend(seeded);
            self.reconcile();
        }
    }

    /// Formats the detail rows into record-creation payloads, validating
    /// the fields the API requires.
    pub fn to_submission(&self) -> Result<AnimalSubmission> {
        let mut animals = Vec::new();
        let mut batches = Vec::new();

        for detail in &self.details {
            let animal_type = detail.animal_type.clone().ok_or_else(|| {
                Error::Validation(ValidationError::MissingField("type".to_string()))
            })?;

            match detail.kind {
                DetailKind::Individual => animals.push(NewAnimal {
                    animal_type,
                    breed: detail.breed.clone(),
                    name: detail.name.clone(),
                    identifier: detail.identifier.clone(),
                    birth_date: detail.birth_date,
                }),
                DetailKind::Batch => {
                    let count = detail.count.ok_or_else(|| {
                        Error::Validation(ValidationError::MissingField("count".to_string()))
                    })?;
                    let sex_details = detail.sex_details.clone().unwrap_or_default();
                    let sexed: u32 = sex_details.iter().map(|s| s.count).sum();
                    if sexed > count {
                        return Err(Error::Validation(ValidationError::InvalidInput(format!(
                            "sex details add up to {sexed} head but the batch has {count}"
                        ))));
                    }
                    batches.push(NewAnimalBatch {
                        animal_type,
                        breed: detail.breed.clone(),
                        name: detail.batch_name.clone(),
                        count,
                        sex_details,
                    });
                }
            }
        }

        Ok(AnimalSubmission { animals, batches })
    }

    fn reconcile(&mut self) {
        self.synchronizer.reconcile(&self.details);
    }
}

impl Default for AddAnimalsForm {
    fn default() -> Self {
        Self::new()
    }
}

//! Animals module - add-animals wizard models and form state.

mod animals_model;
mod animals_service;


pub use animals_model::{
    AddAnimalsStep, AnimalBasics, AnimalDetail, AnimalSubmission, DetailKind, NewAnimal,
    NewAnimalBatch, SexDetail,
};
pub use animals_service::AddAnimalsForm;

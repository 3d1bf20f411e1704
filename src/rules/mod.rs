//! Stateful condition rules, one per signal family.

pub mod blood_pressure;
pub mod cardiac;
pub mod oxygen;

pub use blood_pressure::BloodPressureRule;
pub use cardiac::CardiacRhythmRule;
pub use oxygen::OxygenSaturationRule;

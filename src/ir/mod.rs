//! Intermediate representation shared by conversion and resolution.

pub mod step;

pub use step::{
    AddStep, DissolveStep, DryStep, EvaporateStep, FilterStep, HeatChillStep, RepeatStep,
    SeparateStep, SeparationPurpose, Step, StirStep, TransferStep, WaitStep, WashSolidStep,
};

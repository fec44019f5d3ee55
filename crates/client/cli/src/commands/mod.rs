mod events;
mod run;

pub use events::ReadEvents;
pub use run::RunScenario;

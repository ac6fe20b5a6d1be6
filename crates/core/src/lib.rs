//! Core game logic. Keep this crate free of IO and platform concerns.

pub mod ability;
pub mod cards;
pub mod catalog;
pub mod dice;
pub mod effects;
pub mod events;
pub mod host;
pub mod run;
pub mod state;

pub use ability::*;
pub use cards::*;
pub use catalog::*;
pub use dice::*;
pub use effects::*;
pub use events::*;
pub use host::*;
pub use run::*;
pub use state::*;

//! Senses, their reach, and the contested roll that decides what they notice

pub mod awareness;
pub mod diffuser;
pub mod modifiers;
pub mod purview;
pub mod registry;
pub mod save;
pub mod sense;

pub use awareness::AwarenessLevel;
pub use diffuser::{DelayPolicy, Diffuser, DiffuserKind};
pub use modifiers::{FlatModifier, Modifier, ModifierChain, ModifierContext, ModifierStage};
pub use purview::{Purview, PurviewShape, MAX_REACH};
pub use registry::{BestRoll, DuplicatePolicy, PerceptionSet};
pub use save::{make_save, SaveOutcome, SaveRequest, SaveRules};
pub use sense::{Perception, MAX_SCORE};

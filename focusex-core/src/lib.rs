pub mod channel;
pub mod condition;
pub mod phase;
pub mod record;
pub mod report;
pub mod sample;
pub mod source;
pub mod stimulus;

pub use channel::ChannelMap;
pub use condition::ConditionLabel;
pub use phase::AcquisitionPhase;
pub use record::{ConditionRecord, RecordError, SessionRecord, SessionRecordBuilder};
pub use report::{FocusRating, SelfReport};
pub use sample::{Matrix, SampleBlock};
pub use source::{AcquisitionError, AcquisitionSource};
pub use stimulus::{Key, PresentationError, PresentationSurface};

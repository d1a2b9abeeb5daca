/// Indicates that device properties cannot describe a usable liquid handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertiesError {
    #[error("device has no heads")]
    NoHeads,

    #[error("head {head} has no channels")]
    EmptyHead { head: usize },

    #[error("slot \"{name}\" is defined more than once")]
    DuplicateSlot { name: String },
}

/// Errors raised by singleton slots and the type-name table.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SingletonError {
    #[error("Duplicate instance: slot for {type_name} is already populated")]
    DuplicateInstance { type_name: &'static str },

    #[error("No instance in slot for {type_name}")]
    NoInstance { type_name: &'static str },

    #[error("Type mismatch in slot for {type_name}")]
    TypeMismatch { type_name: &'static str },

    #[error("No class name bound for {type_name}")]
    UnboundType { type_name: &'static str },

    #[error("Class name for {type_name} is already bound to {bound:?}, refusing {requested:?}")]
    NameConflict {
        type_name: &'static str,
        bound: &'static str,
        requested: &'static str,
    },
}

/// Events emitted by a singleton registry and by payloads that report on themselves.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// Counts are `Arc::strong_count` values taken at the moment of the event.
///
/// # Examples
///
/// ```rust
/// use shared_singleton::SingletonEvent;
///
/// let event = SingletonEvent::Shutdown { type_name: "A", strong_count: 2 };
/// assert_eq!(event.to_string(), "shutdown { type_name: A, strong_count: 2 }");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SingletonEvent {
    /// `ensure` ran; `created` is false when the slot was already populated.
    Ensure {
        type_name: &'static str,
        created: bool,
    },

    /// An instance was requested from the slot.
    Instance {
        type_name: &'static str,
        /// Whether the slot held an instance after any requested creation
        found: bool,
    },

    /// The slot was cleared.
    Shutdown {
        type_name: &'static str,
        /// Strong count observed before the slot released its reference
        strong_count: usize,
    },

    /// A guarded direct construction was attempted.
    Construct {
        type_name: &'static str,
        allowed: bool,
    },

    /// A slot existence check was performed.
    Contains {
        type_name: &'static str,
        found: bool,
    },

    /// A payload value came into existence.
    Created { type_name: &'static str },

    /// A payload value is being dropped.
    Dropped { type_name: &'static str },

    /// A holder reported the strong count of the reference it carries.
    SharedCount {
        holder: &'static str,
        site: &'static str,
        /// `None` when the holder carries no reference
        strong_count: Option<usize>,
    },

    /// Every slot of the registry was cleared.
    Clear {},
}

fn count(strong_count: &Option<usize>) -> String {
    match strong_count {
        Some(n) => n.to_string(),
        None => "none".to_string(),
    }
}

impl std::fmt::Display for SingletonEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingletonEvent::Ensure { type_name, created } => {
                write!(f, "ensure {{ type_name: {}, created: {} }}", type_name, created)
            }
            SingletonEvent::Instance { type_name, found } => {
                write!(f, "instance {{ type_name: {}, found: {} }}", type_name, found)
            }
            SingletonEvent::Shutdown {
                type_name,
                strong_count,
            } => write!(
                f,
                "shutdown {{ type_name: {}, strong_count: {} }}",
                type_name, strong_count
            ),
            SingletonEvent::Construct { type_name, allowed } => {
                write!(
                    f,
                    "construct {{ type_name: {}, allowed: {} }}",
                    type_name, allowed
                )
            }
            SingletonEvent::Contains { type_name, found } => {
                write!(
                    f,
                    "contains {{ type_name: {}, found: {} }}",
                    type_name, found
                )
            }
            SingletonEvent::Created { type_name } => write!(f, "ctor<{}>", type_name),
            SingletonEvent::Dropped { type_name } => write!(f, "dtor<{}>", type_name),
            SingletonEvent::SharedCount {
                holder,
                site,
                strong_count,
            } => write!(f, "{}::{} count: {}", holder, site, count(strong_count)),
            SingletonEvent::Clear {} => write!(f, "Clearing all singleton slots"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_event_display() {
        let event = SingletonEvent::Ensure {
            type_name: "i32",
            created: true,
        };
        assert_eq!(event.to_string(), "ensure { type_name: i32, created: true }");

        let event = SingletonEvent::Instance {
            type_name: "String",
            found: false,
        };
        assert_eq!(event.to_string(), "instance { type_name: String, found: false }");

        let event = SingletonEvent::Construct {
            type_name: "u8",
            allowed: false,
        };
        assert_eq!(event.to_string(), "construct { type_name: u8, allowed: false }");

        let event = SingletonEvent::Contains {
            type_name: "u8",
            found: true,
        };
        assert_eq!(event.to_string(), "contains { type_name: u8, found: true }");
    }

    #[test]
    fn test_shared_count_display() {
        let event = SingletonEvent::SharedCount {
            holder: "B",
            site: "say_hello",
            strong_count: Some(2),
        };
        assert_eq!(event.to_string(), "B::say_hello count: 2");

        let event = SingletonEvent::SharedCount {
            holder: "B",
            site: "drop",
            strong_count: None,
        };
        assert_eq!(event.to_string(), "B::drop count: none");
    }

    #[test]
    fn test_lifecycle_display() {
        assert_eq!(SingletonEvent::Created { type_name: "A" }.to_string(), "ctor<A>");
        assert_eq!(SingletonEvent::Dropped { type_name: "A" }.to_string(), "dtor<A>");
        assert_eq!(
            SingletonEvent::Clear {}.to_string(),
            "Clearing all singleton slots"
        );
    }

    #[test]
    fn test_singleton_event_clone() {
        let event = SingletonEvent::Shutdown {
            type_name: "i32",
            strong_count: 3,
        };
        let cloned = event.clone();
        assert_eq!(event, cloned);
        assert_eq!(cloned.to_string(), "shutdown { type_name: i32, strong_count: 3 }");
    }
}

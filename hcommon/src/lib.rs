//! Shared aliases and strongly-typed values used across the hydra crates.
//!
//! ```rust
//! use hcommon::{ConversationId, GenerationOptions, MetadataMap, RequestId};
//!
//! let conversation = ConversationId::from("conversation-1");
//! let request = RequestId::new("req-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("tenant".to_string(), "acme".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3);
//! assert_eq!(conversation.as_str(), "conversation-1");
//! assert_eq!(request.to_string(), "req-1");
//! assert_eq!(options.temperature, Some(0.3));
//! ```

pub mod future {
    //! Boxed future alias shared by every trait-object seam.
    //!
    //! ```rust
    //! use hcommon::BoxFuture;
    //!
    //! fn word_count<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.split_whitespace().count() })
    //! }
    //!
    //! let _future = word_count("hello there");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Metadata map and identifier newtypes.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id!(
        /// Identifies a stored conversation whose history seeds a dispatch.
        ConversationId
    );
    string_id!(
        /// Correlates hook events emitted for a single dispatch or tool call.
        RequestId
    );
}

pub mod model {
    //! Generation settings carried from chat requests down to providers.
    //!
    //! ```rust
    //! use hcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        /// Fills unset fields from `defaults`, keeping values already present.
        pub fn or(self, defaults: GenerationOptions) -> Self {
            Self {
                temperature: self.temperature.or(defaults.temperature),
                max_tokens: self.max_tokens.or(defaults.max_tokens),
            }
        }
    }
}

pub mod registry {
    //! Generic keyed registry used by the provider and tool registries.
    //!
    //! ```rust
    //! use hcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("alpha".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("alpha"), Some(&1));
    //! assert!(registry.contains_key("alpha"));
    //! ```

    use std::borrow::Borrow;
    use std::collections::HashMap;
    use std::hash::Hash;

    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: HashMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Eq + Hash,
    {
        fn default() -> Self {
            Self {
                items: HashMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Eq + Hash,
    {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Eq + Hash + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
            self.items.iter()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{ConversationId, MetadataMap, RequestId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;

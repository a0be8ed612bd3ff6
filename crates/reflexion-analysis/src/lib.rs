//! Incremental reflexion analysis.
//!
//! Compares a specified architecture against the dependencies of an
//! implementation, related by an explicit mapping that is propagated down the
//! implementation hierarchy. Every architecture dependency ends up
//! convergent, divergent, absent, or allowed.
//!
//! # Modules
//!
//! - [`engine`]: the [`Reflexion`] engine (full and incremental analysis)
//! - [`state`]: edge states and the attributes they are stored in
//! - [`event`]: change events and the observer registry
//! - [`mapping`]: explicit and implicit mapping tables
//! - [`config`]: [`ReflexionConfig`] and environment overrides
//! - [`type_hierarchy`]: edge-type subtyping used when lifting
//! - [`report`]: serializable analysis results
//! - [`error`]: [`ReflexionError`]
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = Reflexion::new(implementation, architecture, mapping, ReflexionConfig::default())?;
//! engine.register(|event: &ChangeEvent| println!("{}", event));
//! engine.run()?;
//! let report = engine.report()?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod mapping;
pub mod report;
pub mod state;
pub mod type_hierarchy;

pub use config::ReflexionConfig;
pub use engine::Reflexion;
pub use error::ReflexionError;
pub use event::{ChangeEvent, EdgeSnapshot, ObserverId, ObserverRegistry, ReflexionObserver};
pub use mapping::{MappingTables, MAPS_TO_EDGE_TYPE};
pub use report::{EdgeReport, ReflexionReport, ReflexionSummary};
pub use state::{State, COUNTER_ATTRIBUTE, OPTIONAL_TOGGLE, STATE_ATTRIBUTE};
pub use type_hierarchy::TypeHierarchy;

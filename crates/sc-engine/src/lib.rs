use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use sc_core::{
    coerce_scalar, has_version_placeholder, is_sentinel_versions, property_value_from_json,
    Catalog, CatalogEntry, CatalogKind, Catalogs, ChildDefinition, ChildOrigin, ConcreteRecord,
    DefinitionError, PropertyMap, PropertyValue, RawChild, UserAgentDefinition,
    DEVICE_PLACEHOLDER, MAJOR_VERSION_PLACEHOLDER, MINOR_VERSION_PLACEHOLDER,
    PLATFORM_PLACEHOLDER,
};
use serde_json::{Map as JsonMap, Value as JsonValue};

#[cfg(test)]
use sc_core::ErrorKind;

mod catalog;
mod expander;
mod pipeline;
mod resolver;
mod scope;
mod validator;

#[cfg(test)]
mod engine_test_support;

pub use catalog::{resolve_catalog, resolve_catalogs, ResolvedCatalogs};
pub use expander::{expand, split_version, Combination, ExpandedRecord};
pub use pipeline::{
    build_catalog, build_family, validate_family, BuildOptions, BuildOutcome, Diagnostic,
};
pub use resolver::{materialize, merge, AncestorChain};
pub use scope::Scope;
pub use validator::validate_child;

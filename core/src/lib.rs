//! gwv-core
//!
//! Stroke data model, glyph dump, name taxonomy and rule engine shared by the
//! GlyphWiki validators (gwv-validators) and the `gwv` command.
//!
//! Public API:
//! - `KageData` / `KageLine` - Parsed KAGE stroke data
//! - `Dump` - Name-keyed glyph repository with lazy derivations
//! - `Category` / `Categorizer` - Glyph name taxonomy
//! - `ValidatorContext` - Per-glyph state shared by all rules
//! - `Predicate` - Applicability filters
//! - `Validator` / `Rule` - Rule contracts
//! - `Engine` - Runs validators over a dump
//! - `ReferenceData` - Read-only reference tables
//! - `ValidatorConfig` - Run configuration

pub mod error;
pub use error::{Error, Result};

pub mod kage;
pub use kage::{is_yoko, kage_int, KageData, KageLine, StrokeType};

pub mod dump;
pub use dump::{Dump, DumpEntry};

pub mod category;
pub use category::{categorize, Captures, Categorizer, Category};

pub mod context;
pub use context::ValidatorContext;

pub mod filters;
pub use filters::Predicate;

pub mod validator;
pub use validator::{
    line_ref, record, ErrorKind, LineRef, Row, Rule, RuleResult, SingleVerdict, Validator,
};

pub mod engine;
pub use engine::{to_json, Engine, RuleOutput, ValidationOutput};

pub mod config;
pub use config::ValidatorConfig;

pub mod refdata;
pub use refdata::ReferenceData;

/// Related-character value meaning "no relation" (〓).
pub const NO_RELATED: &str = "u3013";

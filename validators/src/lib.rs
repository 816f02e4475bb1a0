//! gwv-validators
//!
//! The GlyphWiki validation rules and the registry that builds them by name.
//!
//! Public API:
//! - `ALL_VALIDATOR_NAMES` - registered rules in run order
//! - `build` / `build_all` / `build_selected` - construct rules as
//!   `Box<dyn Validator>` for the `gwv_core::Engine`
//! - one module per rule, exposing the rule type and its error taxonomy

pub mod corner;
pub mod delquote;
pub mod delvar;
pub mod donotuse;
pub mod dup;
pub mod ids;
pub mod illegal;
pub mod j;
pub mod kosekitoki;
pub mod mj;
pub mod mustrenew;
pub mod names;
pub mod naming;
pub mod numexp;
pub mod order;
pub mod related;
pub mod skew;
pub mod ucsalias;
pub mod width;

use std::sync::Arc;

use gwv_core::{Error, ReferenceData, Result, SingleVerdict, Validator};
use tracing::debug;

pub use corner::Corner;
pub use delquote::DelQuote;
pub use delvar::DelVar;
pub use donotuse::DoNotUse;
pub use dup::Dup;
pub use ids::Ids;
pub use illegal::Illegal;
pub use j::J;
pub use kosekitoki::KosekiToki;
pub use mj::Mj;
pub use mustrenew::MustRenew;
pub use naming::Naming;
pub use numexp::NumExp;
pub use order::Order;
pub use related::Related;
pub use skew::Skew;
pub use ucsalias::UcsAlias;
pub use width::Width;

/// Every registered rule, in the order they run and appear in the output.
pub const ALL_VALIDATOR_NAMES: [&str; 18] = [
    "corner",
    "illegal",
    "skew",
    "donotuse",
    "ucsalias",
    "dup",
    "ids",
    "order",
    "delquote",
    "delvar",
    "numexp",
    "mustrenew",
    "naming",
    "related",
    "kosekitoki",
    "j",
    "mj",
    "width",
];

/// Build the rule registered as `name`.
pub fn build(name: &str, data: &ReferenceData) -> Result<Box<dyn Validator>> {
    let validator: Box<dyn Validator> = match name {
        "corner" => Box::new(SingleVerdict::new(Corner)),
        "illegal" => Box::new(SingleVerdict::new(Illegal)),
        "skew" => Box::new(SingleVerdict::new(Skew)),
        "donotuse" => Box::new(SingleVerdict::new(DoNotUse)),
        "ucsalias" => Box::new(SingleVerdict::new(UcsAlias)),
        "dup" => Box::new(SingleVerdict::new(Dup)),
        "ids" => Box::new(SingleVerdict::new(Ids)),
        "order" => Box::new(SingleVerdict::new(Order)),
        "delquote" => Box::new(SingleVerdict::new(DelQuote)),
        "delvar" => Box::new(SingleVerdict::new(DelVar)),
        "numexp" => Box::new(SingleVerdict::new(NumExp)),
        "mustrenew" => Box::new(MustRenew::default()),
        "naming" => Box::new(SingleVerdict::new(Naming::new(data))),
        "related" => Box::new(SingleVerdict::new(Related::new(Arc::clone(
            &data.cjk_sources,
        )))),
        "kosekitoki" => Box::new(SingleVerdict::new(KosekiToki)),
        "j" => Box::new(SingleVerdict::new(J::new(data))),
        "mj" => Box::new(SingleVerdict::new(Mj::new(Arc::clone(&data.mj)))),
        "width" => Box::new(SingleVerdict::new(Width::new(Arc::clone(&data.groups)))),
        _ => return Err(Error::UnknownValidator(name.to_string())),
    };
    debug!(validator = name, "built validator");
    Ok(validator)
}

/// Every registered rule.
pub fn build_all(data: &ReferenceData) -> Vec<Box<dyn Validator>> {
    ALL_VALIDATOR_NAMES
        .iter()
        .filter_map(|name| build(name, data).ok())
        .collect()
}

/// The named rules, in registry order; duplicates are built once. An empty
/// selection builds every rule.
pub fn build_selected<S: AsRef<str>>(
    names: &[S],
    data: &ReferenceData,
) -> Result<Vec<Box<dyn Validator>>> {
    if names.is_empty() {
        return Ok(build_all(data));
    }
    if let Some(unknown) = names
        .iter()
        .map(|name| name.as_ref())
        .find(|name| !ALL_VALIDATOR_NAMES.contains(name))
    {
        return Err(Error::UnknownValidator(unknown.to_string()));
    }
    ALL_VALIDATOR_NAMES
        .iter()
        .filter(|registered| names.iter().any(|n| n.as_ref() == **registered))
        .map(|name| build(name, data))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_builds_every_name() {
        let data = ReferenceData::default();
        for name in ALL_VALIDATOR_NAMES {
            assert_eq!(build(name, &data).unwrap().name(), name);
        }
        assert_eq!(build_all(&data).len(), ALL_VALIDATOR_NAMES.len());
    }

    #[test]
    fn selection_follows_registry_order() {
        let data = ReferenceData::default();
        let built = build_selected(&["width", "illegal", "width"], &data).unwrap();
        let names: Vec<_> = built.iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["illegal", "width"]);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let data = ReferenceData::default();
        assert!(matches!(
            build("nope", &data),
            Err(Error::UnknownValidator(name)) if name == "nope"
        ));
        assert!(build_selected(&["dup", "nope"], &data).is_err());
    }
}

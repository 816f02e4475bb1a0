// core/src/engine.rs
//
// Drives a set of validators over a dump: setup, one context per glyph in
// name order, then the result map keyed by validator name.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::category::Categorizer;
use crate::context::ValidatorContext;
use crate::dump::Dump;
use crate::error::{Error, Result};
use crate::filters::Predicate;
use crate::validator::{RuleResult, Validator};

/// Output of one validator. Fields are declared in key order so the JSON
/// comes out sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutput {
    pub result: RuleResult,
    pub timestamp: f64,
}

/// Output of a run keyed by validator name.
pub type ValidationOutput = BTreeMap<String, RuleOutput>;

pub struct Engine {
    validators: Vec<Box<dyn Validator>>,
    strict: bool,
    categorizer: Categorizer,
}

impl Engine {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self {
            validators,
            strict: false,
            categorizer: Categorizer::default(),
        }
    }

    /// Abort on the first rule failure instead of logging it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn category_cache_size(mut self, size: usize) -> Self {
        self.categorizer = Categorizer::new(size);
        self
    }

    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Run every validator over `dump`.
    pub fn run(mut self, dump: &Dump) -> Result<ValidationOutput> {
        for validator in self.validators.iter_mut() {
            debug!(validator = validator.name(), "setup");
            validator.setup(dump)?;
        }
        let filters: Vec<Predicate> = self.validators.iter().map(|v| v.filter()).collect();

        let names = dump.sorted_names();
        info!(glyphs = names.len(), validators = self.validators.len(), "validating");
        let mut failures = 0usize;

        for name in names {
            let Some(glyph) = dump.get(name) else {
                continue;
            };
            let (category, captures) = self.categorizer.categorize(name);
            let ctx = ValidatorContext::new(dump, glyph, category, captures);

            for (validator, filter) in self.validators.iter_mut().zip(&filters) {
                if !filter.eval(&ctx) {
                    continue;
                }
                let message = match run_one(validator.as_mut(), &ctx, self.strict) {
                    Ok(()) => continue,
                    Err(message) => message,
                };
                if self.strict {
                    return Err(Error::Rule {
                        rule: validator.name().to_string(),
                        glyph: name.to_string(),
                        message,
                    });
                }
                failures += 1;
                error!(validator = validator.name(), glyph = name, "{message}");
            }
        }

        if failures > 0 {
            info!(failures, "validation finished with rule failures");
        }

        let timestamp = dump.timestamp();
        Ok(self
            .validators
            .iter()
            .map(|v| {
                (
                    v.name().to_string(),
                    RuleOutput {
                        result: v.result(),
                        timestamp,
                    },
                )
            })
            .collect())
    }
}

fn run_one(
    validator: &mut dyn Validator,
    ctx: &ValidatorContext<'_>,
    strict: bool,
) -> std::result::Result<(), String> {
    if strict {
        return validator.validate(ctx).map_err(|e| e.to_string());
    }
    match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(ctx))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Compact JSON with sorted keys.
pub fn to_json(output: &ValidationOutput) -> serde_json::Result<String> {
    serde_json::to_string(output)
}

//! Quotes of old revisions.
//!
//! Accumulates, per quoted `name@rev`, the glyphs still quoting it. Code `@`
//! collects old revisions of parts whose newest revision itself quotes an old
//! revision (renewing those needs a cascade); code `0` collects the rest.

use std::collections::{BTreeMap, BTreeSet};

use gwv_core::filters::{categories, category_in};
use gwv_core::{Predicate, Result, RuleResult, Validator, ValidatorContext};
use serde_json::Value;

const RENEWABLE: &str = "0";
const CASCADING: &str = "@";

#[derive(Debug)]
pub struct MustRenew {
    /// code → quoted name with revision → quoting glyphs
    quotes: BTreeMap<&'static str, BTreeMap<String, Vec<String>>>,
}

impl Default for MustRenew {
    fn default() -> Self {
        let quotes = [RENEWABLE, CASCADING]
            .into_iter()
            .map(|code| (code, BTreeMap::new()))
            .collect();
        Self { quotes }
    }
}

impl Validator for MustRenew {
    fn name(&self) -> &'static str {
        "mustrenew"
    }

    fn filter(&self) -> Predicate {
        !Predicate::IsAlias & !category_in(categories::USER_OWNED)
    }

    fn validate(&mut self, ctx: &ValidatorContext<'_>) -> Result<()> {
        let mut renewable = BTreeSet::new();
        let mut cascading = BTreeSet::new();
        for line in ctx.kage().quotes() {
            let Some(quoted) = line.part_name() else {
                continue;
            };
            if !quoted.contains('@') {
                continue;
            }
            let base = line.part_base_name().unwrap_or(quoted);
            let newest_quotes_old = ctx
                .dump
                .get(base)
                .is_some_and(|part| part.gdata.contains('@'));
            if newest_quotes_old {
                cascading.insert(quoted);
            } else {
                renewable.insert(quoted);
            }
        }
        for (code, quoted) in [(RENEWABLE, renewable), (CASCADING, cascading)] {
            let by_part = self.quotes.entry(code).or_default();
            for q in quoted {
                by_part
                    .entry(q.to_string())
                    .or_default()
                    .push(ctx.name().to_string());
            }
        }
        Ok(())
    }

    /// Rows `[quoted@rev, glyph...]` sorted by quoted name. Both codes are
    /// always present.
    fn result(&self) -> RuleResult {
        self.quotes
            .iter()
            .map(|(code, by_part)| {
                let rows = by_part
                    .iter()
                    .map(|(quoted, glyphs)| {
                        std::iter::once(quoted)
                            .chain(glyphs)
                            .map(|s| Value::from(s.as_str()))
                            .collect()
                    })
                    .collect();
                (code.to_string(), rows)
            })
            .collect()
    }
}

//! Rule framework.
//!
//! A rule implements [`Validator`]: `setup` once with the whole dump,
//! `validate` per applicable glyph, `result` at the end. Most rules emit at
//! most one finding per glyph; those implement the narrower [`Rule`] trait
//! and are wrapped in [`SingleVerdict`], which does the bookkeeping.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::context::ValidatorContext;
use crate::dump::Dump;
use crate::error::Result;
use crate::filters::Predicate;
use crate::kage::KageLine;

/// One result row: `[glyph, payload...]`.
pub type Row = Vec<Value>;

/// Findings of one rule keyed by error code.
pub type RuleResult = BTreeMap<String, Vec<Row>>;

/// A rule's closed error taxonomy.
pub trait ErrorKind {
    /// Code under which the finding is recorded.
    fn code(&self) -> &'static str;

    /// Payload appended after the glyph name.
    fn payload(&self) -> Row {
        Vec::new()
    }
}

pub trait Validator {
    fn name(&self) -> &'static str;

    fn filter(&self) -> Predicate {
        Predicate::Always
    }

    fn setup(&mut self, _dump: &Dump) -> Result<()> {
        Ok(())
    }

    fn validate(&mut self, ctx: &ValidatorContext<'_>) -> Result<()>;

    fn result(&self) -> RuleResult;
}

/// A rule that returns at most one error per glyph.
pub trait Rule {
    type Error: ErrorKind;

    const NAME: &'static str;

    fn filter(&self) -> Predicate {
        Predicate::Always
    }

    fn setup(&mut self, _dump: &Dump) -> Result<()> {
        Ok(())
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<Self::Error>>;

    /// Row recorded for a finding.
    fn row(&self, glyph: &str, error: &Self::Error) -> Row {
        let mut row = vec![Value::from(glyph)];
        row.extend(error.payload());
        row
    }

    /// Final ordering of the collected rows.
    fn finish(&self, _result: &mut RuleResult) {}
}

/// Adapts a [`Rule`] to [`Validator`].
pub struct SingleVerdict<R: Rule> {
    rule: R,
    results: RuleResult,
}

impl<R: Rule> SingleVerdict<R> {
    pub fn new(rule: R) -> Self {
        Self {
            rule,
            results: RuleResult::new(),
        }
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }
}

impl<R: Rule> Validator for SingleVerdict<R> {
    fn name(&self) -> &'static str {
        R::NAME
    }

    fn filter(&self) -> Predicate {
        self.rule.filter()
    }

    fn setup(&mut self, dump: &Dump) -> Result<()> {
        self.rule.setup(dump)
    }

    fn validate(&mut self, ctx: &ValidatorContext<'_>) -> Result<()> {
        if let Some(error) = self.rule.is_invalid(ctx)? {
            let row = self.rule.row(ctx.name(), &error);
            record(&mut self.results, error.code(), row);
        }
        Ok(())
    }

    fn result(&self) -> RuleResult {
        let mut result = self.results.clone();
        self.rule.finish(&mut result);
        result
    }
}

/// Append a row under `code`.
pub fn record(results: &mut RuleResult, code: &str, row: Row) {
    results.entry(code.to_string()).or_default().push(row);
}

/// A stroke record cited in a finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    pub number: usize,
    pub text: String,
}

impl LineRef {
    /// `[line_number, line_text]`
    pub fn value(&self) -> Value {
        Value::Array(vec![Value::from(self.number), Value::from(self.text.as_str())])
    }
}

impl From<&KageLine> for LineRef {
    fn from(line: &KageLine) -> Self {
        Self {
            number: line.line_number,
            text: line.strdata.clone(),
        }
    }
}

/// `[line_number, line_text]`, the way stroke records are cited in rows.
pub fn line_ref(line: &KageLine) -> Value {
    LineRef::from(line).value()
}

/// Sort every row list by the payload column at `index`.
pub fn sort_rows_by_str(result: &mut RuleResult, index: usize) {
    for rows in result.values_mut() {
        rows.sort_by(|a, b| {
            let ka = a.get(index).and_then(Value::as_str).unwrap_or_default();
            let kb = b.get(index).and_then(Value::as_str).unwrap_or_default();
            ka.cmp(kb)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::Dump;

    struct NoStrokes;

    enum NoStrokesError {
        Empty,
    }

    impl ErrorKind for NoStrokesError {
        fn code(&self) -> &'static str {
            "0"
        }

        fn payload(&self) -> Row {
            vec![Value::from("empty")]
        }
    }

    impl Rule for NoStrokes {
        type Error = NoStrokesError;
        const NAME: &'static str = "nostrokes";

        fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<NoStrokesError>> {
            Ok(ctx.glyph.gdata.is_empty().then_some(NoStrokesError::Empty))
        }
    }

    #[test]
    fn single_verdict_records_rows() {
        let dump = Dump::from_entries([("a", "u3013", ""), ("b", "u3013", "0:0:0:0")], 0.0);
        let mut validator = SingleVerdict::new(NoStrokes);
        for name in dump.sorted_names() {
            let ctx = ValidatorContext::for_glyph(&dump, dump.get(name).unwrap());
            validator.validate(&ctx).unwrap();
        }
        let result = validator.result();
        assert_eq!(validator.name(), "nostrokes");
        assert_eq!(result.len(), 1);
        assert_eq!(result["0"], vec![vec![Value::from("a"), Value::from("empty")]]);
    }
}

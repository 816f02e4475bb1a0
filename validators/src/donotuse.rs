//! Quotes of glyphs marked do-not-use.

use gwv_core::{ErrorKind, Predicate, Result, Row, Rule, ValidatorContext};
use serde_json::Value;

const DO_NOT_USE_MARK: &str = "do-not-use";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoNotUseError {
    /// Quoted names, `@revision` included.
    pub quoted: Vec<String>,
}

impl ErrorKind for DoNotUseError {
    fn code(&self) -> &'static str {
        "0"
    }

    fn payload(&self) -> Row {
        self.quoted.iter().map(|q| Value::from(q.as_str())).collect()
    }
}

#[derive(Debug, Default)]
pub struct DoNotUse;

impl Rule for DoNotUse {
    type Error = DoNotUseError;
    const NAME: &'static str = "donotuse";

    fn filter(&self) -> Predicate {
        !Predicate::IsAlias
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<DoNotUseError>> {
        let quoted: Vec<String> = ctx
            .kage()
            .quotes()
            .filter(|line| {
                line.part_base_name()
                    .and_then(|name| ctx.dump.get(name))
                    .is_some_and(|part| part.gdata.contains(DO_NOT_USE_MARK))
            })
            .filter_map(|line| line.part_name().map(str::to_string))
            .collect();
        Ok((!quoted.is_empty()).then_some(DoNotUseError { quoted }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    #[test]
    fn lists_every_marked_quote() {
        let dump = Dump::from_entries(
            [
                ("u4e00", "u3013", "99:0:0:0:0:200:100:old-part@2$99:0:0:0:100:200:200:u4e01$99:0:0:0:0:100:200:old-part"),
                ("old-part", "u3013", "99:0:0:0:0:200:200:do-not-use-old-part"),
                ("u4e01", "u3013", "1:0:0:10:100:190:100"),
            ],
            0.0,
        );
        let ctx = ValidatorContext::for_glyph(&dump, dump.get("u4e00").unwrap());
        let err = DoNotUse.is_invalid(&ctx).unwrap().unwrap();
        assert_eq!(err.quoted, vec!["old-part@2", "old-part"]);

        let clean = ValidatorContext::for_glyph(&dump, dump.get("u4e01").unwrap());
        assert_eq!(DoNotUse.is_invalid(&clean).unwrap(), None);
    }
}

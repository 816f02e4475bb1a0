//! Quotes of glyphs that do not exist.

use gwv_core::{ErrorKind, Result, Row, Rule, ValidatorContext};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingQuoteError {
    /// Quoted name, `@revision` included.
    pub quoted: String,
}

impl ErrorKind for MissingQuoteError {
    fn code(&self) -> &'static str {
        "0"
    }

    fn payload(&self) -> Row {
        vec![Value::from(self.quoted.as_str())]
    }
}

#[derive(Debug, Default)]
pub struct DelQuote;

impl Rule for DelQuote {
    type Error = MissingQuoteError;
    const NAME: &'static str = "delquote";

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<MissingQuoteError>> {
        let missing = ctx.kage().quotes().find(|line| {
            line.part_base_name()
                .is_some_and(|name| !ctx.dump.contains(name))
        });
        Ok(missing
            .and_then(|line| line.part_name())
            .map(|quoted| MissingQuoteError {
                quoted: quoted.to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    #[test]
    fn first_missing_quote() {
        let dump = Dump::from_entries(
            [
                ("u4e00", "u3013", "99:0:0:0:0:200:200:u4e01@3$99:0:0:0:0:200:200:gone@1$99:0:0:0:0:200:200:gone2"),
                ("u4e01", "u3013", "1:0:0:10:100:190:100"),
            ],
            0.0,
        );
        let ctx = ValidatorContext::for_glyph(&dump, dump.get("u4e00").unwrap());
        assert_eq!(
            DelQuote.is_invalid(&ctx).unwrap(),
            Some(MissingQuoteError {
                quoted: "gone@1".into()
            })
        );
        let ok = ValidatorContext::for_glyph(&dump, dump.get("u4e01").unwrap());
        assert_eq!(DelQuote.is_invalid(&ok).unwrap(), None);
    }
}

//! Part order: a glyph should not start with a right, bottom or inner part,
//! nor end with a left, top or outer one.

use gwv_core::filters::{categories, category_in};
use gwv_core::{ErrorKind, Predicate, Result, Row, Rule, ValidatorContext};
use serde_json::Value;

use crate::names::henka_code;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// 右部品が最初
    RightFirst,
    /// 下部品が最初
    BottomFirst,
    /// 囲み内側部品が最初
    InnerFirst,
    /// 左部品が最後
    LeftLast,
    /// 上部品が最後
    TopLast,
    /// 囲み外側部品が最後
    OuterLast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderError {
    pub kind: OrderKind,
    pub part: String,
}

impl ErrorKind for OrderError {
    fn code(&self) -> &'static str {
        match self.kind {
            OrderKind::RightFirst => "2",
            OrderKind::BottomFirst => "4",
            OrderKind::InnerFirst => "6",
            OrderKind::LeftLast => "11",
            OrderKind::TopLast => "13",
            OrderKind::OuterLast => "15",
        }
    }

    fn payload(&self) -> Row {
        vec![Value::from(self.part.as_str())]
    }
}

fn first_kind(henka: &str) -> Option<OrderKind> {
    match henka {
        "02" => Some(OrderKind::RightFirst),
        "04" | "14" | "24" => Some(OrderKind::BottomFirst),
        "06" => Some(OrderKind::InnerFirst),
        _ => None,
    }
}

fn last_kind(henka: &str) -> Option<OrderKind> {
    match henka {
        "01" => Some(OrderKind::LeftLast),
        "03" => Some(OrderKind::TopLast),
        "05" | "10" | "11" | "15" => Some(OrderKind::OuterLast),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct Order;

impl Rule for Order {
    type Error = OrderError;
    const NAME: &'static str = "order";

    fn filter(&self) -> Predicate {
        !Predicate::IsAlias & !category_in(categories::USER_OWNED)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<OrderError>> {
        let lines = &ctx.kage().lines;
        if lines.len() <= 1 {
            return Ok(None);
        }
        let ends = [
            (lines.first(), first_kind as fn(&str) -> Option<OrderKind>),
            (lines.last(), last_kind),
        ];
        for (line, classify) in ends {
            let Some(part) = line.and_then(|l| l.part_name()) else {
                continue;
            };
            if let Some(kind) = henka_code(part).and_then(classify) {
                return Ok(Some(OrderError {
                    kind,
                    part: part.to_string(),
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    fn check(data: &str) -> Option<(&'static str, String)> {
        let dump = Dump::from_entries([("u6797", "u3013", data)], 0.0);
        let ctx = ValidatorContext::for_glyph(&dump, dump.get("u6797").unwrap());
        Order.is_invalid(&ctx).unwrap().map(|e| (e.code(), e.part))
    }

    #[test]
    fn first_and_last_parts() {
        assert_eq!(
            check("99:0:0:0:0:200:200:u6728-01$99:0:0:0:0:200:200:u6728-02"),
            None
        );
        assert_eq!(
            check("99:0:0:0:0:200:200:u6728-02$99:0:0:0:0:200:200:u6728-01"),
            Some(("2", "u6728-02".to_string()))
        );
        assert_eq!(
            check("1:0:0:10:10:190:10$99:0:0:0:0:200:200:u6728-j03@2"),
            Some(("13", "u6728-j03@2".to_string()))
        );
        assert_eq!(
            check("99:0:0:0:0:200:200:u56d7-05$1:0:0:10:10:190:10"),
            None
        );
    }

    #[test]
    fn single_record_is_ignored() {
        assert_eq!(check("99:0:0:0:0:200:100:u6728-02"), None);
    }
}

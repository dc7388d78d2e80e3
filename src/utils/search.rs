//! Case-insensitive column matching that behaves the same on Postgres and
//! SQLite. Plain `LIKE` is case-sensitive on Postgres, so both sides are
//! lower-cased instead.

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::Condition;

fn lowered<C: IntoColumnRef>(column: C) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

/// `column` contains `term`, ignoring case
pub fn icontains<C: IntoColumnRef>(column: C, term: &str) -> SimpleExpr {
    lowered(column).like(format!("%{}%", term.to_lowercase()))
}

/// `column` equals `value`, ignoring case
pub fn iexact<C: IntoColumnRef>(column: C, value: &str) -> SimpleExpr {
    lowered(column).eq(value.to_lowercase())
}

/// Any of `columns` contains `term`
pub fn any_icontains<C, I>(columns: I, term: &str) -> Condition
where
    C: IntoColumnRef,
    I: IntoIterator<Item = C>,
{
    columns
        .into_iter()
        .fold(Condition::any(), |cond, column| cond.add(icontains(column, term)))
}

/// Trimmed search term, `None` when absent or blank
pub fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|term| !term.is_empty())
}

//! Clause-list utilities shared by the scan and join translators.
//!
//! Nothing here mutates its input: every rewritten clause is a fresh value.

use relplan_core::catalog::Catalog;
use relplan_core::error::{Error, Result};
use relplan_core::expr::{Expr, OpExpr, Relids};
use relplan_core::path::RestrictInfo;

/// Bare clauses of a list of restriction wrappers.
pub fn get_actual_clauses(rinfos: &[RestrictInfo]) -> Vec<Expr> {
    rinfos.iter().map(|ri| ri.clause.clone()).collect()
}

/// Split outer-join clauses into `(join_clauses, other_clauses)`.
///
/// Clauses pushed down from above the join still have to filter the
/// null-extended output, so they cannot take part in deciding matches.
pub fn get_actual_join_clauses(rinfos: &[RestrictInfo]) -> (Vec<Expr>, Vec<Expr>) {
    let mut join = Vec::new();
    let mut other = Vec::new();
    for ri in rinfos {
        if ri.is_pushed_down {
            other.push(ri.clause.clone());
        } else {
            join.push(ri.clause.clone());
        }
    }
    (join, other)
}

/// Members of `clauses` structurally equal to no member of `remove`.
/// Order of the survivors is preserved.
pub fn set_difference(clauses: Vec<Expr>, remove: &[Expr]) -> Vec<Expr> {
    clauses.into_iter().filter(|c| !remove.contains(c)).collect()
}

/// Order clauses for evaluation at one node: anything running a per-row
/// sub-plan goes last, relative order otherwise kept.
///
/// Only queries with sub-selects can contain such clauses, so the split is
/// skipped otherwise. Initplan outputs are plain params and never move.
pub fn order_qual_clauses(has_sublinks: bool, clauses: Vec<Expr>) -> Vec<Expr> {
    if !has_sublinks {
        return clauses;
    }
    let (with_subplans, mut ordered): (Vec<Expr>, Vec<Expr>) =
        clauses.into_iter().partition(Expr::contain_subplans);
    ordered.extend(with_subplans);
    ordered
}

/// Swap the operands of a binary clause and replace its operator with the
/// commutator. Applying this twice restores the original clause.
pub fn commute_clause(op: &mut OpExpr, catalog: &dyn Catalog) -> Result<()> {
    if !op.is_binary() {
        return Err(Error::NotBinaryOpClause);
    }
    let commutator = catalog
        .commutator(op.opno)
        .ok_or(Error::NoCommutator(op.opno))?;
    op.opno = commutator;
    op.args.swap(0, 1);
    Ok(())
}

/// Extract merge/hash clauses with the outer relation's operand on the left.
///
/// A clause whose right operand is computable from the outer side alone is
/// commuted in a copy; the wrappers passed in are left untouched.
pub fn get_switched_clauses(
    clauses: &[RestrictInfo],
    outer_relids: &Relids,
    catalog: &dyn Catalog,
) -> Result<Vec<Expr>> {
    clauses
        .iter()
        .map(|ri| {
            let op = ri.clause.as_op().ok_or(Error::NotBinaryOpClause)?;
            if ri.right_relids.is_subset(outer_relids) {
                let mut switched = op.clone();
                commute_clause(&mut switched, catalog)?;
                Ok(Expr::Op(switched))
            } else {
                Ok(ri.clause.clone())
            }
        })
        .collect()
}

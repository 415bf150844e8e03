//! Rewriting of index qualifications into index-key space.
//!
//! The search phase hands over index conditions written against table
//! columns. The index scan wants each condition as `key_column op value`,
//! where `key_column` is a column reference whose attribute number is the
//! 1-based position within the index rather than within the table.

use relplan_core::catalog::Catalog;
use relplan_core::error::{Error, Result};
use relplan_core::expr::Expr;
use relplan_core::id::{OpClassId, RelId};
use relplan_core::path::IndexOptInfo;

use crate::clauses::commute_clause;

/// Output of [`fix_indxqual_references`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedIndexQuals {
    /// One group per index, in the same order as the input.
    pub fixed: Vec<Vec<Expr>>,
    /// Original clauses the index may over-select on. Groups that need no
    /// recheck are omitted.
    pub recheck: Vec<Vec<Expr>>,
}

/// Rewrite every qual group against its index.
pub fn fix_indxqual_references(
    indexquals: &[Vec<Expr>],
    indexinfo: &[IndexOptInfo],
    baserelid: RelId,
    catalog: &dyn Catalog,
) -> Result<FixedIndexQuals> {
    if indexquals.len() != indexinfo.len() {
        return Err(Error::IndexQualMismatch {
            quals: indexquals.len(),
            indexes: indexinfo.len(),
        });
    }

    let mut out = FixedIndexQuals::default();
    for (group, index) in indexquals.iter().zip(indexinfo) {
        let (fixed, recheck) = fix_indxqual_sublist(group, baserelid, index, catalog)?;
        out.fixed.push(fixed);
        if !recheck.is_empty() {
            out.recheck.push(recheck);
        }
    }
    Ok(out)
}

/// Rewrite one AND-group for one index. Returns `(fixed, recheck)`.
pub fn fix_indxqual_sublist(
    group: &[Expr],
    baserelid: RelId,
    index: &IndexOptInfo,
    catalog: &dyn Catalog,
) -> Result<(Vec<Expr>, Vec<Expr>)> {
    let mut fixed = Vec::with_capacity(group.len());
    let mut recheck = Vec::new();

    for clause in group {
        let mut newclause = match clause {
            Expr::Op(op) if op.is_binary() => op.clone(),
            _ => return Err(Error::NotBinaryOpClause),
        };

        // The index key is the operand referring to the scanned relation and
        // nothing else.
        let leftvarnos = newclause.args[0].pull_varnos();
        if leftvarnos.len() != 1 || !leftvarnos.contains(&baserelid) {
            commute_clause(&mut newclause, catalog)?;
        }

        let (key, opclass) = fix_indxqual_operand(&newclause.args[0], baserelid, index)?;
        newclause.args[0] = key;

        if catalog.op_requires_recheck(newclause.opno, opclass) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                index = %index.index_id,
                opno = %newclause.opno,
                "lossy index operator, original clause rechecked"
            );
            recheck.push(clause.clone());
        }
        fixed.push(Expr::Op(newclause));
    }

    Ok((fixed, recheck))
}

/// Map the index-key operand to its index column, returning the rewritten
/// operand and the operator class of that column.
fn fix_indxqual_operand(
    node: &Expr,
    baserelid: RelId,
    index: &IndexOptInfo,
) -> Result<(Expr, OpClassId)> {
    let node = match node {
        Expr::Relabel { arg, .. } => arg.as_ref(),
        other => other,
    };

    match node {
        Expr::Var {
            relid,
            attno,
            vartype,
        } => {
            if *relid == baserelid {
                if index.index_proc.is_some() {
                    return Err(Error::Invariant(format!(
                        "plain column {} used as key of functional index {}",
                        attno, index.index_id
                    )));
                }
                if let Some(pos) = index.index_keys.iter().position(|k| k == attno) {
                    let opclass = index.opclasses.get(pos).copied().ok_or_else(|| {
                        Error::Invariant(format!(
                            "index {} has no operator class for key {}",
                            index.index_id,
                            pos + 1
                        ))
                    })?;
                    return Ok((Expr::var(*relid, pos as i32 + 1, *vartype), opclass));
                }
            }
            Err(Error::NotIndexKey {
                index: index.index_id,
                relid: *relid,
                attno: *attno,
            })
        }
        // Functional indexes have a single key column.
        Expr::Func { funcid, .. } if index.index_proc == Some(*funcid) => {
            let opclass = index.opclasses.first().copied().ok_or_else(|| {
                Error::Invariant(format!(
                    "functional index {} has no operator class",
                    index.index_id
                ))
            })?;
            Ok((Expr::var(baserelid, 1, node.expr_type()), opclass))
        }
        _ => Err(Error::Invariant(format!(
            "index {} key operand is neither a column nor its function",
            index.index_id
        ))),
    }
}

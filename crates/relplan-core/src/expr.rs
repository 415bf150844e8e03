//! Expression trees for qualifications, target lists, and sort keys.
//!
//! Expressions are plain owned values. Cloning an expression is always a deep
//! copy, including any sub-plan it embeds, so two places in a plan tree never
//! alias the same clause.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{AttrNumber, FuncId, OperatorId, PlanId, RelId, TypeId};
use crate::plan::Plan;

/// Set of base relations referenced by an expression or covered by a path.
pub type Relids = BTreeSet<RelId>;

pub const BOOL_TYPE: TypeId = TypeId::new(16);
pub const INT8_TYPE: TypeId = TypeId::new(20);
pub const INT4_TYPE: TypeId = TypeId::new(23);
pub const TEXT_TYPE: TypeId = TypeId::new(25);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    /// Supplied by the caller of the query.
    Extern,
    /// Produced at execution time, e.g. the output of an initplan.
    Exec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

/// Operator invocation. Qualification clauses handed to index and join
/// machinery are binary: exactly two arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpExpr {
    pub opno: OperatorId,
    pub result_type: TypeId,
    pub args: Vec<Expr>,
}

impl OpExpr {
    pub fn binary(opno: OperatorId, result_type: TypeId, left: Expr, right: Expr) -> Self {
        Self {
            opno,
            result_type,
            args: vec![left, right],
        }
    }

    pub fn is_binary(&self) -> bool {
        self.args.len() == 2
    }

    pub fn left(&self) -> Option<&Expr> {
        if self.is_binary() {
            self.args.first()
        } else {
            None
        }
    }

    pub fn right(&self) -> Option<&Expr> {
        if self.is_binary() {
            self.args.get(1)
        } else {
            None
        }
    }
}

/// A sub-select evaluated per row of the enclosing node. It owns its plan.
///
/// Uncorrelated sub-selects run once as initplans and are referenced through
/// `Expr::Param { kind: ParamKind::Exec, .. }` instead; they never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubPlanExpr {
    pub plan_id: PlanId,
    /// Outer-row values passed down on every evaluation.
    pub args: Vec<Expr>,
    pub result_type: TypeId,
    pub plan: Box<Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Var {
        relid: RelId,
        attno: AttrNumber,
        vartype: TypeId,
    },
    Const {
        consttype: TypeId,
        value: Datum,
    },
    Param {
        kind: ParamKind,
        id: u32,
        paramtype: TypeId,
    },
    Op(OpExpr),
    Func {
        funcid: FuncId,
        result_type: TypeId,
        args: Vec<Expr>,
    },
    /// Binary-compatible type coercion; no runtime work.
    Relabel {
        arg: Box<Expr>,
        result_type: TypeId,
    },
    Bool {
        op: BoolOp,
        args: Vec<Expr>,
    },
    Aggref {
        aggfnoid: FuncId,
        result_type: TypeId,
        args: Vec<Expr>,
    },
    SubPlan(SubPlanExpr),
}

impl Expr {
    pub fn var(relid: RelId, attno: AttrNumber, vartype: TypeId) -> Self {
        Expr::Var {
            relid,
            attno,
            vartype,
        }
    }

    pub fn int4(v: i64) -> Self {
        Expr::Const {
            consttype: INT4_TYPE,
            value: Datum::Int(v),
        }
    }

    pub fn null(consttype: TypeId) -> Self {
        Expr::Const {
            consttype,
            value: Datum::Null,
        }
    }

    pub fn bool_const(b: bool) -> Self {
        Expr::Const {
            consttype: BOOL_TYPE,
            value: Datum::Bool(b),
        }
    }

    /// Binary operator clause returning boolean.
    pub fn op(opno: OperatorId, left: Expr, right: Expr) -> Self {
        Expr::Op(OpExpr::binary(opno, BOOL_TYPE, left, right))
    }

    pub fn as_op(&self) -> Option<&OpExpr> {
        match self {
            Expr::Op(op) => Some(op),
            _ => None,
        }
    }

    /// Non-null integer constant value, if this is one.
    pub fn as_int_const(&self) -> Option<i64> {
        match self {
            Expr::Const {
                value: Datum::Int(v),
                ..
            } => Some(*v),
            _ => None,
        }
    }

    pub fn expr_type(&self) -> TypeId {
        match self {
            Expr::Var { vartype, .. } => *vartype,
            Expr::Const { consttype, .. } => *consttype,
            Expr::Param { paramtype, .. } => *paramtype,
            Expr::Op(op) => op.result_type,
            Expr::Func { result_type, .. }
            | Expr::Relabel { result_type, .. }
            | Expr::Aggref { result_type, .. } => *result_type,
            Expr::Bool { .. } => BOOL_TYPE,
            Expr::SubPlan(sp) => sp.result_type,
        }
    }

    /// Immediate sub-expressions. A sub-plan contributes its argument list,
    /// not the expressions inside its own plan.
    pub fn children(&self) -> &[Expr] {
        match self {
            Expr::Var { .. } | Expr::Const { .. } | Expr::Param { .. } => &[],
            Expr::Op(op) => &op.args,
            Expr::Func { args, .. } | Expr::Bool { args, .. } | Expr::Aggref { args, .. } => args,
            Expr::Relabel { arg, .. } => std::slice::from_ref(arg.as_ref()),
            Expr::SubPlan(sp) => &sp.args,
        }
    }

    /// Set of relations whose columns this expression reads.
    pub fn pull_varnos(&self) -> Relids {
        let mut out = Relids::new();
        self.collect_varnos(&mut out);
        out
    }

    fn collect_varnos(&self, out: &mut Relids) {
        if let Expr::Var { relid, .. } = self {
            out.insert(*relid);
        }
        for child in self.children() {
            child.collect_varnos(out);
        }
    }

    /// True if any per-row sub-plan appears anywhere in the expression.
    pub fn contain_subplans(&self) -> bool {
        matches!(self, Expr::SubPlan(_)) || self.children().iter().any(Expr::contain_subplans)
    }
}

/// Number of distinct relations referenced across a list of clauses.
pub fn num_relids(clauses: &[Expr]) -> usize {
    let mut all = Relids::new();
    for c in clauses {
        c.collect_varnos(&mut all);
    }
    all.len()
}

/// Turn an implicitly-ANDed list into a single expression.
pub fn make_ands_explicit(mut clauses: Vec<Expr>) -> Expr {
    match clauses.len() {
        0 => Expr::bool_const(true),
        1 => clauses.remove(0),
        _ => Expr::Bool {
            op: BoolOp::And,
            args: clauses,
        },
    }
}

pub fn make_orclause(args: Vec<Expr>) -> Expr {
    Expr::Bool {
        op: BoolOp::Or,
        args,
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "NULL"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Int(i) => write!(f, "{i}"),
            Datum::Float(x) => write!(f, "{x}"),
            Datum::Text(s) => write!(f, "'{s}'"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, args: &[Expr], sep: &str) -> fmt::Result {
    for (i, a) in args.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{a}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var { relid, attno, .. } => write!(f, "${}.{}", relid.get(), attno),
            Expr::Const { value, .. } => write!(f, "{value}"),
            Expr::Param { kind, id, .. } => match kind {
                ParamKind::Extern => write!(f, "${id}"),
                ParamKind::Exec => write!(f, "$exec{id}"),
            },
            Expr::Op(op) if op.is_binary() => {
                write!(f, "({} op{} {})", op.args[0], op.opno.get(), op.args[1])
            }
            Expr::Op(op) => {
                write!(f, "op{}(", op.opno.get())?;
                write_list(f, &op.args, ", ")?;
                write!(f, ")")
            }
            Expr::Func { funcid, args, .. } => {
                write!(f, "fn{}(", funcid.get())?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::Relabel { arg, .. } => write!(f, "{arg}"),
            Expr::Bool { op, args } => match op {
                BoolOp::Not => {
                    write!(f, "NOT ")?;
                    write_list(f, args, " ")
                }
                BoolOp::And | BoolOp::Or => {
                    let sep = if *op == BoolOp::And { " AND " } else { " OR " };
                    write!(f, "(")?;
                    write_list(f, args, sep)?;
                    write!(f, ")")
                }
            },
            Expr::Aggref { aggfnoid, args, .. } => {
                write!(f, "agg{}(", aggfnoid.get())?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::SubPlan(sp) => write!(f, "(SubPlan {})", sp.plan_id.get()),
        }
    }
}

//! Shared fixtures: a tiny catalog and path builders over integer columns.

#![allow(dead_code)]

use std::sync::Arc;

use relplan::{
    Expr, IndexId, IndexOptInfo, IndexPath, JoinMethod, JoinPath, JoinType,
    MemoryCatalog, OpClassId, OperatorId, Path, PathKind, RelId, RelOptInfo, RestrictInfo,
    RteKind, ScanDirection, ScanPath, TargetEntry,
};
use relplan_core::expr::{Relids, INT4_TYPE};

pub const INT4_EQ: OperatorId = OperatorId::new(96);
pub const INT4_LT: OperatorId = OperatorId::new(97);
pub const INT4_GT: OperatorId = OperatorId::new(521);
pub const INT4_PLUS: OperatorId = OperatorId::new(551);
pub const BTREE_INT4_OPS: OpClassId = OpClassId::new(1978);

pub fn catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_commutator_pair(INT4_EQ, INT4_EQ)
        .with_commutator_pair(INT4_LT, INT4_GT)
}

pub fn col(rel: u32, att: i32) -> Expr {
    Expr::var(RelId::new(rel), att, INT4_TYPE)
}

pub fn eq(l: Expr, r: Expr) -> Expr {
    Expr::op(INT4_EQ, l, r)
}

pub fn lt(l: Expr, r: Expr) -> Expr {
    Expr::op(INT4_LT, l, r)
}

pub fn relids(rels: &[u32]) -> Relids {
    rels.iter().map(|r| RelId::new(*r)).collect()
}

/// Relation descriptor outputting the first two columns of each member.
pub fn rel(rels: &[u32], rows: f64, width: i32, quals: Vec<Expr>) -> Arc<RelOptInfo> {
    let mut targetlist = Vec::new();
    for r in rels {
        for att in 1..=2 {
            let resno = targetlist.len() as i32 + 1;
            targetlist.push(TargetEntry::new(resno, col(*r, att), None));
        }
    }
    Arc::new(RelOptInfo {
        relids: relids(rels),
        rows,
        width,
        targetlist,
        base_restrict_info: quals.into_iter().map(RestrictInfo::new).collect(),
        rtekind: RteKind::Relation,
    })
}

pub fn seqscan(relid: u32, rows: f64, quals: Vec<Expr>) -> Path {
    Path::new(
        rel(&[relid], rows, 8, quals),
        PathKind::Scan(ScanPath::SeqScan),
        0.0,
        rows / 10.0,
    )
}

pub fn btree(id: u32, keys: &[i32]) -> IndexOptInfo {
    IndexOptInfo {
        index_id: IndexId::new(id),
        index_keys: keys.to_vec(),
        opclasses: vec![BTREE_INT4_OPS; keys.len()],
        index_proc: None,
    }
}

pub fn indexscan(
    relid: u32,
    quals: Vec<Expr>,
    indexinfo: Vec<IndexOptInfo>,
    indexqual: Vec<Vec<Expr>>,
    rows: f64,
) -> Path {
    Path::new(
        rel(&[relid], 1000.0, 8, quals),
        PathKind::Scan(ScanPath::IndexScan(IndexPath {
            indexinfo,
            indexqual,
            scan_direction: ScanDirection::Forward,
            rows,
        })),
        0.3,
        12.0,
    )
}

pub fn join(
    jointype: JoinType,
    outer: Path,
    inner: Path,
    rinfos: Vec<RestrictInfo>,
    method: JoinMethod,
) -> Path {
    let mut members: Vec<u32> = Vec::new();
    for p in [&outer, &inner] {
        if let Some(parent) = &p.parent {
            members.extend(parent.relids.iter().map(|r| r.get()));
        }
    }
    let total = outer.total_cost + inner.total_cost + 10.0;
    Path::new(
        rel(&members, 500.0, 16, vec![]),
        PathKind::Join(JoinPath {
            jointype,
            outer: Box::new(outer),
            inner: Box::new(inner),
            join_restrict_info: rinfos,
            method,
        }),
        1.0,
        total,
    )
}

//! Benchmarks for query execution.
//!
//! Tables are built once per size outside the measured loop; each
//! iteration plans and runs the query end to end through
//! `PhysicalPlanRunner`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mindb_core::schema::TableMeta;
use mindb_core::{DataType, Value};
use mindb_query::ast::Expr;
use mindb_query::{LogicalPlan, Optimizer, PhysicalPlanRunner, PlannerConfig};
use mindb_storage::{MemTable, Table, Trx, VanillaTrx};
use std::rc::Rc;

// ============================================================================
// Data Generation Utilities
// ============================================================================

/// Simple LCG for reproducible pseudo-random shuffling
fn shuffle_indices(count: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..count).collect();
    let mut s = seed;
    for i in (1..count).rev() {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        let j = (s as usize) % (i + 1);
        indices.swap(i, j);
    }
    indices
}

/// `name(key indexed, val)` with shuffled keys in `0..count`.
fn create_table(name: &str, count: usize, key_range: usize, seed: u64) -> Rc<dyn Table> {
    let meta = TableMeta::builder(name)
        .unwrap()
        .add_field("key", DataType::Int)
        .unwrap()
        .add_field("val", DataType::Int)
        .unwrap()
        .add_index(format!("idx_{}_key", name), &["key"], false)
        .unwrap()
        .build()
        .unwrap();
    let table = MemTable::new(meta).unwrap();
    let trx = VanillaTrx::begin();
    for i in shuffle_indices(count, seed) {
        let values = vec![Value::Int((i % key_range) as i64), Value::Int(i as i64)];
        trx.insert_record(&table, values).unwrap();
    }
    Rc::new(table)
}

fn key(table: &str) -> Expr {
    Expr::field(table, "key", DataType::Int)
}

fn run(optimizer: &Optimizer, plan: LogicalPlan) -> usize {
    let mut op = optimizer.optimize(plan).unwrap();
    let trx = VanillaTrx::begin();
    PhysicalPlanRunner::new(&trx).execute(&mut op).unwrap().len()
}

// ============================================================================
// Scan Benchmarks - index range scan against full scan with filter
// ============================================================================

fn bench_range_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_scan");
    let table_scan = Optimizer::new(PlannerConfig::new().with_index_scan(false));
    let index_scan = Optimizer::default();

    for size in [1000, 10000, 100000].iter() {
        let table = create_table("t", *size, *size, 12345);
        // 1% selectivity
        let predicate = Expr::and(vec![
            Expr::ge(key("t"), Expr::value(100i64)),
            Expr::lt(key("t"), Expr::value(100 + (*size / 100) as i64)),
        ]);
        let plan = || LogicalPlan::filter(LogicalPlan::table_get(table.clone()), predicate.clone());

        group.bench_with_input(BenchmarkId::new("table_scan", size), size, |b, _| {
            b.iter(|| black_box(run(&table_scan, plan())))
        });
        group.bench_with_input(BenchmarkId::new("index_scan", size), size, |b, _| {
            b.iter(|| black_box(run(&index_scan, plan())))
        });
    }

    group.finish();
}

// ============================================================================
// JOIN Benchmarks - nested loop with and without an inner index
// ============================================================================

fn bench_nested_loop_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_loop_join");
    let plain = Optimizer::new(PlannerConfig::new().with_index_scan(false));
    let indexed = Optimizer::default();

    // Smaller sizes for O(n*m) algorithm
    for size in [100, 500, 1000].iter() {
        let left = create_table("l", *size, *size, 12345);
        let right = create_table("r", *size, *size / 10, 67890);
        let plan = || {
            LogicalPlan::filter(
                LogicalPlan::join(
                    LogicalPlan::table_get(left.clone()),
                    LogicalPlan::table_get(right.clone()),
                    vec![],
                ),
                Expr::eq(key("r"), key("l")),
            )
        };

        group.bench_with_input(BenchmarkId::new("rescan_inner", size), size, |b, _| {
            b.iter(|| black_box(run(&plain, plan())))
        });
        group.bench_with_input(BenchmarkId::new("index_inner", size), size, |b, _| {
            b.iter(|| black_box(run(&indexed, plan())))
        });
    }

    group.finish();
}

// ============================================================================
// Planning Benchmarks - rewrite and physical generation only
// ============================================================================

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let optimizer = Optimizer::default();
    let tables: Vec<Rc<dyn Table>> = (0..4)
        .map(|i| create_table(&format!("t{}", i), 0, 1, 1))
        .collect();

    for width in [2usize, 3, 4].iter() {
        let plan = || {
            let mut plan = LogicalPlan::table_get(tables[0].clone());
            let mut conjuncts = Vec::new();
            for i in 1..*width {
                plan = LogicalPlan::join(plan, LogicalPlan::table_get(tables[i].clone()), vec![]);
                let (prev, this) = (format!("t{}", i - 1), format!("t{}", i));
                conjuncts.push(Expr::eq(key(&this), key(&prev)));
                conjuncts.push(Expr::gt(key(&this), Expr::value(0i64)));
            }
            LogicalPlan::filter(plan, Expr::and(conjuncts))
        };

        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, _| {
            b.iter(|| black_box(optimizer.optimize(plan()).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_range_scan, bench_nested_loop_join, bench_optimize);
criterion_main!(benches);

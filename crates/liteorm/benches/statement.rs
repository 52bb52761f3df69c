use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use liteorm::clause::{render_conditions, render_limit, render_order};
use liteorm::statement::{QueryClauses, build_insert, build_select};
use liteorm::{AssignmentField, AssignmentGroup, ClauseFragment, Expr, QueryPlan, QuoteStyle, Value};

/// `rows` assignment rows of `cols` columns each, with a blank primary key.
fn build_group(rows: usize, cols: usize) -> AssignmentGroup {
    let mut group = AssignmentGroup::new();
    for r in 0..rows {
        let mut fields = vec![AssignmentField::new("id", Value::Integer(0)).primary_key()];
        for c in 1..cols {
            fields.push(AssignmentField::new(format!("col{c}"), Value::Integer((r * c) as i64)));
        }
        group.push_row(fields);
    }
    group
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/insert");

    for rows in [1, 10, 100, 1000] {
        let assignments = build_group(rows, 8);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &assignments, |b, assignments| {
            b.iter(|| black_box(build_insert(QuoteStyle::Double, "id", "t", assignments)));
        });
    }

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/select");

    for n in [1, 5, 20, 100] {
        let mut plan = QueryPlan::table("t").order_by_desc("id").limit(50).offset(100);
        for i in 0..n {
            plan = plan.filter(Expr::eq(format!("col{i}"), i as i64));
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &plan, |b, plan| {
            b.iter(|| {
                let clauses = QueryClauses {
                    conditions: render_conditions(plan),
                    order: render_order(plan),
                    limit: render_limit(plan),
                    ..QueryClauses::default()
                };
                black_box(build_select(QuoteStyle::Double, &plan.table, &plan.select, clauses))
            });
        });
    }

    group.finish();
}

fn bench_placeholder_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/placeholder_count");

    for n in [10, 100, 1000] {
        let mut frag = ClauseFragment::new("WHERE note != 'a?b' AND id IN (");
        frag.push_bind_list((0..n).map(Value::Integer));
        frag.push(")");
        group.bench_with_input(BenchmarkId::from_parameter(n), &frag, |b, frag| {
            b.iter(|| black_box(frag.placeholder_count()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_select, bench_placeholder_count);
criterion_main!(benches);

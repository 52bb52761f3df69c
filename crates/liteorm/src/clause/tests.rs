use super::*;

fn int(v: i64) -> Value {
    Value::Integer(v)
}

#[test]
fn test_placeholder_count_skips_quoted_text() {
    let frag = ClauseFragment::with_args(
        "WHERE note = '?' AND \"we?rd\" = ? AND [x?] = `y?` AND tag = 'it''s?' AND id = ?",
        vec![int(1), int(2)],
    );
    assert_eq!(frag.placeholder_count(), 2);
    assert!(frag.validate().is_ok());
}

#[test]
fn test_validate_rejects_mismatch() {
    let frag = ClauseFragment::with_args("WHERE a = ? AND b = ?", vec![int(1)]);
    let err = frag.validate().unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
}

#[test]
fn test_push_keeps_args_in_lockstep() {
    let mut frag = ClauseFragment::new("WHERE ");
    frag.push("a = ").push_bind(1i64).push(" AND b IN (");
    frag.push_bind_list(vec![int(2), int(3)]).push(")");

    assert_eq!(frag.text(), "WHERE a = ? AND b IN (?, ?)");
    assert_eq!(frag.args(), &[int(1), int(2), int(3)]);
    assert!(frag.validate().is_ok());
}

#[test]
fn test_empty_bind_list_renders_null() {
    let mut frag = ClauseFragment::new("id IN (");
    frag.push_bind_list(Vec::new()).push(")");
    assert_eq!(frag.text(), "id IN (NULL)");
    assert!(frag.args().is_empty());
}

#[test]
fn test_expr_nested_groups_are_parenthesized() {
    let expr = Expr::and(vec![
        Expr::eq("status", "active"),
        Expr::or(vec![Expr::gt("age", 18i64), Expr::is_null("age")]),
        Expr::not(Expr::like("name", "bot%")),
    ]);
    let frag = expr.to_fragment();

    assert_eq!(
        frag.text(),
        "status = ? AND (age > ? OR age IS NULL) AND NOT (name LIKE ?)"
    );
    assert_eq!(
        frag.args(),
        &[
            Value::Text("active".into()),
            int(18),
            Value::Text("bot%".into())
        ]
    );
}

#[test]
fn test_expr_empty_lists() {
    assert_eq!(Expr::in_list("id", Vec::<i64>::new()).to_fragment().text(), "1=0");
    assert_eq!(Expr::not_in("id", Vec::<i64>::new()).to_fragment().text(), "1=1");
    assert!(Expr::and(Vec::new()).is_empty());
}

#[test]
fn test_expr_between_and_template() {
    let frag = Expr::and(vec![
        Expr::between("age", 18i64, 65i64),
        Expr::template("lower(email) = lower(?)", ["A@B.C"]),
    ])
    .to_fragment();

    assert_eq!(frag.text(), "age BETWEEN ? AND ? AND (lower(email) = lower(?))");
    assert_eq!(frag.args().len(), 3);
    assert!(frag.validate().is_ok());
}

#[test]
fn test_render_conditions_ands_filters() {
    let plan = QueryPlan::table("users").eq("id", 1i64).filter(Expr::ne("role", "guest"));
    let frag = render_conditions(&plan).unwrap();

    assert_eq!(frag.text(), "WHERE id = ? AND role != ?");
    assert_eq!(frag.args(), &[int(1), Value::Text("guest".into())]);
}

#[test]
fn test_template_with_or_is_grouped() {
    let plan = QueryPlan::table("t")
        .filter(Expr::template("a = ? OR b = ?", [1i64, 2]))
        .filter(Expr::eq("c", 3i64));
    let frag = render_conditions(&plan).unwrap();

    assert_eq!(frag.text(), "WHERE (a = ? OR b = ?) AND c = ?");
    assert_eq!(frag.args(), &[int(1), int(2), int(3)]);
}

#[test]
fn test_lone_raw_condition_is_not_wrapped() {
    let plan = QueryPlan::table("t").filter(Expr::raw("a = 1 OR b = 2"));
    assert_eq!(render_conditions(&plan).unwrap().text(), "WHERE a = 1 OR b = 2");

    let plan = plan.filter(Expr::raw("c = 3"));
    assert_eq!(
        render_conditions(&plan).unwrap().text(),
        "WHERE (a = 1 OR b = 2) AND (c = 3)"
    );
}

#[test]
fn test_render_conditions_absent() {
    assert!(render_conditions(&QueryPlan::table("users")).is_none());
}

#[test]
fn test_render_join() {
    let plan = QueryPlan::table("users")
        .left_join("orders o", Expr::raw("o.user_id = users.id"))
        .inner_join("teams t", Expr::eq("t.active", true));
    let frag = render_join(&plan).unwrap();

    assert_eq!(
        frag.text(),
        "LEFT JOIN orders o ON o.user_id = users.id INNER JOIN teams t ON t.active = ?"
    );
    assert_eq!(frag.args(), &[int(1)]);
}

#[test]
fn test_render_group_with_having() {
    let plan = QueryPlan::table("orders")
        .group_by(&["user_id", "status"])
        .having(Expr::raw("COUNT(*) > 1"));
    let frag = render_group(&plan).unwrap();
    assert_eq!(frag.text(), "GROUP BY user_id, status HAVING COUNT(*) > 1");
}

#[test]
fn test_render_order() {
    let plan = QueryPlan::table("users").order_by("name").order_by_desc("id");
    assert_eq!(render_order(&plan).unwrap().text(), "ORDER BY name ASC, id DESC");
}

#[test]
fn test_render_limit_offset() {
    let both = render_limit(&QueryPlan::table("t").limit(10).offset(20)).unwrap();
    assert_eq!(both.text(), "LIMIT ? OFFSET ?");
    assert_eq!(both.args(), &[int(10), int(20)]);

    let offset_only = render_limit(&QueryPlan::table("t").offset(5)).unwrap();
    assert_eq!(offset_only.text(), "LIMIT -1 OFFSET ?");
    assert_eq!(offset_only.args(), &[int(5)]);

    assert!(render_limit(&QueryPlan::table("t")).is_none());
}

#[tokio::test]
async fn test_plan_clauses_defaults() {
    let plan = QueryPlan::table("users").eq("id", 7i64).limit(1);
    let source = PlanClauses;

    assert_eq!(source.table(&plan).await.unwrap(), "users");
    assert!(source.join(&plan).await.unwrap().is_none());
    assert_eq!(
        source.conditions(&plan).await.unwrap().unwrap().text(),
        "WHERE id = ?"
    );
    assert_eq!(source.limit(&plan).await.unwrap().unwrap().text(), "LIMIT ?");
}

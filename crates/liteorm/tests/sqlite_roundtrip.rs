#![cfg(feature = "sqlite")]

use liteorm::{
    Dialect, DialectConfig, Expr, LogConfig, OrmError, QueryPlan, SqliteExecutor, TracingExecutor,
    Value, ValueMap,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
}

liteorm::impl_record!(User, table = "users", {
    id [primary_key],
    name,
    email,
});

const SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT UNIQUE
    );
";

async fn setup() -> Dialect<SqliteExecutor> {
    let db = SqliteExecutor::open_in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    Dialect::new(db)
}

fn user(name: &str, email: Option<&str>) -> User {
    User {
        id: 0,
        name: name.to_string(),
        email: email.map(str::to_string),
    }
}

#[tokio::test]
async fn insert_assigns_ids_that_match_stored_rows() {
    let dialect = setup().await;
    let mut users = vec![
        user("alice", Some("alice@example.com")),
        user("bob", None),
        user("carol", Some("carol@example.com")),
    ];

    let report = dialect.create(&mut users).await.unwrap();
    assert_eq!(report.rows_affected, 3);
    assert!(report.is_complete());

    let first = report.last_insert_id - 2;
    for (i, u) in users.iter().enumerate() {
        assert_eq!(u.id, first + i as i64);
    }

    let mut stored: Vec<User> = Vec::new();
    let n = dialect
        .query(QueryPlan::table("users").order_by("id"), &mut stored)
        .await
        .unwrap();
    assert_eq!(n, 3);
    assert_eq!(stored, users);
}

#[tokio::test]
async fn second_batch_continues_the_id_block() {
    let dialect = setup().await;
    let mut first = vec![user("a", None), user("b", None)];
    dialect.create(&mut first).await.unwrap();

    let mut second = vec![user("c", None), user("d", None)];
    dialect.create(&mut second).await.unwrap();

    let ids: Vec<i64> = first.iter().chain(&second).map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn query_into_single_map_and_option() {
    let dialect = setup().await;
    let mut users = vec![user("alice", None), user("bob", Some("bob@example.com"))];
    dialect.create(&mut users).await.unwrap();

    let mut counts = ValueMap::new();
    dialect
        .query(
            QueryPlan::table("users")
                .select_expr("COUNT(*) AS n", Vec::<i64>::new())
                .select_expr("SUM(id > ?) AS above", [1i64]),
            &mut counts,
        )
        .await
        .unwrap();
    assert_eq!(counts["n"], Value::Integer(2));
    assert_eq!(counts["above"], Value::Integer(1));

    let mut bob: Option<User> = None;
    dialect
        .query(QueryPlan::table("users").eq("name", "bob"), &mut bob)
        .await
        .unwrap();
    assert_eq!(bob.unwrap().email.as_deref(), Some("bob@example.com"));
}

#[tokio::test]
async fn update_then_delete() {
    let dialect = setup().await;
    let mut users = vec![user("a", None), user("b", None), user("c", None)];
    dialect.create(&mut users).await.unwrap();

    let updated = dialect
        .update(
            QueryPlan::table("users")
                .set("name", "bee")
                .set("email", Some("bee@example.com"))
                .eq("id", users[1].id),
        )
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let deleted = dialect
        .delete(QueryPlan::table("users").filter(Expr::in_list("id", [users[0].id, users[2].id])))
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let mut rest: Vec<User> = Vec::new();
    dialect.query(QueryPlan::table("users"), &mut rest).await.unwrap();
    assert_eq!(
        rest,
        vec![User {
            id: users[1].id,
            name: "bee".into(),
            email: Some("bee@example.com".into()),
        }]
    );
}

#[tokio::test]
async fn limit_offset_and_join() {
    let dialect = setup().await;
    dialect
        .executor()
        .execute_batch("CREATE TABLE posts (id INTEGER PRIMARY KEY, user_id INTEGER, title TEXT)")
        .await
        .unwrap();
    let mut users = vec![user("a", None), user("b", None), user("c", None)];
    dialect.create(&mut users).await.unwrap();
    dialect
        .insert(
            QueryPlan::table("posts")
                .set("user_id", users[1].id)
                .set("title", "hello"),
        )
        .await
        .unwrap();

    let mut page: Vec<User> = Vec::new();
    dialect
        .query(QueryPlan::table("users").order_by("id").limit(1).offset(1), &mut page)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name, "b");

    let mut rows: Vec<ValueMap> = Vec::new();
    dialect
        .query(
            QueryPlan::table("users")
                .select(&["users.name", "p.title"])
                .inner_join("posts p", Expr::raw("p.user_id = users.id")),
            &mut rows,
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], Value::Text("hello".into()));
}

#[tokio::test]
async fn unique_violation_is_classified() {
    let dialect = setup().await;
    let mut first = vec![user("a", Some("dup@example.com"))];
    dialect.create(&mut first).await.unwrap();

    let mut second = vec![user("b", Some("dup@example.com"))];
    let err = dialect.create(&mut second).await.unwrap_err();
    assert!(err.is_unique_violation(), "got {err:?}");
    assert_eq!(second[0].id, 0);
}

#[tokio::test]
async fn unsupported_destination_leaves_value_untouched() {
    let dialect = setup().await;
    let mut n: i64 = 42;
    let err = dialect.query(QueryPlan::table("users"), &mut n).await.unwrap_err();
    assert!(matches!(err, OrmError::UnsupportedDestination(_)));
    assert_eq!(n, 42);
}

#[tokio::test]
async fn works_through_tracing_executor() {
    let db = SqliteExecutor::open_in_memory().unwrap();
    db.execute_batch(SCHEMA).await.unwrap();
    let config = DialectConfig::new().with_log(LogConfig::new().max_sql_length(32));
    let dialect = Dialect::new(TracingExecutor::with_config(db, config.log.clone())).with_config(config);

    let mut users = vec![user("alice", None)];
    let report = dialect.create(&mut users).await.unwrap();
    assert_eq!(report.rows_affected, 1);
    assert_eq!(users[0].id, 1);
}

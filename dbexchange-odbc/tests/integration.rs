//! End-to-end tests against a real ODBC driver/DSN. All of these are `#[ignore]`d because
//! this repository's CI has no DSN configured; run with `cargo test -- --ignored` against
//! a local SQLite/PostgreSQL ODBC driver, the same way `odbc-api`'s own `tests/` expects a
//! `DSN=My Db Name` environment to exist.

use std::cell::RefCell;
use std::rc::Rc;

use dbexchange::row::Row;
use dbexchange_odbc::connect;

fn test_connection_string() -> String {
    let _ = env_logger::builder().is_test(true).try_init();
    std::env::var("DBEXCHANGE_TEST_DSN")
        .unwrap_or_else(|_| "DSN=dbexchange-test;UID=test;PWD=test".to_string())
}

#[test]
#[ignore]
fn connects_and_commits_empty_transaction() {
    let mut session = connect(&test_connection_string()).unwrap();
    session.begin().unwrap();
    session.commit().unwrap();
}

#[test]
#[ignore]
fn once_builder_runs_ddl_and_dml() {
    let mut session = connect(&test_connection_string()).unwrap();
    session
        .once()
        .sql("DROP TABLE IF EXISTS dbexchange_integration")
        .run()
        .unwrap();
    session
        .once()
        .sql("CREATE TABLE dbexchange_integration (id INTEGER, name VARCHAR(50))")
        .run()
        .unwrap();
    session
        .once()
        .sql("INSERT INTO dbexchange_integration (id, name) VALUES (?, ?)")
        .use_value(Some(1i32))
        .use_value(Some("Alice".to_string()))
        .run()
        .unwrap();
}

#[test]
#[ignore]
fn scalar_into_fetches_a_single_row() {
    let mut session = connect(&test_connection_string()).unwrap();
    let name = Rc::new(RefCell::new(None::<String>));
    let mut statement = session
        .prepare()
        .sql("SELECT name FROM dbexchange_integration WHERE id = ?")
        .use_value(Some(1i32))
        .into_value(name.clone(), None)
        .finish()
        .unwrap();
    let got_data = statement.execute(1).unwrap();
    assert!(got_data);
    assert_eq!(name.borrow().as_deref(), Some("Alice"));
}

#[test]
#[ignore]
fn dynamic_row_describes_unknown_shape() {
    let mut session = connect(&test_connection_string()).unwrap();
    let row = Rc::new(RefCell::new(Row::new()));
    let mut statement = session
        .prepare()
        .sql("SELECT id, name FROM dbexchange_integration")
        .into_row(row.clone())
        .finish()
        .unwrap();
    statement.execute(1).unwrap();
    let described = row.borrow();
    assert_eq!(described.column_count(), 2);
    assert_eq!(described.get::<i32>("id").unwrap(), 1);
}

#[test]
#[ignore]
fn bulk_insert_partial_failure_leaves_only_the_valid_row() {
    let mut session = connect(&test_connection_string()).unwrap();
    session
        .once()
        .sql("DROP TABLE IF EXISTS dbexchange_bulk")
        .run()
        .unwrap();
    session
        .once()
        .sql("CREATE TABLE dbexchange_bulk (n INTEGER CHECK (n < 100000))")
        .run()
        .unwrap();

    let err = session
        .once()
        .sql("INSERT INTO dbexchange_bulk (n) VALUES (?)")
        .use_vector(vec![Some(100i32), Some(1_000_000i32)])
        .run_bulk(2)
        .unwrap_err();
    assert!(
        err.to_string().contains("23") || err.to_string().to_lowercase().contains("check"),
        "expected a constraint-violation diagnostic, got: {err}"
    );

    let count = Rc::new(RefCell::new(None::<i64>));
    let mut statement = session
        .prepare()
        .sql("SELECT COUNT(*) FROM dbexchange_bulk")
        .into_value(count.clone(), None)
        .finish()
        .unwrap();
    statement.execute(1).unwrap();
    assert_eq!(*count.borrow(), Some(1));
}

#[test]
#[ignore]
fn rolls_back_on_error() {
    let mut session = connect(&test_connection_string()).unwrap();
    session.begin().unwrap();
    session
        .once()
        .sql("INSERT INTO dbexchange_integration (id, name) VALUES (?, ?)")
        .use_value(Some(2i32))
        .use_value(Some("Bob".to_string()))
        .run()
        .unwrap();
    session.rollback().unwrap();

    let count = Rc::new(RefCell::new(None::<i64>));
    let mut statement = session
        .prepare()
        .sql("SELECT COUNT(*) FROM dbexchange_integration WHERE id = ?")
        .use_value(Some(2i32))
        .into_value(count.clone(), None)
        .finish()
        .unwrap();
    statement.execute(1).unwrap();
    assert_eq!(*count.borrow(), Some(0));
}

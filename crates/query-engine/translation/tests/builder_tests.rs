//! Translations of plans built with the fluent builder.

use similar_asserts::assert_eq;

use query_engine_metadata::metadata::{CommandRegion, Literal};
use query_engine_plan::plan::{field, literal, null, Predicate, QueryPlan, Shape};
use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::query::{translate, translate_count};

#[derive(Debug, Clone, Default, PartialEq)]
struct Person {
    name: String,
    visits: u32,
}

fn people() -> QueryPlan<Person> {
    QueryPlan::new("SELECT * FROM `people`")
}

#[test]
fn translating_twice_gives_the_same_statement() {
    let plan = people()
        .filter(field("Name").starts_with(literal("A")))
        .sort_by_descending(field("Id"))
        .take(3);
    let first = translate(&plan).unwrap();
    let second = translate(&plan).unwrap();
    assert_eq!(first.statement, second.statement);
}

fn orders_page() -> QueryPlan<Person> {
    people()
        .filter(field("Name").contains(literal("an")))
        .sort_by(field("Name"))
        .then_sort_by_descending(field("Id"))
        .filter(field("Visits").greater_than(literal(2)).and(field("Id").is_in([1, 2, 3])))
        .skip(20)
        .take(10)
}

#[test]
fn translating_a_plan_with_every_clause_twice_gives_the_same_statement() {
    let first = translate(&orders_page()).unwrap().statement;
    let second = translate(&orders_page()).unwrap().statement;
    assert_eq!(first.sql(), second.sql());
    assert_eq!(first.query.parameters, second.query.parameters);
    assert_eq!(
        first.query.parameters.keys().collect::<Vec<_>>(),
        second.query.parameters.keys().collect::<Vec<_>>()
    );
}

#[test]
fn parameters_increase_in_emission_order_across_clauses() {
    let statement = translate(&orders_page()).unwrap().statement;
    let names: Vec<&str> = statement.query.parameters.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["@P1000", "@P1001", "@P1002", "@P1003", "@P1004"]);

    let sql = statement.sql();
    let positions: Vec<usize> = names.iter().map(|name| sql.find(name).unwrap()).collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

    assert!(!statement.query.order_by_sql.contains('@'));
    assert!(!statement.query.limit_sql.contains('@'));
    assert_eq!(
        sql,
        "SELECT * FROM `people`\nHAVING (`Name` LIKE CONCAT('%', @P1000, '%')) AND ((`Visits` > @P1001) AND (`Id` IN (@P1002, @P1003, @P1004)))\nORDER BY `Name` ASC, `Id` DESC\nLIMIT 10 OFFSET 20;"
    );
}

#[test]
fn parameters_are_numbered_in_textual_order() {
    let plan = people()
        .filter(field("Id").greater_than(literal(10)))
        .filter(field("Name").equals(literal("x")).or(field("Id").equals(literal(3))));
    let statement = translate(&plan).unwrap().statement;
    assert_eq!(
        statement.query.filter_sql,
        "HAVING (`Id` > @P1000) AND ((`Name` = @P1001) OR (`Id` = @P1002))"
    );
    let names: Vec<&str> = statement.query.parameters.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["@P1000", "@P1001", "@P1002"]);
    assert_eq!(statement.parameter("@P1001"), Some(&Literal::from("x")));
}

#[test]
fn projections_narrow_the_selected_columns() {
    let plan = people().project(Shape::fields(["Name"]));
    let statement = translate(&plan).unwrap().statement;
    assert_eq!(statement.query.selected_columns, vec!["Name".to_string()]);
    assert_eq!(
        statement.sql(),
        "SELECT `t0`.`Name` FROM (SELECT * FROM `people`) AS `t0`;"
    );
}

#[test]
fn row_mutators_apply_in_registration_order() {
    let plan = people()
        .register_row_mutator(|person: &mut Person| person.visits += 1)
        .register_row_mutator(|person: &mut Person| person.name = person.name.to_uppercase());
    let execution_plan = translate(&plan).unwrap();
    assert_eq!(execution_plan.statement.sql(), "SELECT * FROM `people`;");
    assert_eq!(
        execution_plan.item_transform.apply(Person {
            name: "ann".to_string(),
            visits: 1,
        }),
        Person {
            name: "ANN".to_string(),
            visits: 2,
        }
    );
}

#[test]
fn renamed_columns_are_overwritten() {
    let plan = people()
        .rename_column("Name", "p.first_name")
        .rename_column("Name", "p.display_name")
        .filter(field("Name").not_equals(null()));
    let statement = translate(&plan).unwrap().statement;
    assert_eq!(statement.query.filter_sql, "HAVING (p.display_name IS NOT NULL)");
}

#[test]
fn filters_that_always_hold_are_dropped() {
    let plan = people()
        .filter(literal(1).equals(literal(1)))
        .filter(field("Id").is_in(Vec::<i64>::new()));
    let statement = translate(&plan).unwrap().statement;
    assert_eq!(statement.sql(), "SELECT * FROM `people`;");
    assert!(statement.query.parameters.is_empty());
}

#[test]
fn headers_are_terminated_once() {
    let plan = people()
        .insert_command(CommandRegion::Header, "SET @rank := 0;  ")
        .insert_command(CommandRegion::Header, "SET @offset := 1")
        .take(1);
    assert_eq!(
        translate(&plan).unwrap().statement.sql(),
        "SET @rank := 0;\nSET @offset := 1;\nSELECT * FROM `people`\nLIMIT 1;"
    );
}

#[test]
fn counts_ignore_ordering_and_paging() {
    let plan = people()
        .filter(field("Visits").greater_than_or_equal(literal(2)))
        .sort_by(field("Name"))
        .skip(5)
        .take(5);
    let statement = translate_count(&plan).unwrap();
    assert_eq!(
        statement.sql(),
        "SELECT COUNT(*) FROM (SELECT * FROM `people`\nHAVING (`Visits` >= @P1000)) AS `t0`;"
    );
    assert_eq!(statement.query.limit_sql, "LIMIT 5 OFFSET 5");
}

#[test]
fn nested_empty_membership_tests_fail() {
    let plan = people().filter(
        field("Id")
            .is_in(Vec::<i64>::new())
            .and(field("Name").equals(literal("x"))),
    );
    assert_eq!(
        translate(&plan).unwrap_err(),
        Error::EmptyInList("[].Contains(Id)".to_string())
    );
}

#[test]
fn then_sort_without_sort_fails() {
    let plan = people().then_sort_by(field("Name"));
    assert_eq!(
        translate(&plan).unwrap_err(),
        Error::ThenSortWithoutSort("Name".to_string())
    );
}

#[test]
fn unknown_methods_fail() {
    let plan = people().filter(
        Predicate::call_static("Math.Sqrt", [field("Visits")]).greater_than(literal(2)),
    );
    assert!(matches!(
        translate(&plan).unwrap_err(),
        Error::UnsupportedMethod(_)
    ));
}

mod common;

#[tokio::test]
async fn select_where_and_or_sorted_page() {
    let result = common::test_translation("select_where_and_or_sorted_page")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    HAVING (((`Id` = @P1000) AND (`Name` = @P1001)) OR (`Name` = @P1002))
    ORDER BY `Name` ASC
    LIMIT 100 OFFSET 100;

    [("@P1000", Int(1)), ("@P1001", String("asc")), ("@P1002", String("asc213"))]
    "###);
}

#[tokio::test]
async fn select_where_name_contains() {
    let result = common::test_translation("select_where_name_contains")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    HAVING (`Name` LIKE CONCAT('%', @P1000, '%'));

    [("@P1000", String("abc"))]
    "###);
}

#[tokio::test]
async fn select_where_inserted_now() {
    let result = common::test_translation("select_where_inserted_now")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    HAVING (`InsertedAt` = NOW());

    []
    "###);
}

#[tokio::test]
async fn select_where_name_is_not_null() {
    let result = common::test_translation("select_where_name_is_not_null")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    HAVING (`Name` IS NOT NULL);

    []
    "###);
}

#[tokio::test]
async fn select_where_id_in_list() {
    let result = common::test_translation("select_where_id_in_list")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    HAVING (`Id` IN (@P1000, @P1001, @P1002));

    [("@P1000", Int(1)), ("@P1001", Int(2)), ("@P1002", Int(3))]
    "###);
}

#[tokio::test]
async fn select_where_folded_constants() {
    let result = common::test_translation("select_where_folded_constants")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    HAVING (`Age` > @P1000);

    [("@P1000", Int(21))]
    "###);
}

#[tokio::test]
async fn select_sorted_twice() {
    let result = common::test_translation("select_sorted_twice").await.unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    ORDER BY `InsertedAt` DESC, `Id` ASC, `Name` ASC;

    []
    "###);
}

#[tokio::test]
async fn select_skip_only() {
    let result = common::test_translation("select_skip_only").await.unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people`
    LIMIT 18446744073709551615 OFFSET 20;

    []
    "###);
}

#[tokio::test]
async fn select_project_name() {
    let result = common::test_translation("select_project_name").await.unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT `t0`.`Name` FROM (SELECT * FROM `people`
    HAVING (`Id` = @P1000)) AS `t0`;

    [("@P1000", Int(7))]
    "###);
}

#[tokio::test]
async fn select_orders_grouped() {
    let result = common::test_translation("select_orders_grouped").await.unwrap();
    insta::assert_snapshot!(result, @r###"
    SET SESSION group_concat_max_len = 4096;
    SELECT o.id AS `Id`, c.name AS `Customer`, SUM(l.amount) AS `Total`
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
    JOIN order_lines l ON l.order_id = o.id
    GROUP BY o.id, c.name
    HAVING (SUM(l.amount) > @P1000)
    ORDER BY c.name ASC
    LIMIT 10;

    [("@P1000", Int(100))]
    "###);
}

#[tokio::test]
async fn select_orders_project_skips_collections() {
    let result = common::test_translation("select_orders_project_skips_collections")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SET SESSION group_concat_max_len = 4096;
    SELECT `t0`.`Id`, `t0`.`Total` FROM (SELECT o.id AS `Id`, c.name AS `Customer`, SUM(l.amount) AS `Total`
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
    JOIN order_lines l ON l.order_id = o.id
    GROUP BY o.id, c.name) AS `t0`;

    []
    "###);
}

#[tokio::test]
async fn select_mapped_people() {
    let result = common::test_translation("select_mapped_people").await.unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT p.id AS `Id`, CONCAT(p.first_name, ' ', p.last_name) AS `Name`
    FROM people p
    WHERE (CONCAT(p.first_name, ' ', p.last_name) = @P1000)
    ORDER BY p.id DESC
    LIMIT 10;

    [("@P1000", String("Ann Lee"))]
    "###);
}

#[tokio::test]
async fn select_adults_with_caller_parameters() {
    let result = common::test_translation("select_adults_with_caller_parameters")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT * FROM `people` WHERE `Age` >= @MinimumAge
    HAVING (`Name` LIKE CONCAT(@P1000, '%'));

    [("@P1000", String("A")), ("@MinimumAge", Int(18))]
    "###);
}

#[tokio::test]
async fn count_people_without_name() {
    let result = common::test_translation("count_people_without_name")
        .await
        .unwrap();
    insta::assert_snapshot!(result, @r###"
    SELECT COUNT(*) FROM (SELECT * FROM `people`
    HAVING (`Name` IS NULL)) AS `t0`;

    []
    "###);
}

#[tokio::test]
async fn parameter_name_collision() {
    let error = common::test_translation("parameter_name_collision")
        .await
        .unwrap_err();
    assert_eq!(
        error.downcast_ref::<query_engine_translation::translation::error::Error>(),
        Some(&query_engine_translation::translation::error::Error::ParameterNameCollision(
            "@P1000".to_string()
        ))
    );
}

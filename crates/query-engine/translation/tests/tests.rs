mod common;

#[tokio::test]
async fn order_by_customer() {
    let result = common::test_translation("order_by_customer").await.unwrap();
    insta::assert_snapshot!(result);
}

#[tokio::test]
async fn shop_filters() {
    let result = common::test_translation("shop_filters").await.unwrap();
    insta::assert_snapshot!(result);
}

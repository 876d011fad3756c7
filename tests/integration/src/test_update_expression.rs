//! End-to-end tests that send compiled update expressions to DynamoDB.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_dynamodb::types::{
        AttributeDefinition, AttributeValue as SdkAttributeValue, BillingMode, KeySchemaElement,
        KeyType, ScalarAttributeType,
    };
    use rustack_dynamodb_model::{
        AttributeValue, ReturnValue, UpdateAction, UpdateItemInput, UpdateMap,
    };
    use rustack_dynamodb_update::UpdateExpressionCompiler;
    use rustack_dynamodb_update::request::{compile_into_update_item, update_item_input};

    use crate::{dynamodb_client, send_update_item, test_table_name, to_sdk_item};

    async fn create_simple_table(client: &aws_sdk_dynamodb::Client, table: &str) {
        client
            .create_table()
            .table_name(table)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name("pk")
                    .key_type(KeyType::Hash)
                    .build()
                    .expect("key schema"),
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name("pk")
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .expect("attribute definition"),
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .expect("create table");
    }

    fn key() -> HashMap<String, AttributeValue> {
        HashMap::from([("pk".to_owned(), AttributeValue::from("item1"))])
    }

    async fn put_item(
        client: &aws_sdk_dynamodb::Client,
        table: &str,
        item: &[(&str, AttributeValue)],
    ) {
        let mut full = key();
        for (name, value) in item {
            full.insert((*name).to_owned(), value.clone());
        }
        client
            .put_item()
            .table_name(table)
            .set_item(Some(to_sdk_item(&full)))
            .send()
            .await
            .expect("put item");
    }

    async fn get_item(
        client: &aws_sdk_dynamodb::Client,
        table: &str,
    ) -> HashMap<String, SdkAttributeValue> {
        client
            .get_item()
            .table_name(table)
            .set_key(Some(to_sdk_item(&key())))
            .send()
            .await
            .expect("get item")
            .item
            .expect("item should exist")
    }

    async fn update(
        client: &aws_sdk_dynamodb::Client,
        table: &str,
        update: &UpdateMap,
        action: &UpdateAction,
    ) {
        let compiled = UpdateExpressionCompiler::default()
            .compile(update, action, &HashMap::new(), &HashMap::new())
            .expect("compile update");
        let input = update_item_input(table, key(), compiled);
        send_update_item(client, &input).await.expect("update item");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_set_values_and_apply_delta() {
        let client = dynamodb_client();
        let table = test_table_name("upd-set");
        create_simple_table(&client, &table).await;
        put_item(
            &client,
            &table,
            &[("name", AttributeValue::from("Alice")), ("age", AttributeValue::from(30))],
        )
        .await;

        let map = UpdateMap::new()
            .with("name", "Jane")
            .with("age", "age + 2")
            .with("first-login", true);
        update(&client, &table, &map, &UpdateAction::Set).await;

        let item = get_item(&client, &table).await;
        assert_eq!(item.get("name").unwrap().as_s().unwrap(), "Jane");
        assert_eq!(item.get("age").unwrap().as_n().unwrap(), "32");
        assert!(*item.get("first-login").unwrap().as_bool().unwrap());

        client.delete_table().table_name(&table).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_subtract_with_attribute_last_delta() {
        let client = dynamodb_client();
        let table = test_table_name("upd-sub");
        create_simple_table(&client, &table).await;
        put_item(&client, &table, &[("stock", AttributeValue::from(3))]).await;

        let map = UpdateMap::new().with("stock", "10 - stock");
        update(&client, &table, &map, &UpdateAction::Set).await;

        let item = get_item(&client, &table).await;
        assert_eq!(item.get("stock").unwrap().as_n().unwrap(), "7");

        client.delete_table().table_name(&table).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_add_number_and_set_members() {
        let client = dynamodb_client();
        let table = test_table_name("upd-add");
        create_simple_table(&client, &table).await;
        put_item(
            &client,
            &table,
            &[
                ("visits", AttributeValue::from(1)),
                ("tags", AttributeValue::Ss(vec!["a".to_owned()])),
            ],
        )
        .await;

        let map = UpdateMap::new()
            .with("visits", 4)
            .with("tags", AttributeValue::Ss(vec!["b".to_owned()]));
        update(&client, &table, &map, &UpdateAction::Add).await;

        let item = get_item(&client, &table).await;
        assert_eq!(item.get("visits").unwrap().as_n().unwrap(), "5");
        let mut tags = item.get("tags").unwrap().as_ss().unwrap().clone();
        tags.sort();
        assert_eq!(tags, vec!["a", "b"]);

        client.delete_table().table_name(&table).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_set_members() {
        let client = dynamodb_client();
        let table = test_table_name("upd-del");
        create_simple_table(&client, &table).await;
        put_item(
            &client,
            &table,
            &[("tags", AttributeValue::Ss(vec!["a".to_owned(), "b".to_owned()]))],
        )
        .await;

        let map = UpdateMap::new().with("tags", AttributeValue::Ss(vec!["a".to_owned()]));
        update(&client, &table, &map, &UpdateAction::Delete).await;

        let item = get_item(&client, &table).await;
        assert_eq!(item.get("tags").unwrap().as_ss().unwrap(), &vec!["b".to_owned()]);

        client.delete_table().table_name(&table).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_remove_attributes() {
        let client = dynamodb_client();
        let table = test_table_name("upd-rm");
        create_simple_table(&client, &table).await;
        put_item(
            &client,
            &table,
            &[("name", AttributeValue::from("Alice")), ("email", AttributeValue::from("a@x"))],
        )
        .await;

        let map = UpdateMap::new().with("email", true);
        update(&client, &table, &map, &UpdateAction::Remove).await;

        let item = get_item(&client, &table).await;
        assert!(item.get("email").is_none());
        assert_eq!(item.get("name").unwrap().as_s().unwrap(), "Alice");

        client.delete_table().table_name(&table).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_share_placeholders_with_condition() {
        let client = dynamodb_client();
        let table = test_table_name("upd-cond");
        create_simple_table(&client, &table).await;
        put_item(&client, &table, &[("visits", AttributeValue::from(1))]).await;

        let input = UpdateItemInput {
            table_name: table.clone(),
            key: key(),
            condition_expression: Some("#v < :max".to_owned()),
            expression_attribute_names: HashMap::from([("#v".to_owned(), "visits".to_owned())]),
            expression_attribute_values: HashMap::from([(
                ":max".to_owned(),
                AttributeValue::from(100),
            )]),
            ..Default::default()
        };

        let input = compile_into_update_item(
            &UpdateExpressionCompiler::default(),
            input,
            &UpdateMap::new().with("visits", "visits + 1"),
            &UpdateAction::Set,
        )
        .expect("compile into request");
        assert_eq!(input.update_expression.as_deref(), Some("SET #v = #v + :1"));
        send_update_item(&client, &input).await.expect("update item");

        let item = get_item(&client, &table).await;
        assert_eq!(item.get("visits").unwrap().as_n().unwrap(), "2");

        client.delete_table().table_name(&table).send().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_updated_attributes() {
        let client = dynamodb_client();
        let table = test_table_name("upd-ret");
        create_simple_table(&client, &table).await;
        put_item(
            &client,
            &table,
            &[("score", AttributeValue::from(5)), ("name", AttributeValue::from("Alice"))],
        )
        .await;

        let compiled = UpdateExpressionCompiler::default()
            .compile(
                &UpdateMap::new().with("score", "score + 1"),
                &UpdateAction::Set,
                &HashMap::new(),
                &HashMap::new(),
            )
            .expect("compile update");
        let mut input = update_item_input(&table, key(), compiled);
        input.return_values = Some(ReturnValue::UpdatedNew);

        let output = send_update_item(&client, &input).await.expect("update item");
        let attributes = output.attributes.expect("updated attributes");
        assert_eq!(attributes.get("score").unwrap().as_n().unwrap(), "6");
        assert!(attributes.get("name").is_none());

        client.delete_table().table_name(&table).send().await.unwrap();
    }
}

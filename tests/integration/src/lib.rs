//! Integration tests for compiled update expressions.
//!
//! These tests require a running DynamoDB-compatible server at
//! `localhost:4566` (or `DYNAMODB_ENDPOINT_URL`). They are marked `#[ignore]`
//! so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p rustack-integration -- --ignored
//! ```

use std::collections::HashMap;
use std::sync::Once;

use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{
    AttributeValue as SdkAttributeValue, ReturnValue as SdkReturnValue,
};
use rustack_dynamodb_model::{AttributeValue, ReturnValue, UpdateItemInput};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("DYNAMODB_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Create a configured DynamoDB client pointing at the local server.
#[must_use]
pub fn dynamodb_client() -> aws_sdk_dynamodb::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_dynamodb::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_dynamodb::Client::from_conf(config)
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Convert a model value into the SDK's representation.
#[must_use]
pub fn to_sdk_value(value: &AttributeValue) -> SdkAttributeValue {
    match value {
        AttributeValue::S(s) => SdkAttributeValue::S(s.clone()),
        AttributeValue::N(n) => SdkAttributeValue::N(n.clone()),
        AttributeValue::B(b) => SdkAttributeValue::B(Blob::new(b.to_vec())),
        AttributeValue::Ss(v) => SdkAttributeValue::Ss(v.clone()),
        AttributeValue::Ns(v) => SdkAttributeValue::Ns(v.clone()),
        AttributeValue::Bs(v) => {
            SdkAttributeValue::Bs(v.iter().map(|b| Blob::new(b.to_vec())).collect())
        }
        AttributeValue::Bool(b) => SdkAttributeValue::Bool(*b),
        AttributeValue::Null(b) => SdkAttributeValue::Null(*b),
        AttributeValue::L(list) => SdkAttributeValue::L(list.iter().map(to_sdk_value).collect()),
        AttributeValue::M(m) => SdkAttributeValue::M(to_sdk_item(m)),
    }
}

/// Convert a model item (or key) into the SDK's representation.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn to_sdk_item(item: &HashMap<String, AttributeValue>) -> HashMap<String, SdkAttributeValue> {
    item.iter().map(|(k, v)| (k.clone(), to_sdk_value(v))).collect()
}

/// Convert a model `ReturnValues` setting into the SDK's representation.
#[must_use]
pub fn to_sdk_return_value(value: &ReturnValue) -> SdkReturnValue {
    match value {
        ReturnValue::None => SdkReturnValue::None,
        ReturnValue::AllOld => SdkReturnValue::AllOld,
        ReturnValue::UpdatedOld => SdkReturnValue::UpdatedOld,
        ReturnValue::AllNew => SdkReturnValue::AllNew,
        ReturnValue::UpdatedNew => SdkReturnValue::UpdatedNew,
    }
}

/// Send a model `UpdateItem` request through the SDK client.
pub async fn send_update_item(
    client: &aws_sdk_dynamodb::Client,
    input: &UpdateItemInput,
) -> Result<
    aws_sdk_dynamodb::operation::update_item::UpdateItemOutput,
    aws_sdk_dynamodb::error::SdkError<aws_sdk_dynamodb::operation::update_item::UpdateItemError>,
> {
    let names = (!input.expression_attribute_names.is_empty())
        .then(|| input.expression_attribute_names.clone());
    let values = (!input.expression_attribute_values.is_empty())
        .then(|| to_sdk_item(&input.expression_attribute_values));

    client
        .update_item()
        .table_name(&input.table_name)
        .set_key(Some(to_sdk_item(&input.key)))
        .set_update_expression(input.update_expression.clone())
        .set_condition_expression(input.condition_expression.clone())
        .set_expression_attribute_names(names)
        .set_expression_attribute_values(values)
        .set_return_values(input.return_values.as_ref().map(to_sdk_return_value))
        .send()
        .await
}

mod test_update_expression;

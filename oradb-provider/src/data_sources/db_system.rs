//! oracle_db_system_shapes

use async_trait::async_trait;
use oradb_core::provider::ProviderResult;
use oradb_core::resource::{Resource, State};
use oradb_core::schema::{AttributeSchema, AttributeType, ResourceSchema};
use serde::{Deserialize, Serialize};

use super::{OracleDataSource, READ_TIMEOUT, argument, computed_list};
use crate::ids::LocationId;
use crate::models::API_VERSION_2025_09_01 as API_VERSION;
use crate::models::db_system::DbSystemShape;
use crate::resources::{Context, build_schema, decode_config, list, to_state};
use crate::validation;

#[derive(Deserialize)]
struct ShapesKey {
    location: String,
}

#[derive(Serialize)]
struct ShapesModel {
    location: String,
    db_system_shapes: Vec<ShapeModel>,
}

#[derive(Serialize)]
struct ShapeModel {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_core_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_core_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_memory_in_gbs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_data_storage_in_tbs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_node_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum_node_count: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    shape_attributes: Vec<String>,
}

fn flatten_shape(shape: DbSystemShape) -> ShapeModel {
    let props = shape.properties.unwrap_or_default();
    ShapeModel {
        name: shape.name.unwrap_or_default(),
        shape_family: props.shape_family,
        shape_name: props.shape_name,
        available_core_count: props.available_core_count,
        minimum_core_count: props.minimum_core_count,
        available_memory_in_gbs: props.available_memory_in_gbs,
        available_data_storage_in_tbs: props.available_data_storage_in_tbs,
        minimum_node_count: props.minimum_node_count,
        maximum_node_count: props.maximum_node_count,
        shape_attributes: props.shape_attributes.unwrap_or_default(),
    }
}

/// DB system shapes offered in a location
pub struct DbSystemShapesDataSource;

#[async_trait]
impl OracleDataSource for DbSystemShapesDataSource {
    fn data_source_type(&self) -> &'static str {
        "oracle_db_system_shapes"
    }

    fn schema(&self) -> ResourceSchema {
        build_schema(
            self.data_source_type(),
            "Shapes available to DB systems",
            vec![
                argument("location", AttributeType::String)
                    .with_normalizer(validation::normalize_location_value),
                computed_list(
                    "db_system_shapes",
                    vec![
                        AttributeSchema::new("name", AttributeType::String),
                        AttributeSchema::new("shape_family", AttributeType::String),
                        AttributeSchema::new("shape_name", AttributeType::String),
                        AttributeSchema::new("available_core_count", AttributeType::Int),
                        AttributeSchema::new("minimum_core_count", AttributeType::Int),
                        AttributeSchema::new("available_memory_in_gbs", AttributeType::Int),
                        AttributeSchema::new("available_data_storage_in_tbs", AttributeType::Int),
                        AttributeSchema::new("minimum_node_count", AttributeType::Int),
                        AttributeSchema::new("maximum_node_count", AttributeType::Int),
                        AttributeSchema::new("shape_attributes", AttributeType::string_list()),
                    ],
                ),
            ],
        )
    }

    async fn read(&self, ctx: &Context, resource: &Resource) -> ProviderResult<State> {
        let key: ShapesKey = decode_config(resource)?;
        let location = LocationId::new(&ctx.subscription_id, &key.location);
        let collection = location.db_system_shapes_collection();
        let shapes: Vec<DbSystemShape> =
            list(ctx, &resource.id, &collection, API_VERSION, READ_TIMEOUT).await?;

        let model = ShapesModel {
            location: location.location.clone(),
            db_system_shapes: shapes.into_iter().map(flatten_shape).collect(),
        };
        to_state(&resource.id, &collection, &model)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oradb_core::resource::Value;
    use serde_json::json;

    use super::*;
    use crate::testing::{SUBSCRIPTION, StubClient, context, resource};

    #[tokio::test]
    async fn shapes_are_read_from_the_location() {
        let stub = Arc::new(StubClient::new());
        let location = LocationId::new(SUBSCRIPTION, "westeurope");
        stub.insert(
            &format!("{}/VM.Standard.x86", location.db_system_shapes_collection()),
            json!({
                "name": "VM.Standard.x86",
                "properties": {
                    "shapeFamily": "VIRTUAL_MACHINE",
                    "availableCoreCount": 64,
                    "minimumCoreCount": 1
                }
            }),
        );

        let declared = resource(
            "oracle_db_system_shapes",
            "shapes",
            json!({"location": "West Europe"}),
        );
        let state = DbSystemShapesDataSource
            .read(&context(&stub), &declared)
            .await
            .unwrap();

        let Some(Value::List(shapes)) = state.attributes.get("db_system_shapes") else {
            panic!("shapes missing");
        };
        let Value::Map(shape) = &shapes[0] else {
            panic!("shape is not a map");
        };
        assert_eq!(shape.get("name"), Some(&Value::from("VM.Standard.x86")));
        assert_eq!(shape.get("available_core_count"), Some(&Value::Int(64)));
        assert!(!shape.contains_key("shape_attributes"));
    }
}

//! Delivery service resource.
//!
//! Rule set:
//! - `xmlId`: required, lowercase alphanumeric with interior dashes
//! - `displayName`: required
//! - `cdnId`, `typeId`: required; `typeId` must reference a type usable by
//!   delivery services
//! - `dscp`: 0..=63 when set

use crate::row::{int_filter, str_field, time_field};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use trellis_api::{ApiError, Param, RequestContext, Resource, ResourceFactory, StoreError};
use trellis_core::{DeliveryService, Identity};
use trellis_validate::{FieldRule, ValidationErrors, evaluate};

pub const KIND: &str = "deliveryservice";

const XML_ID_PATTERN: &str = r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$";
const XML_ID_MSG: &str = "invalid characters found - Use lowercase alphanumeric or - .";

fn rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("xmlId"),
        FieldRule::pattern("xmlId", XML_ID_PATTERN, XML_ID_MSG),
        FieldRule::required("displayName"),
        FieldRule::required("cdnId"),
        FieldRule::required("typeId"),
        FieldRule::float_range("dscp", 0.0, 63.0),
    ]
}

fn select_query() -> String {
    "SELECT ds.id, ds.xml_id, ds.display_name, ds.active, ds.dscp, \
     ds.cdn_id, cdn.name AS cdn_name, ds.type_id, ds.long_desc, ds.last_updated \
     FROM deliveryservice AS ds \
     JOIN cdn ON ds.cdn_id = cdn.id"
        .to_string()
}

fn insert_query() -> String {
    "INSERT INTO deliveryservice \
     (xml_id, display_name, active, dscp, cdn_id, type_id, long_desc) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) \
     RETURNING id, last_updated"
        .to_string()
}

fn update_query() -> String {
    "UPDATE deliveryservice SET \
     xml_id = $1, display_name = $2, active = $3, dscp = $4, \
     cdn_id = $5, type_id = $6, long_desc = $7 \
     WHERE id = $8 \
     RETURNING last_updated"
        .to_string()
}

fn delete_query() -> String {
    "DELETE FROM deliveryservice WHERE id = $1".to_string()
}

fn type_check_query() -> String {
    "SELECT name FROM type WHERE id = $1 AND use_in_table = 'deliveryservice'".to_string()
}

#[derive(Debug, Default)]
pub struct DeliveryServiceResource {
    ds: DeliveryService,
}

impl DeliveryServiceResource {
    pub fn new(ds: DeliveryService) -> Self {
        Self { ds }
    }

    pub fn entity(&self) -> &DeliveryService {
        &self.ds
    }

    fn write_params(&self) -> Vec<Param> {
        vec![
            self.ds.xml_id.clone().into(),
            self.ds.display_name.clone().into(),
            self.ds.active.into(),
            self.ds.dscp.into(),
            self.ds.cdn_id.into(),
            self.ds.type_id.into(),
            self.ds.long_desc.clone().into(),
        ]
    }
}

fn row_to_delivery_service(row: &Value) -> DeliveryService {
    DeliveryService {
        id: row.get("id").and_then(Value::as_i64),
        xml_id: str_field(row, "xml_id"),
        display_name: str_field(row, "display_name"),
        active: row.get("active").and_then(Value::as_bool),
        dscp: row.get("dscp").and_then(Value::as_i64),
        cdn_id: row.get("cdn_id").and_then(Value::as_i64),
        cdn_name: str_field(row, "cdn_name"),
        type_id: row.get("type_id").and_then(Value::as_i64),
        long_desc: str_field(row, "long_desc"),
        last_updated: time_field(row, "last_updated"),
    }
}

#[async_trait]
impl Resource for DeliveryServiceResource {
    fn identify(&self) -> Identity {
        Identity::new(KIND, self.ds.id, self.ds.xml_id.clone())
    }

    async fn validate(&self, ctx: &mut RequestContext) -> Result<ValidationErrors, ApiError> {
        let entity = serde_json::to_value(&self.ds).map_err(|e| {
            ApiError::programming(format!("deliveryservice failed to serialize: {}", e))
        })?;
        let mut errs = evaluate(&rules(), &entity);

        if let Some(type_id) = self.ds.type_id {
            let rows = ctx
                .tx()
                .query(&type_check_query(), &[Param::Int(type_id)])
                .await?;
            if rows.is_empty() {
                errs.push("typeId", "invalid deliveryservice type");
            }
        }

        Ok(errs)
    }

    async fn read(
        &self,
        ctx: &mut RequestContext,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<Value>, ApiError> {
        let mut sql = select_query();
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Param> = Vec::new();

        if let Some(id) = int_filter(filters, "id")? {
            params.push(Param::Int(id));
            clauses.push(format!("ds.id = ${}", params.len()));
        }
        if let Some(xml_id) = filters.get("xmlId") {
            params.push(Param::Text(xml_id.clone()));
            clauses.push(format!("ds.xml_id = ${}", params.len()));
        }
        if let Some(cdn) = filters.get("cdn") {
            params.push(Param::Text(cdn.clone()));
            clauses.push(format!("cdn.name = ${}", params.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let rows = ctx.tx().query(&sql, &params).await?;
        rows.iter()
            .map(|row| {
                serde_json::to_value(row_to_delivery_service(row)).map_err(|e| {
                    ApiError::Persistence(StoreError::Backend(format!("malformed row: {}", e)))
                })
            })
            .collect()
    }

    async fn create(&mut self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        let rows = ctx.tx().query(&insert_query(), &self.write_params()).await?;
        let row = rows.first().ok_or_else(|| {
            ApiError::Persistence(StoreError::Backend("insert returned no row".to_string()))
        })?;
        self.ds.id = row.get("id").and_then(Value::as_i64);
        self.ds.last_updated = time_field(row, "last_updated");
        if self.ds.id.is_none() {
            return Err(ApiError::Persistence(StoreError::Backend(
                "insert returned no generated key".to_string(),
            )));
        }
        Ok(())
    }

    async fn update(&mut self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        let mut params = self.write_params();
        params.push(self.ds.id.into());
        let rows = ctx.tx().query(&update_query(), &params).await?;
        match rows.first() {
            Some(row) => {
                self.ds.last_updated = time_field(row, "last_updated");
                Ok(())
            }
            None => Err(ApiError::not_found(KIND)),
        }
    }

    async fn delete(&self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        let params = [Param::from(self.ds.id)];
        let affected = ctx.tx().execute(&delete_query(), &params).await?;
        if affected == 0 {
            return Err(ApiError::not_found(KIND));
        }
        Ok(())
    }

    fn payload(&self) -> Result<Value, ApiError> {
        serde_json::to_value(&self.ds).map_err(|e| {
            ApiError::programming(format!("deliveryservice failed to serialize: {}", e))
        })
    }
}

pub struct DeliveryServiceFactory;

impl ResourceFactory for DeliveryServiceFactory {
    fn kind(&self) -> &'static str {
        "deliveryservices"
    }

    fn empty(&self) -> Box<dyn Resource> {
        Box::new(DeliveryServiceResource::default())
    }

    fn from_json(&self, body: Value) -> Result<Box<dyn Resource>, ApiError> {
        let ds: DeliveryService = serde_json::from_value(body)
            .map_err(|e| ApiError::programming(format!("malformed request body: {}", e)))?;
        Ok(Box::new(DeliveryServiceResource::new(ds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use trellis_api::testing::MockStore;
    use trellis_api::{ErrorKind, dispatch};
    use trellis_validate::report;

    async fn ctx(store: &MockStore) -> RequestContext {
        RequestContext::new(store.begin_mock().await)
    }

    fn candidate() -> DeliveryServiceResource {
        DeliveryServiceResource::new(DeliveryService {
            id: None,
            xml_id: Some("video-live".to_string()),
            display_name: Some("Video Live".to_string()),
            active: Some(true),
            dscp: Some(40),
            cdn_id: Some(1),
            type_id: Some(11),
            ..Default::default()
        })
    }

    #[test]
    fn queries_have_expected_verbs() {
        assert!(select_query().starts_with("SELECT"));
        assert!(insert_query().starts_with("INSERT"));
        assert!(update_query().starts_with("UPDATE"));
        assert!(delete_query().starts_with("DELETE"));
    }

    #[tokio::test]
    async fn valid_delivery_service_passes() {
        let store = MockStore::new();
        store.expect_rows(vec![json!({ "name": "HTTP" })]);

        let resource = candidate();
        let mut c = ctx(&store).await;
        let errs = resource.validate(&mut c).await.expect("validate");
        c.close().await.expect("close");
        assert!(errs.is_empty(), "got: {}", errs);
    }

    #[tokio::test]
    async fn every_violated_rule_is_reported() {
        let store = MockStore::new();

        // xmlId bad charset, displayName/cdnId/typeId absent, dscp out of range.
        let resource = DeliveryServiceResource::new(DeliveryService {
            xml_id: Some("Video_Live!".to_string()),
            dscp: Some(99),
            ..Default::default()
        });
        let mut c = ctx(&store).await;
        let errs = resource.validate(&mut c).await.expect("validate");
        c.close().await.expect("close");

        assert_eq!(
            report::join(&errs.sorted()),
            "'cdnId' cannot be blank, \
             'displayName' cannot be blank, \
             'dscp' Must be a floating point number within the range 0 to 63, \
             'typeId' cannot be blank, \
             'xmlId' invalid characters found - Use lowercase alphanumeric or - ."
        );
        // typeId absent: the referential check never queried the store.
        assert!(store.journal().queries.is_empty());
    }

    #[tokio::test]
    async fn create_commits_and_assigns_identity() {
        let store = MockStore::new();
        store.expect_rows(vec![json!({ "name": "HTTP" })]); // type check
        store.expect_rows(vec![json!({ "id": 3, "last_updated": "2024-05-01T12:00:00Z" })]);

        let mut resource = candidate();
        let payload = dispatch::create(&mut resource, ctx(&store).await)
            .await
            .expect("create");
        assert_eq!(payload["id"], json!(3));
        assert_eq!(payload["xmlId"], json!("video-live"));
        assert!(store.journal().committed);
    }

    #[tokio::test]
    async fn read_maps_rows_to_wire_payloads() {
        let store = MockStore::new();
        store.expect_rows(vec![json!({
            "id": 3,
            "xml_id": "video-live",
            "display_name": "Video Live",
            "active": true,
            "dscp": 40,
            "cdn_id": 1,
            "cdn_name": "mainline",
            "type_id": 11,
            "long_desc": null,
            "last_updated": "2024-05-01T12:00:00Z"
        })]);

        let resource = DeliveryServiceResource::default();
        let filters = HashMap::from([("xmlId".to_string(), "video-live".to_string())]);
        let rows = dispatch::read(&resource, ctx(&store).await, &filters)
            .await
            .expect("read");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["cdnName"], json!("mainline"));
        assert!(store.journal().queries[0].contains("ds.xml_id = $1"));
    }

    #[tokio::test]
    async fn constraint_violation_rolls_back() {
        let store = MockStore::new();
        store.expect_rows(vec![json!({ "name": "HTTP" })]); // type check
        store.expect_query_err("duplicate key value violates unique constraint \"ds_xml_id\"");

        let mut resource = candidate();
        let err = dispatch::create(&mut resource, ctx(&store).await)
            .await
            .expect_err("insert must fail");
        assert_eq!(err.kind(), ErrorKind::Persistence);

        let journal = store.journal();
        assert!(journal.rolled_back);
        assert!(!journal.committed);
    }
}

//! Cache group resource.
//!
//! Rule set:
//! - `name`, `shortName`: required, alphanumeric plus `.` `-` `_`
//! - `latitude` within ±90, `longitude` within ±180
//! - `typeId`: required, and must reference a type usable by cache groups
//!   (checked against the open transaction; the check merges into the same
//!   error set as the pure rules)

use crate::row::{int_filter, str_field, time_field};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use trellis_api::{ApiError, Param, RequestContext, Resource, ResourceFactory, StoreError};
use trellis_core::{CacheGroup, Identity};
use trellis_validate::{FieldRule, ValidationErrors, evaluate};

pub const KIND: &str = "cachegroup";

const NAME_PATTERN: &str = r"^[A-Za-z0-9._-]+$";
const CHARSET_MSG: &str = "invalid characters found - Use alphanumeric . or - or _ .";

fn rules() -> Vec<FieldRule> {
    vec![
        FieldRule::required("name"),
        FieldRule::pattern("name", NAME_PATTERN, CHARSET_MSG),
        FieldRule::required("shortName"),
        FieldRule::pattern("shortName", NAME_PATTERN, CHARSET_MSG),
        FieldRule::float_range("latitude", -90.0, 90.0),
        FieldRule::float_range("longitude", -180.0, 180.0),
        FieldRule::required("typeId"),
    ]
}

fn select_query() -> String {
    "SELECT cachegroup.id, cachegroup.name, cachegroup.short_name, \
     cachegroup.latitude, cachegroup.longitude, \
     cgp.name AS parent_name, cachegroup.parent_cachegroup_id, \
     cgs.name AS secondary_parent_name, cachegroup.secondary_parent_cachegroup_id, \
     cachegroup.fallback_to_closest, \
     type.name AS type_name, cachegroup.type_id, cachegroup.last_updated \
     FROM cachegroup \
     LEFT JOIN cachegroup AS cgp ON cachegroup.parent_cachegroup_id = cgp.id \
     LEFT JOIN cachegroup AS cgs ON cachegroup.secondary_parent_cachegroup_id = cgs.id \
     JOIN type ON cachegroup.type_id = type.id"
        .to_string()
}

fn insert_query() -> String {
    "INSERT INTO cachegroup \
     (name, short_name, latitude, longitude, parent_cachegroup_id, \
      secondary_parent_cachegroup_id, fallback_to_closest, type_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
     RETURNING id, last_updated"
        .to_string()
}

fn update_query() -> String {
    "UPDATE cachegroup SET \
     name = $1, short_name = $2, latitude = $3, longitude = $4, \
     parent_cachegroup_id = $5, secondary_parent_cachegroup_id = $6, \
     fallback_to_closest = $7, type_id = $8 \
     WHERE id = $9 \
     RETURNING last_updated"
        .to_string()
}

fn delete_query() -> String {
    "DELETE FROM cachegroup WHERE id = $1".to_string()
}

fn type_check_query() -> String {
    "SELECT name FROM type WHERE id = $1 AND use_in_table = 'cachegroup'".to_string()
}

/// Capability implementation binding a [`CacheGroup`] to the CRUD contract.
#[derive(Debug, Default)]
pub struct CacheGroupResource {
    cg: CacheGroup,
}

impl CacheGroupResource {
    pub fn new(cg: CacheGroup) -> Self {
        Self { cg }
    }

    pub fn entity(&self) -> &CacheGroup {
        &self.cg
    }

    fn write_params(&self) -> Vec<Param> {
        vec![
            self.cg.name.clone().into(),
            self.cg.short_name.clone().into(),
            self.cg.latitude.into(),
            self.cg.longitude.into(),
            self.cg.parent_cachegroup_id.into(),
            self.cg.secondary_parent_cachegroup_id.into(),
            self.cg.fallback_to_closest.into(),
            self.cg.type_id.into(),
        ]
    }
}

fn row_to_cachegroup(row: &Value) -> CacheGroup {
    CacheGroup {
        id: row.get("id").and_then(Value::as_i64),
        name: str_field(row, "name"),
        short_name: str_field(row, "short_name"),
        latitude: row.get("latitude").and_then(Value::as_f64),
        longitude: row.get("longitude").and_then(Value::as_f64),
        parent_name: str_field(row, "parent_name"),
        parent_cachegroup_id: row.get("parent_cachegroup_id").and_then(Value::as_i64),
        secondary_parent_name: str_field(row, "secondary_parent_name"),
        secondary_parent_cachegroup_id: row
            .get("secondary_parent_cachegroup_id")
            .and_then(Value::as_i64),
        fallback_to_closest: row.get("fallback_to_closest").and_then(Value::as_bool),
        type_name: str_field(row, "type_name"),
        type_id: row.get("type_id").and_then(Value::as_i64),
        last_updated: time_field(row, "last_updated"),
    }
}

#[async_trait]
impl Resource for CacheGroupResource {
    fn identify(&self) -> Identity {
        Identity::new(KIND, self.cg.id, self.cg.name.clone())
    }

    async fn validate(&self, ctx: &mut RequestContext) -> Result<ValidationErrors, ApiError> {
        let entity = serde_json::to_value(&self.cg)
            .map_err(|e| ApiError::programming(format!("cachegroup failed to serialize: {}", e)))?;
        let mut errs = evaluate(&rules(), &entity);

        if let Some(type_id) = self.cg.type_id {
            let rows = ctx
                .tx()
                .query(&type_check_query(), &[Param::Int(type_id)])
                .await?;
            if rows.is_empty() {
                errs.push("typeId", "invalid cachegroup type");
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
            clauses.push(format!("cachegroup.id = ${}", params.len()));
        }
        if let Some(name) = filters.get("name") {
            params.push(Param::Text(name.clone()));
            clauses.push(format!("cachegroup.name = ${}", params.len()));
        }
        if let Some(short_name) = filters.get("shortName") {
            params.push(Param::Text(short_name.clone()));
            clauses.push(format!("cachegroup.short_name = ${}", params.len()));
        }
        if let Some(type_name) = filters.get("type") {
            params.push(Param::Text(type_name.clone()));
            clauses.push(format!("type.name = ${}", params.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let rows = ctx.tx().query(&sql, &params).await?;
        rows.iter()
            .map(|row| {
                serde_json::to_value(row_to_cachegroup(row)).map_err(|e| {
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
        self.cg.id = row.get("id").and_then(Value::as_i64);
        self.cg.last_updated = time_field(row, "last_updated");
        if self.cg.id.is_none() {
            return Err(ApiError::Persistence(StoreError::Backend(
                "insert returned no generated key".to_string(),
            )));
        }
        Ok(())
    }

    async fn update(&mut self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        let mut params = self.write_params();
        params.push(self.cg.id.into());
        let rows = ctx.tx().query(&update_query(), &params).await?;
        match rows.first() {
            Some(row) => {
                self.cg.last_updated = time_field(row, "last_updated");
                Ok(())
            }
            None => Err(ApiError::not_found(KIND)),
        }
    }

    async fn delete(&self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        let params = [Param::from(self.cg.id)];
        let affected = ctx.tx().execute(&delete_query(), &params).await?;
        if affected == 0 {
            return Err(ApiError::not_found(KIND));
        }
        Ok(())
    }

    fn payload(&self) -> Result<Value, ApiError> {
        serde_json::to_value(&self.cg)
            .map_err(|e| ApiError::programming(format!("cachegroup failed to serialize: {}", e)))
    }
}

pub struct CacheGroupFactory;

impl ResourceFactory for CacheGroupFactory {
    fn kind(&self) -> &'static str {
        "cachegroups"
    }

    fn empty(&self) -> Box<dyn Resource> {
        Box::new(CacheGroupResource::default())
    }

    fn from_json(&self, body: Value) -> Result<Box<dyn Resource>, ApiError> {
        let cg: CacheGroup = serde_json::from_value(body)
            .map_err(|e| ApiError::programming(format!("malformed request body: {}", e)))?;
        Ok(Box::new(CacheGroupResource::new(cg)))
    }
}

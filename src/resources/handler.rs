use serde_json::Value;

use super::kinds::{Approval, ResourceKind, APPROVED_FIELD};
use crate::{
    clock::Clock,
    db::{Document, DocumentStore, Fields, Filter, RecordId, ID_FIELD},
    error::ApiError,
};

/// Who is reading a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Anonymous visitors: moderated kinds show approved records only.
    Public,
    /// Authenticated admin: everything.
    Admin,
}

/// CRUD over one resource kind, driven entirely by its [`ResourceKind`] table.
pub struct ResourceHandler<'a> {
    kind: &'static ResourceKind,
    store: &'a dyn DocumentStore,
    clock: &'a dyn Clock,
}

impl<'a> ResourceHandler<'a> {
    pub fn new(kind: &'static ResourceKind, store: &'a dyn DocumentStore, clock: &'a dyn Clock) -> Self {
        Self { kind, store, clock }
    }

    pub fn kind(&self) -> &'static ResourceKind {
        self.kind
    }

    pub async fn list(&self, audience: Audience) -> Result<Vec<Document>, ApiError> {
        let mut filter = Filter::all();
        if audience == Audience::Public && self.kind.approval.is_moderated() {
            filter = filter.eq(APPROVED_FIELD, true);
        }
        if let Some((field, descending)) = self.kind.order {
            filter = filter.sort_by(field, descending);
        }
        Ok(self.store.find(self.kind.collection, &filter).await?)
    }

    pub async fn get(&self, raw_id: &str) -> Result<Document, ApiError> {
        let id = self.resolve(raw_id)?;
        self.store
            .find_by_id(self.kind.collection, id)
            .await?
            .ok_or(ApiError::NotFound(self.kind.label))
    }

    pub async fn create(&self, body: Value) -> Result<RecordId, ApiError> {
        self.create_with_assigned(into_fields(body)?, Fields::new()).await
    }

    /// Creates a record from client `fields` plus server-`assigned` values.
    /// Assigned values bypass the immutable-field strip.
    pub async fn create_with_assigned(
        &self,
        mut fields: Fields,
        assigned: Fields,
    ) -> Result<RecordId, ApiError> {
        if let Some(missing) = self.kind.required.iter().find(|f| !fields.contains_key(**f)) {
            return Err(ApiError::Validation(format!("Missing required field: {missing}")));
        }
        self.check_choices(&fields)?;
        self.strip_protected(&mut fields);

        match self.kind.approval {
            Approval::None => {}
            Approval::AlwaysPending => {
                fields.insert(APPROVED_FIELD.into(), Value::Bool(false));
            }
            Approval::CallerChoice => {
                let approved = approval_flag(&fields)?.unwrap_or(false);
                fields.insert(APPROVED_FIELD.into(), Value::Bool(approved));
            }
        }

        fields.extend(assigned);
        if let Some(field) = self.kind.stamp {
            fields.insert(field.into(), Value::String(self.clock.timestamp()));
        }

        let id = self.store.insert(self.kind.collection, fields).await?;
        tracing::info!(collection = self.kind.collection, id = %id, "Record created");
        Ok(id)
    }

    pub async fn update(&self, raw_id: &str, patch: Value) -> Result<(), ApiError> {
        let mut patch = into_fields(patch)?;
        if patch.is_empty() {
            return Err(ApiError::Validation("No fields to update".into()));
        }
        self.check_choices(&patch)?;
        let id = self.resolve(raw_id)?;

        self.strip_protected(&mut patch);
        match self.kind.approval {
            Approval::None => {}
            Approval::AlwaysPending => {
                patch.remove(APPROVED_FIELD);
            }
            Approval::CallerChoice => match approval_flag(&patch)? {
                Some(approved) => {
                    patch.insert(APPROVED_FIELD.into(), Value::Bool(approved));
                }
                // An explicit null leaves the stored flag alone.
                None => {
                    patch.remove(APPROVED_FIELD);
                }
            },
        }

        if !self.store.update(self.kind.collection, id, patch).await? {
            return Err(ApiError::NotFound(self.kind.label));
        }
        tracing::info!(collection = self.kind.collection, id = %id, "Record updated");
        Ok(())
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), ApiError> {
        let id = self.resolve(raw_id)?;
        if !self.store.delete(self.kind.collection, id).await? {
            return Err(ApiError::NotFound(self.kind.label));
        }
        tracing::info!(collection = self.kind.collection, id = %id, "Record deleted");
        Ok(())
    }

    /// Marks a moderated record approved. There is no way back.
    pub async fn approve(&self, raw_id: &str) -> Result<(), ApiError> {
        let id = self.resolve(raw_id)?;
        let mut patch = Fields::new();
        patch.insert(APPROVED_FIELD.into(), Value::Bool(true));
        if !self.store.update(self.kind.collection, id, patch).await? {
            return Err(ApiError::NotFound(self.kind.label));
        }
        tracing::info!(collection = self.kind.collection, id = %id, "Record approved");
        Ok(())
    }

    /// The lone record of a singleton kind, if one was ever written.
    pub async fn singleton(&self) -> Result<Option<Document>, ApiError> {
        Ok(self.store.find_one(self.kind.collection, &Filter::all()).await?)
    }

    pub async fn upsert_singleton(&self, body: Value) -> Result<RecordId, ApiError> {
        let mut fields = into_fields(body)?;
        self.check_choices(&fields)?;
        self.strip_protected(&mut fields);
        if fields.is_empty() {
            return Err(ApiError::Validation("No data provided for update".into()));
        }
        let id = self.store.upsert_singleton(self.kind.collection, fields).await?;
        tracing::info!(collection = self.kind.collection, id = %id, "Singleton record saved");
        Ok(id)
    }

    fn resolve(&self, raw_id: &str) -> Result<RecordId, ApiError> {
        RecordId::parse(raw_id).ok_or(ApiError::NotFound(self.kind.label))
    }

    fn check_choices(&self, fields: &Fields) -> Result<(), ApiError> {
        for choice in self.kind.choices {
            let Some(value) = fields.get(choice.field) else {
                continue;
            };
            let valid = value
                .as_str()
                .is_some_and(|v| choice.allowed.contains(&v));
            if !valid {
                return Err(ApiError::EnumViolation {
                    field: choice.field,
                    allowed: choice.allowed,
                });
            }
        }
        Ok(())
    }

    fn strip_protected(&self, fields: &mut Fields) {
        fields.remove(ID_FIELD);
        for field in self.kind.immutable {
            fields.remove(*field);
        }
    }
}

/// Reads a caller-supplied `approved`: absent or null is `None`, anything
/// but a boolean is rejected.
fn approval_flag(fields: &Fields) -> Result<Option<bool>, ApiError> {
    match fields.get(APPROVED_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ApiError::Validation(format!(
            "`{APPROVED_FIELD}` must be a boolean"
        ))),
    }
}

fn into_fields(body: Value) -> Result<Fields, ApiError> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(ApiError::Validation("Request body must be a JSON object".into())),
    }
}

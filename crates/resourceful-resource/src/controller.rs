//! Default CRUD handlers.
//!
//! Every resource starts with seven endpoints over its model:
//!
//! | Id | Route | Data |
//! |----|-------|------|
//! | `find` | `GET /` | `{ <plural>: [...] }` |
//! | `count` | `GET /count` | `{ count: n }` |
//! | `findOne` | `GET /one` | `{ <name>: doc \| null }` |
//! | `findById` | `GET /:<name>Id` | `{ <name>: doc }` |
//! | `create` | `POST /` | `{ <name>: doc }` |
//! | `update` | `PATCH /:<name>Id` | `{ <name>: doc }` |
//! | `remove` | `DELETE /:<name>Id` | `{ <name>: doc }` |
//!
//! List, count and find-one filter on the query string. Id-addressed
//! endpoints answer 404 when the document does not exist (or is soft-deleted).

use std::sync::Arc;

use resourceful_core::{ResourceError, ResourceResult};
use resourceful_store::Document;
use serde_json::{Map, Value};

use crate::context::RequestContext;
use crate::endpoint::EndpointSpec;
use crate::handler::Handler;
use crate::naming::plural;

/// Ids of the default endpoints, in declaration order.
pub const DEFAULT_ENDPOINT_IDS: [&str; 7] = [
    "find", "count", "findOne", "findById", "create", "update", "remove",
];

/// Shapes documents into response payloads for one resource.
#[derive(Debug, Clone)]
pub(crate) struct Controller {
    singular: Arc<str>,
    plural: Arc<str>,
    id_param: Arc<str>,
    hidden: Arc<[String]>,
}

impl Controller {
    pub(crate) fn new(resource_name: &str, hidden: &[String]) -> Self {
        Self {
            singular: resource_name.into(),
            plural: plural(resource_name).into(),
            id_param: format!("{resource_name}Id").into(),
            hidden: hidden.into(),
        }
    }

    pub(crate) fn id_path(&self) -> String {
        format!("/:{}", self.id_param)
    }

    /// Drops hidden fields from a stored document.
    pub(crate) fn present(&self, mut document: Document) -> Value {
        for field in self.hidden.iter() {
            document.remove(field);
        }
        Value::Object(document)
    }

    pub(crate) fn wrap_one(&self, document: Option<Document>) -> Value {
        let mut payload = Map::new();
        payload.insert(
            self.singular.to_string(),
            document.map_or(Value::Null, |doc| self.present(doc)),
        );
        Value::Object(payload)
    }

    fn wrap_many(&self, documents: Vec<Document>) -> Value {
        let items = documents.into_iter().map(|doc| self.present(doc)).collect();
        let mut payload = Map::new();
        payload.insert(self.plural.to_string(), Value::Array(items));
        Value::Object(payload)
    }

    pub(crate) fn target_id(&self, ctx: &RequestContext) -> ResourceResult<String> {
        ctx.param(&self.id_param).map(str::to_string).ok_or_else(|| {
            ResourceError::validation(format!("Missing path parameter \"{}\".", self.id_param))
        })
    }

    pub(crate) fn missing(&self) -> ResourceError {
        ResourceError::not_found(format!("No {} was found for the given id.", self.singular))
    }

    /// Wraps `f` as a handler that receives this controller.
    pub(crate) fn handler<F, Fut>(&self, f: F) -> Handler
    where
        F: Fn(Self, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ResourceResult<Value>> + Send + 'static,
    {
        let this = self.clone();
        Handler::new(move |ctx| f(this.clone(), ctx))
    }

    fn find(&self) -> Handler {
        self.handler(|this, ctx| async move {
            let documents = ctx.model().find_many(&ctx.query_filter()).await?;
            Ok(this.wrap_many(documents))
        })
    }

    fn count(&self) -> Handler {
        self.handler(|_, ctx| async move {
            let count = ctx.model().count(&ctx.query_filter()).await?;
            Ok(serde_json::json!({ "count": count }))
        })
    }

    fn find_one(&self) -> Handler {
        self.handler(|this, ctx| async move {
            let document = ctx.model().find_one(&ctx.query_filter()).await?;
            Ok(this.wrap_one(document))
        })
    }

    fn find_by_id(&self) -> Handler {
        self.handler(|this, ctx| async move {
            let id = this.target_id(&ctx)?;
            let document = ctx.model().find_by_id(&id).await?;
            match document {
                Some(document) => Ok(this.wrap_one(Some(document))),
                None => Err(this.missing()),
            }
        })
    }

    fn create(&self) -> Handler {
        self.handler(|this, ctx| async move {
            let document = ctx.model().create(ctx.body().clone()).await?;
            Ok(this.wrap_one(Some(document)))
        })
    }

    fn update(&self) -> Handler {
        self.handler(|this, ctx| async move {
            let id = this.target_id(&ctx)?;
            let document = ctx.model().update(&id, ctx.body().clone()).await?;
            match document {
                Some(document) => Ok(this.wrap_one(Some(document))),
                None => Err(this.missing()),
            }
        })
    }

    fn remove(&self) -> Handler {
        self.handler(|this, ctx| async move {
            let id = this.target_id(&ctx)?;
            let document = ctx.model().remove(&id).await?;
            match document {
                Some(document) => Ok(this.wrap_one(Some(document))),
                None => Err(this.missing()),
            }
        })
    }

    /// The default endpoint table, in [`DEFAULT_ENDPOINT_IDS`] order.
    pub(crate) fn defaults(&self) -> Vec<(&'static str, EndpointSpec)> {
        let by_id = self.id_path();
        vec![
            ("find", EndpointSpec::new("get", "/", self.find())),
            ("count", EndpointSpec::new("get", "/count", self.count())),
            ("findOne", EndpointSpec::new("get", "/one", self.find_one())),
            ("findById", EndpointSpec::new("get", by_id.clone(), self.find_by_id())),
            ("create", EndpointSpec::new("post", "/", self.create())),
            ("update", EndpointSpec::new("patch", by_id.clone(), self.update())),
            ("remove", EndpointSpec::new("delete", by_id, self.remove())),
        ]
    }
}

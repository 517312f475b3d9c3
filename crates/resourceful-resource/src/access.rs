//! Bundled permission predicates.
//!
//! Policies are composed by attaching several predicates to one endpoint;
//! by default any one of them granting is enough (see
//! [`PermissionMode`](crate::PermissionMode)).
//!
//! # Example
//!
//! ```
//! use resourceful_resource::{access, Resource, ResourceOptions};
//!
//! let mut posts = Resource::new(ResourceOptions::new("Post")).unwrap();
//! posts
//!     .add_permission("find", access::is_anyone())?
//!     .add_permission("create", access::is_user())?
//!     .add_permission("update", access::is_owner("author"))?
//!     .add_permission("remove", access::is_tokenized())?;
//! # Ok::<(), resourceful_resource::ResourceConfigError>(())
//! ```

use serde_json::Value;

use crate::handler::Permission;

/// Grants every request.
pub fn is_anyone() -> Permission {
    Permission::from_fn(|_| true)
}

/// Grants requests that carry a valid, active token.
pub fn is_tokenized() -> Permission {
    Permission::from_fn(|ctx| ctx.auth().is_some_and(|auth| auth.is_present()))
}

/// Grants requests whose token resolved to a user.
pub fn is_user() -> Permission {
    Permission::from_fn(|ctx| ctx.user().is_some())
}

/// Body field naming a document's owner.
pub const DEFAULT_OWNER_FIELD: &str = "user";

/// Grants requests whose user id equals the body's `field`.
///
/// Use [`is_owned`] for the conventional [`DEFAULT_OWNER_FIELD`].
pub fn is_owner(field: impl Into<String>) -> Permission {
    let field = field.into();
    Permission::from_fn(move |ctx| {
        let Some(user) = ctx.user() else {
            return false;
        };
        matches!(ctx.body().get(&field), Some(Value::String(owner)) if owner == user.id())
    })
}

/// [`is_owner`] over [`DEFAULT_OWNER_FIELD`].
pub fn is_owned() -> Permission {
    is_owner(DEFAULT_OWNER_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use http::Method;
    use resourceful_core::{AuthIdentity, Request, UserIdentity};
    use resourceful_store::{MemoryStore, ModelOptions, ModelRegistry};
    use serde_json::json;

    fn ctx(request: Request) -> RequestContext {
        let registry = ModelRegistry::new(MemoryStore::new());
        RequestContext::new("x", request, registry.model("Post", ModelOptions::default()))
    }

    fn anonymous(body: Value) -> Request {
        Request::new(Method::POST, "/").with_body(body)
    }

    fn signed_in(body: Value) -> Request {
        let mut request = anonymous(body);
        request.set_auth(Some(AuthIdentity {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            email: None,
        }));
        request.set_user(UserIdentity::from_document(json!({ "id": "u1" })));
        request
    }

    #[tokio::test]
    async fn test_is_anyone() {
        assert!(is_anyone().call(ctx(anonymous(Value::Null))).await);
    }

    #[tokio::test]
    async fn test_is_tokenized() {
        assert!(!is_tokenized().call(ctx(anonymous(Value::Null))).await);
        assert!(is_tokenized().call(ctx(signed_in(Value::Null))).await);

        let mut empty = anonymous(Value::Null);
        empty.set_auth(Some(AuthIdentity {
            id: String::new(),
            user_id: "u1".to_string(),
            email: None,
        }));
        assert!(!is_tokenized().call(ctx(empty)).await);
    }

    #[tokio::test]
    async fn test_is_user() {
        assert!(!is_user().call(ctx(anonymous(Value::Null))).await);
        assert!(is_user().call(ctx(signed_in(Value::Null))).await);
    }

    #[tokio::test]
    async fn test_is_owner() {
        let owner = is_owner("user");
        assert!(owner.call(ctx(signed_in(json!({ "user": "u1" })))).await);
        assert!(!owner.call(ctx(signed_in(json!({ "user": "u2" })))).await);
        assert!(!owner.call(ctx(signed_in(json!({ "author": "u1" })))).await);
        assert!(!owner.call(ctx(signed_in(Value::Null))).await);
        assert!(!owner.call(ctx(anonymous(json!({ "user": "u1" })))).await);

        assert!(is_owner("author").call(ctx(signed_in(json!({ "author": "u1" })))).await);
    }

    #[tokio::test]
    async fn test_is_owned_reads_the_user_field() {
        assert!(is_owned().call(ctx(signed_in(json!({ "user": "u1" })))).await);
        assert!(!is_owned().call(ctx(signed_in(json!({ "user": "u2" })))).await);
        assert!(!is_owned().call(ctx(signed_in(json!({ "owner": "u1" })))).await);
        assert!(!is_owned().call(ctx(anonymous(json!({ "user": "u1" })))).await);
    }
}

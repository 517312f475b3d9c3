//! The permission gate.
//!
//! Every compiled endpoint starts with a gate built from its effective open
//! flag and the predicates attached to its id:
//!
//! | Open | Predicates | Outcome |
//! |------|------------|---------|
//! | yes | any | granted |
//! | no | none | 401 |
//! | no | some | combined by [`PermissionMode`] |

use std::time::Duration;

use resourceful_core::{ResourceError, ResourceResult};
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::handler::Permission;
use crate::pipeline::{bounded, Stage};

/// How the predicates attached to one endpoint are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Granted when any predicate grants. Stops at the first grant.
    #[default]
    Any,
    /// Granted when every predicate grants. Stops at the first refusal.
    All,
}

#[derive(Debug, Clone)]
pub(crate) struct PermissionGate {
    open: bool,
    mode: PermissionMode,
    predicates: Vec<Permission>,
}

impl PermissionGate {
    pub(crate) fn new(open: bool, mode: PermissionMode, predicates: Vec<Permission>) -> Self {
        Self {
            open,
            mode,
            predicates,
        }
    }

    pub(crate) const fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Evaluates the predicates in attachment order.
    pub(crate) async fn check(
        &self,
        ctx: &RequestContext,
        limit: Option<Duration>,
    ) -> ResourceResult<()> {
        if self.open {
            return Ok(());
        }

        let mut granted = false;
        for predicate in &self.predicates {
            let fut = predicate.call(ctx.clone());
            granted = bounded(Stage::Permission, ctx.endpoint_id(), limit, async { Ok(fut.await) }).await?;
            match self.mode {
                PermissionMode::Any if granted => break,
                PermissionMode::All if !granted => break,
                _ => {}
            }
        }

        if granted {
            Ok(())
        } else {
            Err(ResourceError::permission_denied(ctx.endpoint_id()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use resourceful_core::Request;
    use resourceful_store::{MemoryStore, ModelOptions, ModelRegistry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn ctx() -> RequestContext {
        let registry = ModelRegistry::new(MemoryStore::new());
        RequestContext::new(
            "find",
            Request::new(Method::GET, "/"),
            registry.model("Post", ModelOptions::default()),
        )
    }

    fn counting(result: bool, calls: &Arc<AtomicUsize>) -> Permission {
        let calls = Arc::clone(calls);
        Permission::from_fn(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            result
        })
    }

    fn fixed(result: bool) -> Permission {
        Permission::from_fn(move |_| result)
    }

    #[tokio::test]
    async fn test_open_gate_skips_predicates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = PermissionGate::new(true, PermissionMode::Any, vec![counting(false, &calls)]);
        assert!(gate.check(&ctx(), None).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let gate = PermissionGate::new(true, PermissionMode::All, Vec::new());
        assert!(gate.check(&ctx(), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_gate_without_predicates_denies() {
        for mode in [PermissionMode::Any, PermissionMode::All] {
            let err = PermissionGate::new(false, mode, Vec::new())
                .check(&ctx(), None)
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.to_string(), "Permission denied for endpoint \"find\".");
        }
    }

    #[tokio::test]
    async fn test_any_grants_on_first_true() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = PermissionGate::new(
            false,
            PermissionMode::Any,
            vec![fixed(false), fixed(true), counting(true, &calls)],
        );
        assert!(gate.check(&ctx(), None).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let gate = PermissionGate::new(false, PermissionMode::Any, vec![fixed(false), fixed(false)]);
        assert!(gate.check(&ctx(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_all_requires_every_predicate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = PermissionGate::new(
            false,
            PermissionMode::All,
            vec![fixed(true), fixed(false), counting(true, &calls)],
        );
        assert!(gate.check(&ctx(), None).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let gate = PermissionGate::new(false, PermissionMode::All, vec![fixed(true), fixed(true)]);
        assert!(gate.check(&ctx(), None).await.is_ok());
        assert_eq!(gate.len(), 2);
        assert!(!gate.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_predicate_times_out() {
        let slow = Permission::new(|_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            true
        });
        let gate = PermissionGate::new(false, PermissionMode::Any, vec![slow]);
        let err = gate
            .check(&ctx(), Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_mode_serde() {
        assert_eq!(serde_json::to_string(&PermissionMode::All).unwrap(), "\"all\"");
        let mode: PermissionMode = serde_json::from_str("\"any\"").unwrap();
        assert_eq!(mode, PermissionMode::Any);
    }
}

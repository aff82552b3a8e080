//! Remote Client Boundary
//!
//! The wire protocol and transport of the document store are out of scope;
//! this trait is the seam the interceptor delegates through. Implementations
//! own their own timeouts and cancellation, which pass through unmodified.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// == Remote Client Contract ==
/// A remote document-store client exposing named operations.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Executes a named operation (`search`, `index`, `bulk`, ...) with a
    /// parameters object and resolves with the response payload.
    async fn execute(&self, op: &str, params: Value) -> Result<Value>;

    /// Checks whether a backing resource exists.
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Creates a backing resource with the given schema.
    async fn create_index(&self, index: &str, schema: &Value) -> Result<Value>;

    /// Reachability probe run before mapping setup. Implementations without
    /// a dedicated health endpoint can rely on the default.
    async fn health(&self) -> Result<()> {
        Ok(())
    }
}

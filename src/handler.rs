//! Resource handler dispatch contract.
//!
//! A [`ResourceHandler`] is implemented once per resource type and owns the
//! backing store for that type, including timestamp assignment: handlers
//! stamp `meta.created` and `meta.lastModified` on the documents they return,
//! and the dispatch layer completes the rest of the meta block.
//!
//! Every method defaults to declining with
//! [`ScimError::NotImplemented`](crate::error::ScimError::NotImplemented), so
//! read-only catalog handlers only implement the read path.

use crate::error::{ScimError, ScimResult};
use crate::list::{ListParams, PartialListResponse};
use serde_json::Value;

/// Polymorphic capability backing one resource type.
///
/// The dispatch layer calls these with documents that already passed
/// request-direction validation, and treats the returned documents as
/// not-yet-rendered: they still go through meta injection and
/// response-direction validation.
pub trait ResourceHandler: Send + Sync {
    /// Store a new resource and assign its server-side `id`.
    fn create_resource(&self, _resource: Value) -> ScimResult<Value> {
        Err(ScimError::not_implemented("create"))
    }

    /// Fetch a resource by id. Unknown ids fail with
    /// [`ScimError::ResourceNotFound`], never an empty value.
    fn get_resource(&self, _id: &str) -> ScimResult<Value> {
        Err(ScimError::not_implemented("get"))
    }

    /// List candidate resources through the shared list engine.
    ///
    /// Implementations hand their candidate set to
    /// [`list::apply`](crate::list::apply) so filtering, sorting and
    /// pagination behave identically for every resource type.
    fn list_resources(&self, _params: &ListParams) -> ScimResult<PartialListResponse> {
        Err(ScimError::not_implemented("list"))
    }

    /// Replace an existing resource.
    fn update_resource(&self, _id: &str, _resource: Value) -> ScimResult<Value> {
        Err(ScimError::not_implemented("update"))
    }

    /// Delete a resource by id.
    fn delete_resource(&self, _id: &str) -> ScimResult<()> {
        Err(ScimError::not_implemented("delete"))
    }
}

//! svcgen runtime
//!
//! Types and helpers linked by the client implementations that svcgen
//! generates: the transport pipeline seam, request/response values, the
//! per-call instrumentation scope and the process-wide instance cache
//! behind every generated `get_instance`.

pub mod body;
pub mod cache;
pub mod error;
pub mod http;
pub mod path;
pub mod scope;

pub use crate::{
    body::{FromResponse, IntoRequestBody},
    cache::{InstanceCache, PipelineId},
    error::{PipelineError, ServiceError, ServiceResult},
    http::{HttpHeaders, HttpMethod, HttpPipeline, HttpRequest, HttpResponse, encode_component},
    path::PathTemplate,
    scope::InstrumentationScope,
};

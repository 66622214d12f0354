//! Prelude module for convenient imports.
//!
//! ```ignore
//! use graphwire_core::prelude::*;
//! ```

pub use crate::{
    CachePolicy, Error, FlexibleDecoder, GraphQLError, GraphQLOperation, GraphQLResult,
    HttpClient, HttpRequest, HttpResponse, JsonDecoder, Method, OperationType, Parseable,
    Request, Response, Result, ResultSource,
};

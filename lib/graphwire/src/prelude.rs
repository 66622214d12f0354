//! Prelude module for convenient imports.
//!
//! ```ignore
//! use graphwire::prelude::*;
//! ```

pub use crate::{
    CachePolicy, ClientConfig, CodableInterceptorProvider, Error, GraphQLConfig, GraphQLError,
    GraphQLOperation, GraphQLResult, HttpClient, HyperClient, InMemoryStore, InterceptorProvider,
    LegacyInterceptorProvider, OperationType, RequestChainNetworkTransport, Result, ResultSource,
};
pub use serde::{Deserialize, Serialize};

pub mod adapter;
pub mod auth;
pub mod core;
pub mod dispatch;
pub mod handler;
pub mod invoker;
pub mod registry;

pub use auth::{AuthContext, AuthKeyEntry, AuthProvider, MemoryAuth, NoopAuth};
pub use core::{Core, CoreState};
pub use invoker::{ModelInvoker, NativeChunkStream};
pub use registry::{ModelRegistry, ProviderFamily, ResolvedModel};

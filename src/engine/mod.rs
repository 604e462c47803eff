//! 引擎层：深度引擎抽象与远程实现

pub mod remote;
pub mod traits;

pub use remote::RemoteEngine;
pub use traits::{DeepEngine, EngineError, EngineReply, HandoffContext};

//! Behavior tree runtime
//!
//! Минимальный детерминированный BT для AI куба:
//! - [`Behavior`]: trait узла, generic по контексту (blackboard)
//! - [`Status`]: Success / Failure (без Running: тик всегда завершается)
//! - Композиты [`Sequence`], [`Selector`]; декораторы [`Inverter`], [`AlwaysSucceed`]
//! - [`script`]: загрузка дерева из текстового скрипта

pub mod builder;
pub mod node;
pub mod script;
pub mod status;

pub use node::{AlwaysSucceed, Behavior, Inverter, Selector, Sequence};
pub use script::{parse_tree, BehaviorTree, ScriptError, TaskFactory, TaskRegistry};
pub use status::Status;

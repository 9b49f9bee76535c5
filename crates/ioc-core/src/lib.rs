//! # IoC Core
//!
//! Fodax IoC 容器的核心实现：服务注册、解析、作用域与生命周期编排。
//!
//! ## 核心组件
//!
//! - [`Container`] - 绑定命名空间的服务容器
//! - [`Provider`] - 服务注册请求（token + 生命周期 + 生产方式）
//! - [`Ioc`] - 命名空间容器目录
//!
//! ## 生命周期策略
//!
//! 每个注册声明 [`Lifetime`] 之一：单例在容器内共享，
//! 作用域实例按 scope id 隔离，瞬时实例每次解析都重新构造。
//! 声明了 [`Lifecycle`] 能力的服务会在容器引导与关闭时
//! 收到相应的钩子调用。

pub mod container;
pub mod ioc;
pub mod provider;

mod registry;
mod scope;

pub use container::{Container, FactoryHandle};
pub use ioc::{Ioc, DEFAULT_NAMESPACE};
pub use provider::{FactoryFn, Provider};

pub use ioc_common::{
    ConfigurationError, HookError, IocError, IocResult, Lifecycle, LifecycleError, Lifetime,
    NotRegisteredError, ProviderToken, ResolutionError, ServiceInstance,
};

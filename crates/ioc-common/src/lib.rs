//! # IoC Common
//!
//! 提供 Fodax IoC 容器各 crate 共享的基础类型。
//!
//! ## 核心组件
//!
//! - [`ProviderToken`] - 服务标识符
//! - [`Lifetime`] - 服务生命周期策略
//! - [`Lifecycle`] - 应用生命周期钩子 trait
//! - [`ServiceInstance`] - 类型擦除的服务实例句柄
//! - [`IocError`] / [`IocResult`] - 统一错误类型
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 生命周期能力在注册时显式声明，而非运行时反射
//! - 解析路径永不挂起，异步只出现在钩子调用处

pub mod errors;
pub mod instance;
pub mod lifecycle;
pub mod token;

pub use errors::*;
pub use instance::*;
pub use lifecycle::*;
pub use token::*;

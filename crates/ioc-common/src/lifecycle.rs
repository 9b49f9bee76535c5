//! 服务生命周期策略与应用生命周期钩子

use crate::errors::HookError;
use async_trait::async_trait;

/// 服务生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// 单例模式 - 整个容器生命周期内只创建一个实例
    Singleton,
    /// 作用域模式 - 在同一作用域内共享实例，例如每个请求一个
    Scoped,
    /// 瞬时模式 - 每次解析都创建新实例
    Transient,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Singleton
    }
}

/// 应用生命周期钩子
///
/// 服务在注册时通过 [`crate::ServiceInstance::with_lifecycle`]
/// 显式声明该能力，容器在引导和关闭阶段调用相应的钩子。
/// 两个钩子默认均为空操作，服务只需覆写自己关心的阶段。
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// 应用引导时调用
    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// 应用关闭时调用
    ///
    /// `signal` 为触发关闭的信号名，例如 "SIGINT"、"SIGTERM"，
    /// 容器不对其取值做任何校验。
    async fn on_application_shutdown(&self, signal: &str) -> Result<(), HookError> {
        let _ = signal;
        Ok(())
    }
}

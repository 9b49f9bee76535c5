//! 类型擦除的服务实例句柄

use crate::lifecycle::Lifecycle;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 注册进容器的服务实例
///
/// 同时保存类型擦除的值和可选的生命周期能力句柄。
/// 生命周期能力必须在构造句柄时声明，容器之后只检查句柄，
/// 不对实例做任何形状探测。
#[derive(Clone)]
pub struct ServiceInstance {
    value: Arc<dyn Any + Send + Sync>,
    lifecycle: Option<Arc<dyn Lifecycle>>,
}

impl ServiceInstance {
    /// 包装一个普通值，不具备生命周期能力
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            lifecycle: None,
        }
    }

    /// 包装一个声明了生命周期钩子的服务
    pub fn with_lifecycle<T: Lifecycle + 'static>(value: T) -> Self {
        let service = Arc::new(value);
        Self {
            value: service.clone(),
            lifecycle: Some(service),
        }
    }

    /// 从已有的共享实例包装，不具备生命周期能力
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value,
            lifecycle: None,
        }
    }

    /// 取得类型擦除的值
    #[must_use]
    pub fn value(&self) -> Arc<dyn Any + Send + Sync> {
        self.value.clone()
    }

    /// 取得生命周期能力句柄（如果注册时声明过）
    #[must_use]
    pub fn lifecycle(&self) -> Option<Arc<dyn Lifecycle>> {
        self.lifecycle.clone()
    }

    /// 尝试按具体类型取回实例
    #[must_use]
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceInstance")
            .field("value", &"<erased>")
            .field("has_lifecycle", &self.lifecycle.is_some())
            .finish()
    }
}

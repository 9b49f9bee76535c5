//! 服务注册请求描述

use crate::container::Container;
use ioc_common::{
    ConfigurationError, IocResult, Lifecycle, Lifetime, ProviderToken, ServiceInstance,
};
use std::fmt;
use std::sync::Arc;

/// 服务工厂函数类型
///
/// 工厂接收所属容器，可以在内部继续解析其他服务。
/// 解析路径永不挂起，因此工厂本身是同步的。
pub type FactoryFn = Arc<dyn Fn(&Container) -> IocResult<ServiceInstance> + Send + Sync>;

/// 服务注册请求
///
/// 一次注册由 token、生命周期和唯一一种生产方式构成：
/// 现成的值、可零参构造的类型、或工厂函数。
/// 未指定 token 时注册方会铸造一个唯一标识并返回；
/// 未指定生命周期时默认单例。
///
/// 需要生命周期钩子的类实例请通过 [`Provider::use_factory`]
/// 配合 [`ServiceInstance::with_lifecycle`] 注册。
#[derive(Default)]
pub struct Provider {
    pub(crate) token: Option<ProviderToken>,
    pub(crate) lifetime: Option<Lifetime>,
    pub(crate) value: Option<ServiceInstance>,
    pub(crate) factory: Option<FactoryFn>,
    pub(crate) class: Option<ClassMode>,
}

/// use_class 生产方式：类型默认 token + 零参构造工厂
pub(crate) struct ClassMode {
    pub(crate) token: ProviderToken,
    pub(crate) factory: FactoryFn,
}

impl Provider {
    /// 创建空的注册请求
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定 token
    #[must_use]
    pub fn token(mut self, token: impl Into<ProviderToken>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// 指定生命周期
    #[must_use]
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// 以现成的值注册
    #[must_use]
    pub fn use_value<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.value = Some(ServiceInstance::new(value));
        self
    }

    /// 以声明了生命周期钩子的服务实例注册
    #[must_use]
    pub fn use_service<T: Lifecycle + 'static>(mut self, value: T) -> Self {
        self.value = Some(ServiceInstance::with_lifecycle(value));
        self
    }

    /// 以工厂函数注册
    #[must_use]
    pub fn use_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Container) -> IocResult<ServiceInstance> + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// 以可零参构造的类型注册
    ///
    /// 未显式指定 token 时，类型标识本身就是 token，
    /// 之后可以用 `ProviderToken::of::<T>()` 解析。
    #[must_use]
    pub fn use_class<T: Default + Send + Sync + 'static>(mut self) -> Self {
        self.class = Some(ClassMode {
            token: ProviderToken::of::<T>(),
            factory: Arc::new(|_| Ok(ServiceInstance::new(T::default()))),
        });
        self
    }

    /// 已设置的生产方式数量
    pub(crate) fn mode_count(&self) -> usize {
        usize::from(self.value.is_some())
            + usize::from(self.factory.is_some())
            + usize::from(self.class.is_some())
    }

    /// 计算注册最终使用的 token 并校验生产方式
    pub(crate) fn into_parts(
        self,
    ) -> Result<(ProviderToken, Lifetime, ProductionMode), ConfigurationError> {
        let mode_count = self.mode_count();
        let token = self
            .token
            .or_else(|| self.class.as_ref().map(|class| class.token.clone()))
            .unwrap_or_else(ProviderToken::unique);

        if token.is_empty_name() {
            return Err(ConfigurationError::EmptyToken);
        }
        match mode_count {
            0 => return Err(ConfigurationError::MissingProductionMode { token }),
            1 => {}
            count => return Err(ConfigurationError::MultipleProductionModes { token, count }),
        }

        let lifetime = self.lifetime.unwrap_or_default();
        let mode = if let Some(instance) = self.value {
            ProductionMode::Value(instance)
        } else if let Some(factory) = self.factory {
            ProductionMode::Factory(factory)
        } else {
            // mode_count == 1 保证 class 必然存在
            ProductionMode::Factory(self.class.map(|class| class.factory).ok_or(
                ConfigurationError::MissingProductionMode {
                    token: token.clone(),
                },
            )?)
        };

        Ok((token, lifetime, mode))
    }
}

/// 校验后的生产方式
pub(crate) enum ProductionMode {
    Value(ServiceInstance),
    Factory(FactoryFn),
}

impl fmt::Debug for ProductionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(instance) => f.debug_tuple("Value").field(instance).finish(),
            Self::Factory(_) => f.debug_tuple("Factory").field(&"<fn>").finish(),
        }
    }
}

//! 服务容器
//!
//! 容器将抽象的服务标识映射到具体实例，支持单例、作用域、
//! 瞬时三种生命周期，并负责引导/关闭两阶段的生命周期编排。

use crate::provider::{FactoryFn, ProductionMode, Provider};
use crate::registry::ServiceRegistry;
use crate::scope::ScopeManager;
use futures::future::try_join_all;
use ioc_common::{
    ConfigurationError, IocResult, Lifecycle, LifecycleError, Lifetime, NotRegisteredError,
    ProviderToken, ResolutionError, ServiceInstance,
};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// 绑定命名空间的服务容器
///
/// 持有一张服务注册表和一个作用域管理器。所有方法都通过
/// 内部可变性工作，容器可以放进 `Arc` 在任务间共享。
///
/// ## 并发语义
///
/// 解析路径只做短暂的加锁读写，调用工厂和钩子时不持有任何锁，
/// 工厂因此可以重入容器。同一个未物化单例被真正并发地首次解析时，
/// 工厂可能各执行一次，后写者胜出——容器只在顺序访问下保证
/// 至多一次构造。
pub struct Container {
    namespace: String,
    registry: ServiceRegistry,
    scopes: ScopeManager,
    initializing: AtomicBool,
    initialized: AtomicBool,
}

impl Container {
    /// 创建绑定到指定命名空间的容器
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            registry: ServiceRegistry::default(),
            scopes: ScopeManager::default(),
            initializing: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
        }
    }

    /// 容器的命名空间名称
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(crate::ioc::DEFAULT_NAMESPACE)
    }
}

/// 注册接口
impl Container {
    /// 按注册请求注册服务，返回最终使用的 token
    ///
    /// 请求必须且只能设置一种生产方式，否则返回配置错误。
    /// 未指定 token 时铸造一个唯一标识并返回。
    pub fn register(&self, provider: Provider) -> IocResult<ProviderToken> {
        let (token, lifetime, mode) = provider.into_parts()?;
        match mode {
            ProductionMode::Value(instance) => {
                self.register_instance(token.clone(), instance, lifetime)?;
            }
            ProductionMode::Factory(factory) => {
                self.register_factory_fn(token.clone(), factory, lifetime)?;
            }
        }
        Ok(token)
    }

    /// 以现成的值注册服务
    pub fn register_value<T: Send + Sync + 'static>(
        &self,
        token: impl Into<ProviderToken>,
        value: T,
        lifetime: Lifetime,
    ) -> IocResult<()> {
        self.register_instance(token.into(), ServiceInstance::new(value), lifetime)
    }

    /// 以声明了生命周期钩子的服务实例注册
    pub fn register_service<T: Lifecycle + 'static>(
        &self,
        token: impl Into<ProviderToken>,
        value: T,
        lifetime: Lifetime,
    ) -> IocResult<()> {
        self.register_instance(token.into(), ServiceInstance::with_lifecycle(value), lifetime)
    }

    /// 以实例句柄注册服务
    ///
    /// 作用域生命周期的实例必须按作用域由工厂产出，
    /// 不能作为固定值共享，此时返回配置错误。
    /// 同 token 的既有注册会被覆盖。
    pub fn register_instance(
        &self,
        token: ProviderToken,
        instance: ServiceInstance,
        lifetime: Lifetime,
    ) -> IocResult<()> {
        if lifetime == Lifetime::Scoped {
            return Err(ConfigurationError::ScopedValueNotSupported { token }.into());
        }
        info!(namespace = %self.namespace, "注册服务: {token}");
        self.registry.insert_value(token, instance, lifetime);
        Ok(())
    }

    /// 以工厂函数注册服务
    ///
    /// 容器引导期间注册表必须保持静态，此时注册返回生命周期错误。
    pub fn register_factory<F>(
        &self,
        token: impl Into<ProviderToken>,
        factory: F,
        lifetime: Lifetime,
    ) -> IocResult<()>
    where
        F: Fn(&Self) -> IocResult<ServiceInstance> + Send + Sync + 'static,
    {
        self.register_factory_fn(token.into(), Arc::new(factory), lifetime)
    }

    pub(crate) fn register_factory_fn(
        &self,
        token: ProviderToken,
        factory: FactoryFn,
        lifetime: Lifetime,
    ) -> IocResult<()> {
        if self.initializing.load(Ordering::SeqCst) {
            return Err(LifecycleError::RegistrationDuringBootstrap { token }.into());
        }
        info!(namespace = %self.namespace, "注册服务工厂: {token}");
        self.registry.insert_factory(token, factory, lifetime);
        Ok(())
    }

    /// 注册一个匿名工厂并返回解析句柄
    ///
    /// token 由容器铸造，句柄的每次 `call` 都按声明的生命周期解析，
    /// 单例因此只会构造一次。
    pub fn memoized_factory<T, F>(
        &self,
        factory: F,
        lifetime: Lifetime,
    ) -> IocResult<FactoryHandle<'_, T>>
    where
        T: Send + Sync + 'static,
        F: Fn(&Self) -> IocResult<ServiceInstance> + Send + Sync + 'static,
    {
        let token = ProviderToken::unique();
        self.register_factory_fn(token.clone(), Arc::new(factory), lifetime)?;
        Ok(FactoryHandle {
            container: self,
            token,
            _marker: PhantomData,
        })
    }
}

/// 作用域接口
impl Container {
    /// 创建作用域，未指定 ID 时铸造一个并返回
    ///
    /// 对已存在的 ID 重复创建会清空该作用域已有的实例。
    pub fn create_scope(&self, scope_id: Option<&str>) -> String {
        let id = self.scopes.create(scope_id);
        debug!(namespace = %self.namespace, "创建作用域: {id}");
        id
    }

    /// 销毁作用域，释放其中全部实例；不存在时静默返回
    pub fn clear_scope(&self, scope_id: &str) {
        self.scopes.clear(scope_id);
    }

    /// 作用域是否存在
    #[must_use]
    pub fn has_scope(&self, scope_id: &str) -> bool {
        self.scopes.has(scope_id)
    }

    /// 取得作用域实例表的快照，作用域不存在时先创建
    ///
    /// 主要用于检视和测试。
    #[must_use]
    pub fn get_scope(
        &self,
        scope_id: &str,
    ) -> HashMap<ProviderToken, Arc<dyn Any + Send + Sync>> {
        self.scopes.snapshot(scope_id)
    }
}

/// 解析接口
impl Container {
    /// 解析服务
    ///
    /// 作用域生命周期的 token 必须通过 [`Self::resolve_scoped`] 解析。
    /// 单例的工厂产物在首次解析时缓存；瞬时服务每次解析都
    /// 重新调用工厂。
    pub fn resolve<T: Send + Sync + 'static>(
        &self,
        token: impl Into<ProviderToken>,
    ) -> IocResult<Arc<T>> {
        let token = token.into();
        let instance = self.resolve_erased(&token)?;
        Self::downcast(&token, &instance)
    }

    /// 在指定作用域内解析服务
    ///
    /// 非作用域生命周期的 token 直接委托给 [`Self::resolve`]，
    /// scope id 被忽略。作用域实例按 scope id 记忆化，
    /// 每个作用域至多调用一次工厂。
    pub fn resolve_scoped<T: Send + Sync + 'static>(
        &self,
        token: impl Into<ProviderToken>,
        scope_id: &str,
    ) -> IocResult<Arc<T>> {
        let token = token.into();
        if self.registry.lifetime_of(&token) != Some(Lifetime::Scoped) {
            return self.resolve(token);
        }

        self.scopes.ensure(scope_id);
        if let Some(value) = self.scopes.get_instance(scope_id, &token) {
            return value.downcast::<T>().map_err(|_| {
                ResolutionError::TypeMismatch {
                    token,
                    expected: std::any::type_name::<T>(),
                }
                .into()
            });
        }

        let Some(factory) = self.registry.factory(&token) else {
            return Err(NotRegisteredError::UnknownToken { token }.into());
        };
        // 工厂调用期间不持有作用域表引用，工厂可以重入容器
        let instance = factory(self)?;
        self.scopes
            .insert_instance(scope_id, token.clone(), instance.value());
        Self::downcast(&token, &instance)
    }

    /// 解析服务，按是否给出 scope id 分派
    ///
    /// 给出 scope id 时走作用域解析，否则走普通解析。
    /// 配合 `ProviderToken::of::<T>()` 可以实现「类型即 token」的用法。
    pub fn inject<T: Send + Sync + 'static>(
        &self,
        token: impl Into<ProviderToken>,
        scope_id: Option<&str>,
    ) -> IocResult<Arc<T>> {
        match scope_id {
            Some(id) => self.resolve_scoped(token, id),
            None => self.resolve(token),
        }
    }

    fn resolve_erased(&self, token: &ProviderToken) -> IocResult<ServiceInstance> {
        let lifetime = self.registry.lifetime_of(token);
        if lifetime == Some(Lifetime::Scoped) {
            return Err(ResolutionError::ScopeRequired {
                token: token.clone(),
            }
            .into());
        }

        if let Some(instance) = self.registry.service(token) {
            return Ok(instance);
        }

        if let Some(factory) = self.registry.factory(token) {
            // 工厂调用期间不持有注册表锁，工厂可以重入容器。
            // 并发首次解析同一单例时工厂可能各执行一次，后写者胜出。
            let instance = factory(self)?;
            if lifetime == Some(Lifetime::Singleton) {
                self.registry.cache_service(token.clone(), instance.clone());
            }
            return Ok(instance);
        }

        if self.initialized.load(Ordering::SeqCst) {
            Err(NotRegisteredError::UnknownToken {
                token: token.clone(),
            }
            .into())
        } else {
            Err(NotRegisteredError::ContainerNotInitialized {
                token: token.clone(),
            }
            .into())
        }
    }

    fn downcast<T: Send + Sync + 'static>(
        token: &ProviderToken,
        instance: &ServiceInstance,
    ) -> IocResult<Arc<T>> {
        instance.downcast::<T>().ok_or_else(|| {
            ResolutionError::TypeMismatch {
                token: token.clone(),
                expected: std::any::type_name::<T>(),
            }
            .into()
        })
    }
}

/// 生命周期编排
impl Container {
    /// 引导全部已注册的服务
    ///
    /// 重入时直接返回（针对引导过程中的再次调用，不针对
    /// 已完成后的重复调用）。编排分两个阶段：
    ///
    /// 1. 已物化的服务按注册顺序逐个串行引导，尊重注册顺序
    ///    隐含的服务间依赖；
    /// 2. 物化尚未解析的单例工厂并缓存产物，这批服务的引导
    ///    钩子并发执行，任一失败即中止整批等待。
    ///
    /// 引导期间 `initializing` 置位，工厂注册会被拒绝。
    /// 无论钩子成败，返回前都会复位该标志；失败不回滚已完成
    /// 的部分，错误原样传给调用方。
    pub async fn initialize_services(&self) -> IocResult<()> {
        if self.initializing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(namespace = %self.namespace, "开始引导容器服务");

        let result = self.bootstrap_phases().await;
        self.initializing.store(false, Ordering::SeqCst);
        if result.is_ok() {
            self.initialized.store(true, Ordering::SeqCst);
            info!(namespace = %self.namespace, "容器服务引导完成");
        }
        result
    }

    async fn bootstrap_phases(&self) -> IocResult<()> {
        // 阶段一：串行引导已物化的服务
        for (token, hooks) in self.registry.materialized_hooks_in_order() {
            info!(namespace = %self.namespace, "引导服务: {token}");
            hooks
                .on_application_bootstrap()
                .await
                .map_err(|source| LifecycleError::BootstrapHookFailed { token, source })?;
        }

        // 阶段二：物化单例工厂，钩子并发引导
        let mut pending: Vec<(ProviderToken, Arc<dyn Lifecycle>)> = Vec::new();
        for (token, factory) in self.registry.pending_singleton_factories() {
            // 前面的工厂可能已重入容器物化了本 token，跳过以免重复构造
            if self.registry.service(&token).is_some() {
                continue;
            }
            let instance = factory(self)?;
            self.registry.cache_service(token.clone(), instance.clone());
            if let Some(hooks) = instance.lifecycle() {
                info!(namespace = %self.namespace, "引导工厂服务: {token}");
                pending.push((token, hooks));
            }
        }
        try_join_all(pending.into_iter().map(|(token, hooks)| async move {
            hooks
                .on_application_bootstrap()
                .await
                .map_err(|source| LifecycleError::BootstrapHookFailed { token, source })
        }))
        .await?;

        Ok(())
    }

    /// 关闭全部已物化的服务
    ///
    /// 所有关闭钩子并发执行并收到同一个信号名，彼此之间没有
    /// 顺序约束；任一失败即中止整批等待。无论钩子成败，
    /// 值缓存和全部作用域随后都被清空；工厂与生命周期声明保留，
    /// 容器可以再次引导。
    pub async fn shutdown_services(&self, signal: &str) -> IocResult<()> {
        info!(namespace = %self.namespace, "开始关闭容器服务, 信号: {signal}");

        let result = try_join_all(
            self.registry
                .materialized_hooks_in_order()
                .into_iter()
                .map(|(token, hooks)| {
                    info!(namespace = %self.namespace, "关闭服务: {token}");
                    async move {
                        hooks
                            .on_application_shutdown(signal)
                            .await
                            .map_err(|source| LifecycleError::ShutdownHookFailed { token, source })
                    }
                }),
        )
        .await;

        self.registry.clear_services();
        self.scopes.clear_all();
        self.initialized.store(false, Ordering::SeqCst);

        result?;
        Ok(())
    }
}

/// 匿名工厂的解析句柄
///
/// 由 [`Container::memoized_factory`] 返回，持有铸造出的 token。
pub struct FactoryHandle<'a, T> {
    container: &'a Container,
    token: ProviderToken,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> FactoryHandle<'_, T> {
    /// 按声明的生命周期解析工厂产物
    pub fn call(&self) -> IocResult<Arc<T>> {
        self.container.resolve(self.token.clone())
    }

    /// 句柄绑定的 token
    #[must_use]
    pub fn token(&self) -> &ProviderToken {
        &self.token
    }
}

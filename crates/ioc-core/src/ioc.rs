//! 命名空间容器目录

use crate::container::Container;
use crate::provider::Provider;
use dashmap::DashMap;
use ioc_common::{IocError, IocResult, ProviderToken};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::info;

/// 默认命名空间名称
pub const DEFAULT_NAMESPACE: &str = "default";

/// 进程级容器目录实例
static GLOBAL_IOC: Lazy<Ioc> = Lazy::new(Ioc::new);

/// 命名空间容器目录
///
/// 将命名空间名称映射到容器实例。目录本身是普通对象，
/// 测试可以各自持有独立目录以保持隔离；[`Ioc::global`]
/// 提供进程级共享实例。条目在容器创建时加入，
/// 进程存续期间不会自动移除。
#[derive(Default)]
pub struct Ioc {
    namespaces: DashMap<String, Arc<Container>>,
}

impl Ioc {
    /// 创建空目录
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 进程级共享目录
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_IOC
    }

    /// 创建并登记命名空间容器
    ///
    /// 同名容器会被静默覆盖。
    pub fn create(&self, name: impl Into<String>) -> Arc<Container> {
        let container = Arc::new(Container::new(name));
        self.set(container.clone());
        container
    }

    /// 登记已有容器，键为容器自身的命名空间
    pub fn set(&self, container: Arc<Container>) {
        info!("登记命名空间容器: {}", container.namespace());
        self.namespaces
            .insert(container.namespace().to_string(), container);
    }

    /// 查找命名空间容器
    #[must_use]
    pub fn ns(&self, name: &str) -> Option<Arc<Container>> {
        self.namespaces.get(name).map(|entry| entry.clone())
    }

    /// 命名空间是否存在
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    /// 向指定命名空间的容器转发注册请求
    ///
    /// 命名空间必须先通过 [`Ioc::create`] 建立，否则返回错误。
    pub fn register(&self, provider: Provider, namespace: &str) -> IocResult<ProviderToken> {
        self.lookup(namespace)?.register(provider)
    }

    /// 在指定命名空间的容器内解析服务
    pub fn inject<T: Send + Sync + 'static>(
        &self,
        token: impl Into<ProviderToken>,
        namespace: &str,
    ) -> IocResult<Arc<T>> {
        self.lookup(namespace)?.inject(token, None)
    }

    fn lookup(&self, namespace: &str) -> IocResult<Arc<Container>> {
        self.ns(namespace).ok_or_else(|| IocError::NamespaceNotFound {
            name: namespace.to_string(),
        })
    }
}

//! 服务注册表
//!
//! 维护 token 到值、工厂、生命周期三张并行映射，
//! 以及 token 的首次注册顺序。

use crate::provider::FactoryFn;
use ioc_common::{Lifecycle, Lifetime, ProviderToken, ServiceInstance};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// 服务注册表
///
/// 单例 token 首次解析后从「仅工厂」迁移为「工厂 + 缓存值」，
/// 之后不会回退；关闭时只清空值缓存，工厂与生命周期声明保留。
/// `order` 记录首次注册顺序，生命周期编排按该顺序遍历。
#[derive(Default)]
pub(crate) struct ServiceRegistry {
    services: RwLock<HashMap<ProviderToken, ServiceInstance>>,
    factories: RwLock<HashMap<ProviderToken, FactoryFn>>,
    lifetimes: RwLock<HashMap<ProviderToken, Lifetime>>,
    order: RwLock<Vec<ProviderToken>>,
}

impl ServiceRegistry {
    /// 登记生命周期声明，首次出现的 token 追加到顺序表
    fn record(&self, token: &ProviderToken, lifetime: Lifetime) {
        let mut lifetimes = self.lifetimes.write();
        if lifetimes.insert(token.clone(), lifetime).is_none() {
            self.order.write().push(token.clone());
        }
    }

    /// 以现成实例注册，覆盖同 token 的既有注册
    pub(crate) fn insert_value(
        &self,
        token: ProviderToken,
        instance: ServiceInstance,
        lifetime: Lifetime,
    ) {
        self.record(&token, lifetime);
        self.services.write().insert(token, instance);
    }

    /// 以工厂注册，覆盖同 token 的既有工厂
    pub(crate) fn insert_factory(
        &self,
        token: ProviderToken,
        factory: FactoryFn,
        lifetime: Lifetime,
    ) {
        self.record(&token, lifetime);
        self.factories.write().insert(token, factory);
    }

    /// 缓存单例工厂的产物，不改变生命周期声明
    pub(crate) fn cache_service(&self, token: ProviderToken, instance: ServiceInstance) {
        self.services.write().insert(token, instance);
    }

    pub(crate) fn lifetime_of(&self, token: &ProviderToken) -> Option<Lifetime> {
        self.lifetimes.read().get(token).copied()
    }

    pub(crate) fn service(&self, token: &ProviderToken) -> Option<ServiceInstance> {
        self.services.read().get(token).cloned()
    }

    pub(crate) fn factory(&self, token: &ProviderToken) -> Option<FactoryFn> {
        self.factories.read().get(token).cloned()
    }

    /// 按注册顺序列出已物化且声明了生命周期能力的服务
    pub(crate) fn materialized_hooks_in_order(
        &self,
    ) -> Vec<(ProviderToken, Arc<dyn Lifecycle>)> {
        let services = self.services.read();
        self.order
            .read()
            .iter()
            .filter_map(|token| {
                services
                    .get(token)
                    .and_then(ServiceInstance::lifecycle)
                    .map(|hooks| (token.clone(), hooks))
            })
            .collect()
    }

    /// 按注册顺序列出尚未物化的单例工厂
    pub(crate) fn pending_singleton_factories(&self) -> Vec<(ProviderToken, FactoryFn)> {
        let services = self.services.read();
        let factories = self.factories.read();
        let lifetimes = self.lifetimes.read();
        self.order
            .read()
            .iter()
            .filter(|token| {
                lifetimes.get(*token) == Some(&Lifetime::Singleton)
                    && !services.contains_key(*token)
            })
            .filter_map(|token| factories.get(token).map(|f| (token.clone(), f.clone())))
            .collect()
    }

    /// 清空值缓存，保留工厂与生命周期声明
    pub(crate) fn clear_services(&self) {
        self.services.write().clear();
    }
}

//! 作用域管理
//!
//! 每个作用域持有独立的实例表，按字符串 ID 寻址。
//! 作用域销毁只是释放实例，不触发任何生命周期钩子。

use dashmap::DashMap;
use ioc_common::ProviderToken;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 单个作用域
struct Scope {
    created_at: chrono::DateTime<chrono::Utc>,
    instances: HashMap<ProviderToken, Arc<dyn Any + Send + Sync>>,
}

impl Scope {
    fn new() -> Self {
        Self {
            created_at: chrono::Utc::now(),
            instances: HashMap::new(),
        }
    }
}

/// 作用域管理器
///
/// 作用域之间完全隔离，两个作用域永不共享条目。
#[derive(Default)]
pub(crate) struct ScopeManager {
    scopes: DashMap<String, Scope>,
}

impl ScopeManager {
    /// 创建作用域，未指定 ID 时铸造一个
    ///
    /// 对已存在的 ID 重复创建会以空表替换原作用域，
    /// 原有实例随之释放，这是单向操作。
    pub(crate) fn create(&self, scope_id: Option<&str>) -> String {
        let id = scope_id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        self.scopes.insert(id.clone(), Scope::new());
        id
    }

    /// 确保作用域存在，已存在时保留原实例
    pub(crate) fn ensure(&self, scope_id: &str) {
        self.scopes
            .entry(scope_id.to_string())
            .or_insert_with(Scope::new);
    }

    /// 移除作用域，不存在时静默返回
    pub(crate) fn clear(&self, scope_id: &str) {
        if let Some((_, scope)) = self.scopes.remove(scope_id) {
            let age_ms = (chrono::Utc::now() - scope.created_at).num_milliseconds();
            debug!("清理作用域: {scope_id}, 存活 {age_ms}ms");
        }
    }

    /// 移除全部作用域
    pub(crate) fn clear_all(&self) {
        self.scopes.clear();
    }

    pub(crate) fn has(&self, scope_id: &str) -> bool {
        self.scopes.contains_key(scope_id)
    }

    /// 读取作用域内已有的实例
    pub(crate) fn get_instance(
        &self,
        scope_id: &str,
        token: &ProviderToken,
    ) -> Option<Arc<dyn Any + Send + Sync>> {
        self.scopes
            .get(scope_id)
            .and_then(|scope| scope.instances.get(token).cloned())
    }

    /// 写入作用域实例，后写者胜出
    pub(crate) fn insert_instance(
        &self,
        scope_id: &str,
        token: ProviderToken,
        value: Arc<dyn Any + Send + Sync>,
    ) {
        self.scopes
            .entry(scope_id.to_string())
            .or_insert_with(Scope::new)
            .instances
            .insert(token, value);
    }

    /// 作用域实例表快照，作用域不存在时先创建
    pub(crate) fn snapshot(
        &self,
        scope_id: &str,
    ) -> HashMap<ProviderToken, Arc<dyn Any + Send + Sync>> {
        self.ensure(scope_id);
        self.scopes
            .get(scope_id)
            .map(|scope| scope.instances.clone())
            .unwrap_or_default()
    }
}

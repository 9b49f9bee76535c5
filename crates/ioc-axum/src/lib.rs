//! # IoC Axum
//!
//! 将 Fodax 容器接入 axum 的中间件管线：每个入站请求创建
//! 一个作用域，请求结束后销毁，作用域服务因此天然按请求隔离。
//!
//! 中间件通过 `axum::middleware::from_fn_with_state` 挂载，
//! 状态为 `Arc<Container>`；下游处理器用 `Extension<IocContext>`
//! 取得绑定了当前作用域的解析入口。

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use ioc_core::{Container, IocResult, ProviderToken};
use std::sync::Arc;
use tracing::debug;

/// 携带请求 ID 的请求头字段名
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 注入到请求扩展中的容器上下文
///
/// 持有容器和当前请求的作用域 ID，
/// [`IocContext::use_service`] 在该作用域内解析服务。
#[derive(Clone)]
pub struct IocContext {
    container: Arc<Container>,
    scope_id: String,
}

impl IocContext {
    /// 所属容器
    #[must_use]
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// 当前请求的作用域 ID
    #[must_use]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// 在当前请求作用域内解析服务
    pub fn use_service<T: Send + Sync + 'static>(
        &self,
        token: impl Into<ProviderToken>,
    ) -> IocResult<Arc<T>> {
        self.container.inject(token, Some(&self.scope_id))
    }
}

/// 为每个请求创建容器作用域的中间件
///
/// 作用域 ID 取自 `x-request-id` 请求头，缺失时铸造一个 UUID。
/// 作用域在下游处理链完整结束后才被清理，下游返回错误响应时
/// 同样如此。
pub async fn context_ioc(
    State(container): State<Arc<Container>>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string);

    let scope_id = container.create_scope(Some(&request_id));
    debug!(namespace = %container.namespace(), "请求作用域: {scope_id}");

    request.extensions_mut().insert(IocContext {
        container: container.clone(),
        scope_id: scope_id.clone(),
    });

    let response = next.run(request).await;

    container.clear_scope(&scope_id);
    response
}

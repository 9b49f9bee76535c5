//! 错误类型定义

use crate::token::ProviderToken;
use thiserror::Error;

/// 钩子返回的错误类型
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// 注册配置错误类型
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Provider '{token}' 未指定任何生产方式 (use_value / use_factory / use_class)")]
    MissingProductionMode { token: ProviderToken },

    #[error("Provider '{token}' 同时指定了 {count} 种生产方式，只允许一种")]
    MultipleProductionModes { token: ProviderToken, count: usize },

    #[error("Provider token 不能为空字符串")]
    EmptyToken,

    #[error("服务 '{token}' 的 SCOPED 生命周期不支持固定值注册，请改用工厂")]
    ScopedValueNotSupported { token: ProviderToken },
}

/// 生命周期错误类型
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("容器初始化期间不能注册服务: {token}")]
    RegistrationDuringBootstrap { token: ProviderToken },

    #[error("服务 '{token}' 引导钩子执行失败: {source}")]
    BootstrapHookFailed {
        token: ProviderToken,
        source: HookError,
    },

    #[error("服务 '{token}' 关闭钩子执行失败: {source}")]
    ShutdownHookFailed {
        token: ProviderToken,
        source: HookError,
    },
}

/// 解析错误类型
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("服务 '{token}' 需要作用域，请改用 resolve_scoped(token, scope_id)")]
    ScopeRequired { token: ProviderToken },

    #[error("服务 '{token}' 类型转换失败，期望类型: {expected}")]
    TypeMismatch {
        token: ProviderToken,
        expected: &'static str,
    },
}

/// 服务未注册错误类型
///
/// 两个变体属于同一错误类别，仅诊断文案不同：
/// 容器尚未引导时的缺失和引导后真正未知的 token。
#[derive(Error, Debug)]
pub enum NotRegisteredError {
    #[error("服务 '{token}' 未注册，容器尚未初始化")]
    ContainerNotInitialized { token: ProviderToken },

    #[error("服务 '{token}' 未在容器中找到")]
    UnknownToken { token: ProviderToken },
}

/// 容器统一错误类型
#[derive(Error, Debug)]
pub enum IocError {
    #[error("配置错误: {source}")]
    Configuration {
        #[from]
        source: ConfigurationError,
    },

    #[error("生命周期错误: {source}")]
    Lifecycle {
        #[from]
        source: LifecycleError,
    },

    #[error("解析错误: {source}")]
    Resolution {
        #[from]
        source: ResolutionError,
    },

    #[error("服务未注册: {source}")]
    NotRegistered {
        #[from]
        source: NotRegisteredError,
    },

    #[error("命名空间 '{name}' 不存在，请先调用 create")]
    NamespaceNotFound { name: String },
}

/// 结果类型别名
pub type IocResult<T> = Result<T, IocError>;

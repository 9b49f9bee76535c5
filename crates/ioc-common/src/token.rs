//! 服务标识符定义

use std::any::TypeId;
use std::fmt;
use uuid::Uuid;

/// 注册服务的标识符
///
/// 三种形态对应三种注册习惯：字符串名称按内容比较，
/// 自动铸造的唯一标识和类型标识按身份比较。
/// 类型标识使「类型本身即 token」的写法成为可能，
/// 例如 `ProviderToken::of::<UserService>()`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderToken {
    /// 字符串名称
    Name(String),
    /// 自动铸造的唯一标识
    Unique(Uuid),
    /// 类型标识
    Type {
        /// 类型 ID
        id: TypeId,
        /// 类型名称，仅用于诊断输出
        name: &'static str,
    },
}

impl ProviderToken {
    /// 以类型作为 token
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 铸造一个全新的唯一 token
    #[must_use]
    pub fn unique() -> Self {
        Self::Unique(Uuid::new_v4())
    }

    /// 名称形态的 token 是否为空字符串
    #[must_use]
    pub fn is_empty_name(&self) -> bool {
        matches!(self, Self::Name(name) if name.is_empty())
    }
}

impl fmt::Display for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Unique(id) => write!(f, "unique:{id}"),
            Self::Type { name, .. } => f.write_str(name),
        }
    }
}

impl From<&str> for ProviderToken {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ProviderToken {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

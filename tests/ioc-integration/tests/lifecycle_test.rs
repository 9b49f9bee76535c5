//! 生命周期编排（引导/关闭）的集中集成测试

use async_trait::async_trait;
use ioc_common::HookError;
use ioc_core::{
    Container, IocError, Lifecycle, LifecycleError, Lifetime, ServiceInstance,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 记录钩子调用情况的共享探针
#[derive(Debug, Default)]
struct HookRecorder {
    bootstrap_calls: AtomicUsize,
    shutdown_signal: Mutex<Option<String>>,
}

#[derive(Debug)]
struct FakeService {
    recorder: Arc<HookRecorder>,
}

#[async_trait]
impl Lifecycle for FakeService {
    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        self.recorder.bootstrap_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn on_application_shutdown(&self, signal: &str) -> Result<(), HookError> {
        *self.recorder.shutdown_signal.lock().unwrap() = Some(signal.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn hooks_run_once_and_receive_the_signal() {
    let container = Container::new("lifecycle-test");
    let recorder = Arc::new(HookRecorder::default());
    container
        .register_service(
            "fake",
            FakeService {
                recorder: recorder.clone(),
            },
            Lifetime::Singleton,
        )
        .unwrap();

    container.initialize_services().await.unwrap();
    assert_eq!(recorder.bootstrap_calls.load(Ordering::SeqCst), 1);
    assert!(recorder.shutdown_signal.lock().unwrap().is_none());

    container.shutdown_services("SIGINT").await.unwrap();
    assert_eq!(recorder.bootstrap_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        recorder.shutdown_signal.lock().unwrap().as_deref(),
        Some("SIGINT")
    );

    // 关闭后值缓存被清空，纯值注册的单例不再可解析
    let err = container.resolve::<FakeService>("fake").unwrap_err();
    assert!(matches!(err, IocError::NotRegistered { .. }));
}

/// 按名字记录引导顺序的钩子
struct OrderedHook {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

#[async_trait]
impl Lifecycle for OrderedHook {
    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        self.log.lock().unwrap().push(self.name);
        Ok(())
    }
}

#[tokio::test]
async fn phase_one_runs_sequentially_before_factory_hooks() {
    let container = Container::new("order-test");
    let log = Arc::new(Mutex::new(Vec::new()));

    container
        .register_service(
            "first",
            OrderedHook {
                name: "first",
                log: log.clone(),
            },
            Lifetime::Singleton,
        )
        .unwrap();
    container
        .register_service(
            "second",
            OrderedHook {
                name: "second",
                log: log.clone(),
            },
            Lifetime::Singleton,
        )
        .unwrap();

    let factory_log = log.clone();
    container
        .register_factory(
            "third",
            move |_| {
                Ok(ServiceInstance::with_lifecycle(OrderedHook {
                    name: "third",
                    log: factory_log.clone(),
                }))
            },
            Lifetime::Singleton,
        )
        .unwrap();

    container.initialize_services().await.unwrap();

    // 阶段一按注册顺序串行，阶段二的工厂钩子只在其后启动
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn factory_singletons_are_materialized_during_bootstrap() {
    let container = Container::new("materialize-test");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    container
        .register_factory(
            "eager",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ServiceInstance::new("ready".to_string()))
            },
            Lifetime::Singleton,
        )
        .unwrap();

    container.initialize_services().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // 引导已物化，解析不再调用工厂
    assert_eq!(*container.resolve::<String>("eager").unwrap(), "ready");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// 引导期间尝试注册工厂的服务
struct LateRegistrar {
    container: Arc<Container>,
    rejected: Arc<AtomicBool>,
}

#[async_trait]
impl Lifecycle for LateRegistrar {
    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        let result = self.container.register_factory(
            "late",
            |_| Ok(ServiceInstance::new(0u32)),
            Lifetime::Singleton,
        );
        if matches!(
            result,
            Err(IocError::Lifecycle {
                source: LifecycleError::RegistrationDuringBootstrap { .. }
            })
        ) {
            self.rejected.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[tokio::test]
async fn factory_registration_is_rejected_during_bootstrap() {
    let container = Arc::new(Container::new("guard-test"));
    let rejected = Arc::new(AtomicBool::new(false));
    container
        .register_service(
            "late-registrar",
            LateRegistrar {
                container: container.clone(),
                rejected: rejected.clone(),
            },
            Lifetime::Singleton,
        )
        .unwrap();

    container.initialize_services().await.unwrap();
    assert!(rejected.load(Ordering::SeqCst));

    // 引导结束后注册恢复正常
    container
        .register_factory("late", |_| Ok(ServiceInstance::new(0u32)), Lifetime::Singleton)
        .unwrap();
}

/// 引导必定失败的服务
struct FailingHook;

#[async_trait]
impl Lifecycle for FailingHook {
    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        Err(anyhow::anyhow!("连接目标不可达").into())
    }
}

#[tokio::test]
async fn bootstrap_failure_propagates_and_resets_the_guard() {
    let container = Container::new("fail-test");
    container
        .register_service("boom", FailingHook, Lifetime::Singleton)
        .unwrap();

    let err = container.initialize_services().await.unwrap_err();
    assert!(matches!(
        err,
        IocError::Lifecycle {
            source: LifecycleError::BootstrapHookFailed { .. }
        }
    ));

    // 失败不回滚，但 initializing 标志复位，后续注册不被阻塞
    container
        .register_factory("after", |_| Ok(ServiceInstance::new(1u32)), Lifetime::Singleton)
        .unwrap();
}

#[tokio::test]
async fn reentrant_factory_materializes_each_singleton_once() {
    let container = Container::new("reentry-test");
    let calls = Arc::new(AtomicUsize::new(0));

    // "a" 的工厂重入容器解析 "b"，引导按注册顺序先到 "a"
    container
        .register_factory(
            "a",
            |c: &Container| {
                let b = c.resolve::<String>("b")?;
                Ok(ServiceInstance::new(format!("a+{b}")))
            },
            Lifetime::Singleton,
        )
        .unwrap();
    let counter = calls.clone();
    container
        .register_factory(
            "b",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ServiceInstance::new("b".to_string()))
            },
            Lifetime::Singleton,
        )
        .unwrap();

    container.initialize_services().await.unwrap();

    // "b" 在 "a" 的工厂调用中已物化，引导不会再次构造它
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*container.resolve::<String>("a").unwrap(), "a+b");
    assert_eq!(*container.resolve::<String>("b").unwrap(), "b");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn shutdown_clears_scopes_and_keeps_factories() {
    let container = Container::new("shutdown-test");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    container
        .register_factory(
            "singleton",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ServiceInstance::new("again".to_string()))
            },
            Lifetime::Singleton,
        )
        .unwrap();
    container
        .register_factory(
            "scoped",
            |_| Ok(ServiceInstance::new(7u32)),
            Lifetime::Scoped,
        )
        .unwrap();

    container.initialize_services().await.unwrap();
    container.resolve_scoped::<u32>("scoped", "sc1").unwrap();
    assert!(container.has_scope("sc1"));

    container.shutdown_services("SIGTERM").await.unwrap();
    assert!(!container.has_scope("sc1"));

    // 工厂保留，再次解析会重新构造
    assert_eq!(*container.resolve::<String>("singleton").unwrap(), "again");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

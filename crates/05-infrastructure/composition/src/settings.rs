//! 上下文配置加载
//!
//! 配置来源按优先级从低到高：默认值、配置文件（按扩展名识别 TOML / JSON / YAML）、
//! `IOC_` 前缀的环境变量，嵌套字段以 `__` 分隔，例如 `IOC_CONTAINER__ENABLE_AOP=false`。

use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use di_abstractions::ContainerConfig;
use infrastructure_common::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 应用上下文配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSettings {
    /// 扫描的根命名空间，空字符串表示全部
    pub root_namespace: String,
    /// 容器配置
    pub container: ContainerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl ContextSettings {
    /// 环境变量前缀
    pub const ENV_PREFIX: &'static str = "IOC";

    /// 从可选的配置文件和环境变量加载
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        Self::load_with(path, Self::environment())
    }

    /// 只从环境变量加载
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::load(None)
    }

    /// 默认的环境变量来源
    pub fn environment() -> Environment {
        Environment::with_prefix(Self::ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// 以指定的环境变量来源加载
    pub fn load_with(path: Option<&Path>, environment: Environment) -> Result<Self, ConfigurationError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!("加载配置文件: {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(environment)
            .build()
            .and_then(Config::try_deserialize::<ContextSettings>)
            .map_err(|e| {
                error!("配置加载失败: {}", e);
                ConfigurationError::settings(e.to_string())
            })?;

        settings.logging.level_filter()?;
        debug!(
            "上下文配置: root_namespace = '{}', enable_aop = {}, eager_init = {}",
            settings.root_namespace, settings.container.enable_aop, settings.container.eager_init
        );
        Ok(settings)
    }

    /// 设置根命名空间
    pub fn with_root_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.root_namespace = namespace.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::ConcreteProxyPolicy;
    use std::collections::HashMap;
    use std::io::Write;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ContextSettings::environment().source(Some(source))
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = ContextSettings::load_with(None, environment(&[])).expect("load");

        assert_eq!(settings.root_namespace, "");
        assert!(settings.container.enable_aop);
        assert_eq!(settings.container.concrete_proxy_policy, ConcreteProxyPolicy::Reject);
        assert_eq!(settings.logging, LoggingConfig::default());
    }

    #[test]
    fn test_toml_file_with_env_override() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            r#"
root_namespace = "demo"

[container]
eager_init = false
concrete_proxy_policy = "pass_through"

[logging]
level = "debug"
json_format = true
"#
        )
        .expect("write");

        let settings = ContextSettings::load_with(
            Some(file.path()),
            environment(&[
                ("IOC_ROOT_NAMESPACE", "demo.service"),
                ("IOC_CONTAINER__ENABLE_AOP", "false"),
            ]),
        )
        .expect("load");

        assert_eq!(settings.root_namespace, "demo.service");
        assert!(!settings.container.enable_aop);
        assert!(!settings.container.eager_init);
        assert_eq!(settings.container.concrete_proxy_policy, ConcreteProxyPolicy::PassThrough);
        assert_eq!(settings.container.max_creation_depth, 64);
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json_format);
    }

    #[test]
    fn test_json_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .expect("temp file");
        write!(file, r#"{{"root_namespace": "shop", "container": {{"max_creation_depth": 8}}}}"#)
            .expect("write");

        let settings = ContextSettings::load_with(Some(file.path()), environment(&[])).expect("load");
        assert_eq!(settings.root_namespace, "shop");
        assert_eq!(settings.container.max_creation_depth, 8);
    }

    #[test]
    fn test_invalid_sources() {
        let missing = ContextSettings::load_with(
            Some(Path::new("/nonexistent/ioc-settings.toml")),
            environment(&[]),
        );
        assert!(matches!(missing, Err(ConfigurationError::Settings { .. })));

        let bad_level = ContextSettings::load_with(None, environment(&[("IOC_LOGGING__LEVEL", "loud")]));
        assert!(matches!(bad_level, Err(ConfigurationError::Settings { .. })));
    }
}

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{AppError, ConfigError};

/// 默认配置文件名（存在时自动加载）
pub const DEFAULT_CONFIG_FILE: &str = "robot_order.toml";

/// 程序配置
///
/// 加载顺序：内置默认值 → TOML 配置文件 → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 下单页面 URL
    pub target_url: String,
    /// 订单 CSV 下载地址
    pub orders_url: String,
    /// 订单 CSV 本地保存路径
    pub orders_file: String,
    /// 回执与截图输出目录
    pub output_dir: String,
    /// 最终压缩包路径
    pub archive_path: String,
    /// true: 启动新浏览器；false: 连接已打开的浏览器
    pub headless: bool,
    /// 浏览器调试端口（仅 headless = false 时使用）
    pub browser_debug_port: u16,
    /// 浏览器可执行文件路径，未设置时自动查找
    pub chrome_executable: Option<String>,
    /// 每次页面操作后的停顿（毫秒）
    pub slow_mo_ms: u64,
    /// 填完表单到首次提交之间的等待（毫秒）
    pub settle_delay_ms: u64,
    /// 等待元素出现的最长时间（毫秒）
    pub element_timeout_ms: u64,
    /// 单个订单最多提交次数，None 表示不限
    pub max_submit_attempts: Option<usize>,
    /// 运行前是否清空输出目录
    pub clean_output: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: "https://robotsparebinindustries.com/#/robot-order".to_string(),
            orders_url: "https://robotsparebinindustries.com/orders.csv".to_string(),
            orders_file: "orders.csv".to_string(),
            output_dir: "output".to_string(),
            archive_path: "merged.zip".to_string(),
            headless: true,
            browser_debug_port: 9222,
            chrome_executable: None,
            slow_mo_ms: 50,
            settle_delay_ms: 1000,
            element_timeout_ms: 10_000,
            max_submit_attempts: None,
            clean_output: true,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    pub fn load() -> Result<Self> {
        let path = match std::env::var("CONFIG_FILE") {
            Ok(p) => Some(PathBuf::from(p)),
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        let base = match path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };

        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| {
            AppError::Config(ConfigError::FileParseFailed {
                path: origin.to_string(),
                source,
            })
            .into()
        })
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 通常是 `std::env::var`，测试时可以传入固定的表
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("TARGET_URL") {
            self.target_url = v;
        }
        if let Some(v) = lookup("ORDERS_URL") {
            self.orders_url = v;
        }
        if let Some(v) = lookup("ORDERS_FILE") {
            self.orders_file = v;
        }
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.output_dir = v;
        }
        if let Some(v) = lookup("ARCHIVE_PATH") {
            self.archive_path = v;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        parse_into(&lookup, "HEADLESS", "bool", &mut self.headless)?;
        parse_into(&lookup, "BROWSER_DEBUG_PORT", "u16", &mut self.browser_debug_port)?;
        parse_into(&lookup, "SLOW_MO_MS", "u64", &mut self.slow_mo_ms)?;
        parse_into(&lookup, "SETTLE_DELAY_MS", "u64", &mut self.settle_delay_ms)?;
        parse_into(&lookup, "ELEMENT_TIMEOUT_MS", "u64", &mut self.element_timeout_ms)?;
        parse_into(&lookup, "CLEAN_OUTPUT", "bool", &mut self.clean_output)?;
        parse_into(&lookup, "VERBOSE_LOGGING", "bool", &mut self.verbose_logging)?;

        // 0 表示不限次数
        let mut max_attempts = self.max_submit_attempts.unwrap_or(0);
        parse_into(&lookup, "MAX_SUBMIT_ATTEMPTS", "usize", &mut max_attempts)?;
        self.max_submit_attempts = (max_attempts > 0).then_some(max_attempts);

        Ok(self)
    }

    pub fn slow_mo(&self) -> Duration {
        Duration::from_millis(self.slow_mo_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }
}

fn parse_into<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
    slot: &mut T,
) -> Result<()> {
    if let Some(raw) = lookup(var_name) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| AppError::env_parse_failed(var_name, raw.as_str(), expected_type))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_keep_retry_unbounded() {
        let config = Config::default();
        assert_eq!(config.max_submit_attempts, None);
        assert_eq!(config.output_dir, "output");
        assert_eq!(config.archive_path, "merged.zip");
        assert_eq!(config.settle_delay(), Duration::from_secs(1));
    }

    #[test]
    fn env_overrides_replace_values() {
        let config = Config::default()
            .with_env_overrides(env(&[
                ("OUTPUT_DIR", "receipts"),
                ("HEADLESS", "false"),
                ("BROWSER_DEBUG_PORT", "2001"),
                ("MAX_SUBMIT_ATTEMPTS", "7"),
            ]))
            .unwrap();

        assert_eq!(config.output_dir, "receipts");
        assert!(!config.headless);
        assert_eq!(config.browser_debug_port, 2001);
        assert_eq!(config.max_submit_attempts, Some(7));
    }

    #[test]
    fn zero_attempts_means_unbounded() {
        let config = Config::default()
            .with_env_overrides(env(&[("MAX_SUBMIT_ATTEMPTS", "0")]))
            .unwrap();
        assert_eq!(config.max_submit_attempts, None);
    }

    #[test]
    fn invalid_env_value_is_rejected() {
        let err = Config::default()
            .with_env_overrides(env(&[("SLOW_MO_MS", "fast")]))
            .unwrap_err();

        match err.downcast_ref::<AppError>() {
            Some(AppError::Config(ConfigError::EnvVarParseFailed { var_name, .. })) => {
                assert_eq!(var_name, "SLOW_MO_MS");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = Config::from_toml_str(
            "output_dir = \"out\"\nmax_submit_attempts = 3\n",
            "inline",
        )
        .unwrap();

        assert_eq!(config.output_dir, "out");
        assert_eq!(config.max_submit_attempts, Some(3));
        assert_eq!(config.orders_file, "orders.csv");
    }

    #[test]
    fn broken_toml_reports_path() {
        let err = Config::from_toml_str("output_dir = [", "robot_order.toml").unwrap_err();
        assert!(err.to_string().contains("robot_order.toml"));
    }
}

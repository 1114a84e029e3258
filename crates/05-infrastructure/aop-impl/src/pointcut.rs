//! 切点表达式
//!
//! 支持两种形式：
//!
//! - `execution([修饰符] 返回类型 类型路径.操作(参数))`：修饰符（若不是 `*`）
//!   须出现在签名文本中；路径的最后一段是操作名模式，类型路径与参数不参与匹配。
//! - `类型模式.操作模式`，如 `*Service.*`：类型模式不含 `.` 时与声明类型的简单名称匹配，
//!   否则与点分全名匹配。
//!
//! 模式中的 `*` 匹配任意字符序列，表达式在构造时编译一次。

use infrastructure_common::{ConfigurationError, OperationSignature};
use regex::Regex;
use std::fmt;

const EXECUTION: &str = "execution";

#[derive(Debug, Clone)]
enum TypePattern {
    /// 与类型简单名称匹配
    Simple(Regex),
    /// 与点分全名匹配
    Qualified(Regex),
}

impl TypePattern {
    fn matches(&self, signature: &OperationSignature) -> bool {
        match self {
            Self::Simple(pattern) => pattern.is_match(signature.declaring_type_simple_name()),
            Self::Qualified(pattern) => pattern.is_match(&signature.declaring_type),
        }
    }
}

/// 编译后的切点
#[derive(Debug, Clone)]
pub struct Pointcut {
    expression: String,
    modifier: Option<String>,
    type_pattern: Option<TypePattern>,
    operation_pattern: Regex,
}

impl Pointcut {
    /// 解析并编译切点表达式
    pub fn parse(expression: &str) -> Result<Self, ConfigurationError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(ConfigurationError::invalid_pointcut(expression, "表达式为空"));
        }

        match trimmed.strip_prefix(EXECUTION) {
            Some(rest) => Self::parse_execution(expression, rest),
            None => Self::parse_bare(expression, trimmed),
        }
    }

    fn parse_execution(expression: &str, rest: &str) -> Result<Self, ConfigurationError> {
        let inner = rest
            .trim()
            .strip_prefix('(')
            .and_then(|body| body.strip_suffix(')'))
            .ok_or_else(|| {
                ConfigurationError::invalid_pointcut(expression, "execution 表达式缺少外层括号")
            })?;

        let head = strip_argument_spec(expression, inner)?;
        let tokens: Vec<&str> = head.split_whitespace().collect();
        let path = tokens
            .last()
            .ok_or_else(|| ConfigurationError::invalid_pointcut(expression, "缺少操作模式"))?;

        let modifier = match tokens.as_slice() {
            [first, _, ..] if *first != "*" => Some((*first).to_string()),
            _ => None,
        };
        let operation = path.rsplit('.').next().unwrap_or(path);

        Ok(Self {
            expression: expression.to_string(),
            modifier,
            type_pattern: None,
            operation_pattern: compile_glob(expression, operation)?,
        })
    }

    fn parse_bare(expression: &str, trimmed: &str) -> Result<Self, ConfigurationError> {
        let path = strip_argument_spec(expression, trimmed)?.trim();
        if path.is_empty() || path.contains(char::is_whitespace) {
            return Err(ConfigurationError::invalid_pointcut(
                expression,
                "应为 `类型模式.操作模式` 形式",
            ));
        }

        let (type_pattern, operation) = match path.rsplit_once('.') {
            Some((type_glob, operation)) if type_glob.contains('.') => (
                Some(TypePattern::Qualified(compile_glob(expression, type_glob)?)),
                operation,
            ),
            Some((type_glob, operation)) => (
                Some(TypePattern::Simple(compile_glob(expression, type_glob)?)),
                operation,
            ),
            None => (None, path),
        };

        Ok(Self {
            expression: expression.to_string(),
            modifier: None,
            type_pattern,
            operation_pattern: compile_glob(expression, operation)?,
        })
    }

    /// 签名是否匹配
    pub fn matches(&self, signature: &OperationSignature) -> bool {
        if let Some(modifier) = &self.modifier {
            if !signature.to_string().contains(modifier.as_str()) {
                return false;
            }
        }
        if let Some(type_pattern) = &self.type_pattern {
            if !type_pattern.matches(signature) {
                return false;
            }
        }
        self.operation_pattern.is_match(&signature.name)
    }

    /// 原始表达式
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// 一次性匹配
pub fn matches(expression: &str, signature: &OperationSignature) -> Result<bool, ConfigurationError> {
    Ok(Pointcut::parse(expression)?.matches(signature))
}

/// 去掉结尾的参数说明 `(...)`，返回其前面的部分
fn strip_argument_spec<'a>(expression: &str, text: &'a str) -> Result<&'a str, ConfigurationError> {
    match text.find('(') {
        Some(open) => {
            let arguments = &text[open..];
            let balanced = arguments.ends_with(')')
                && arguments.matches('(').count() == 1
                && arguments.matches(')').count() == 1;
            if !balanced {
                return Err(ConfigurationError::invalid_pointcut(expression, "参数说明括号不匹配"));
            }
            Ok(&text[..open])
        }
        None if text.contains(')') => Err(ConfigurationError::invalid_pointcut(
            expression,
            "参数说明括号不匹配",
        )),
        None => Ok(text),
    }
}

/// 把通配模式编译为锚定的正则
fn compile_glob(expression: &str, glob: &str) -> Result<Regex, ConfigurationError> {
    if glob.is_empty() {
        return Err(ConfigurationError::invalid_pointcut(expression, "模式为空"));
    }
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", body))
        .map_err(|error| ConfigurationError::invalid_pointcut(expression, error.to_string()))
}

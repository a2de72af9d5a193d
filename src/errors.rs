use std::fmt;

#[derive(Debug, Clone)]
pub enum OpentribeError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
}

impl OpentribeError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            OpentribeError::DatabaseConfig(_) => "E001",
            OpentribeError::DatabaseConnection(_) => "E002",
            OpentribeError::DatabaseOperation(_) => "E003",
            OpentribeError::FileOperation(_) => "E004",
            OpentribeError::Serialization(_) => "E005",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            OpentribeError::DatabaseConfig(_) => "Database Configuration Error",
            OpentribeError::DatabaseConnection(_) => "Database Connection Error",
            OpentribeError::DatabaseOperation(_) => "Database Operation Error",
            OpentribeError::FileOperation(_) => "File Operation Error",
            OpentribeError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            OpentribeError::DatabaseConfig(msg)
            | OpentribeError::DatabaseConnection(msg)
            | OpentribeError::DatabaseOperation(msg)
            | OpentribeError::FileOperation(msg)
            | OpentribeError::Serialization(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for OpentribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for OpentribeError {}

// 便捷的构造函数
impl OpentribeError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        OpentribeError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        OpentribeError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        OpentribeError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        OpentribeError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        OpentribeError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for OpentribeError {
    fn from(err: sea_orm::DbErr) -> Self {
        OpentribeError::database_operation(err.to_string())
    }
}

impl From<std::io::Error> for OpentribeError {
    fn from(err: std::io::Error) -> Self {
        OpentribeError::file_operation(err.to_string())
    }
}

impl From<toml::ser::Error> for OpentribeError {
    fn from(err: toml::ser::Error) -> Self {
        OpentribeError::serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpentribeError>;

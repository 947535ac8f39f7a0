// ==========================================
// 周课表排课系统 - 领域类型定义
// ==========================================
// 职责: 授课职责、课型等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 课型 (Class Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassType {
    Theory,   // 理论课
    Tutorial, // 辅导课
}

impl ClassType {
    /// 数据库存储编码
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ClassType::Theory => "THEORY",
            ClassType::Tutorial => "TUTORIAL",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for ClassType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "THEORY" => Ok(ClassType::Theory),
            "TUTORIAL" => Ok(ClassType::Tutorial),
            other => Err(format!("未知课型: {}", other)),
        }
    }
}

// ==========================================
// 授课职责 (Faculty Responsibility)
// ==========================================
// 决定教师在某开课记录中负责哪类课时
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Responsibility {
    #[serde(rename = "ALL")]
    All, // 理论 + 辅导
    #[serde(rename = "THEORY")]
    TheoryOnly, // 仅理论
    #[serde(rename = "TUTORIAL")]
    TutorialOnly, // 仅辅导
}

impl Responsibility {
    /// 数据库存储编码
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Responsibility::All => "ALL",
            Responsibility::TheoryOnly => "THEORY",
            Responsibility::TutorialOnly => "TUTORIAL",
        }
    }

    /// 该职责是否覆盖指定课型
    pub fn covers(&self, class_type: ClassType) -> bool {
        matches!(
            (self, class_type),
            (Responsibility::All, _)
                | (Responsibility::TheoryOnly, ClassType::Theory)
                | (Responsibility::TutorialOnly, ClassType::Tutorial)
        )
    }
}

impl Default for Responsibility {
    fn default() -> Self {
        Responsibility::All
    }
}

impl fmt::Display for Responsibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for Responsibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(Responsibility::All),
            "THEORY" | "THEORY_ONLY" => Ok(Responsibility::TheoryOnly),
            "TUTORIAL" | "TUTORIAL_ONLY" => Ok(Responsibility::TutorialOnly),
            other => Err(format!("未知授课职责: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responsibility_covers() {
        assert!(Responsibility::All.covers(ClassType::Theory));
        assert!(Responsibility::All.covers(ClassType::Tutorial));
        assert!(Responsibility::TheoryOnly.covers(ClassType::Theory));
        assert!(!Responsibility::TheoryOnly.covers(ClassType::Tutorial));
        assert!(!Responsibility::TutorialOnly.covers(ClassType::Theory));
        assert!(Responsibility::TutorialOnly.covers(ClassType::Tutorial));
    }

    #[test]
    fn test_db_codes_parse_back() {
        for r in [
            Responsibility::All,
            Responsibility::TheoryOnly,
            Responsibility::TutorialOnly,
        ] {
            assert_eq!(r.as_db_str().parse::<Responsibility>().unwrap(), r);
        }
        assert_eq!("theory_only".parse::<Responsibility>().unwrap(), Responsibility::TheoryOnly);
        assert!("LAB".parse::<ClassType>().is_err());
    }

    #[test]
    fn test_class_type_serde_matches_db_code() {
        let json = serde_json::to_string(&ClassType::Tutorial).unwrap();
        assert_eq!(json, "\"TUTORIAL\"");
        let json = serde_json::to_string(&Responsibility::TheoryOnly).unwrap();
        assert_eq!(json, "\"THEORY\"");
    }
}

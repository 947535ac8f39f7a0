// ==========================================
// 周课表排课系统 - 课时需求展开
// ==========================================
// 输入: 开课记录 + 授课分配
// 输出: 有序的课时需求序列，id 从 0 连续编号
// 规则:
// - 每个课时单元一条需求，不去重
// - 某课型找不到负责教师 → 该课型不产生需求（静默跳过，记日志）
// ==========================================

use crate::domain::offering::OfferingWithAssignments;
use crate::domain::schedule::SessionRequirement;
use crate::domain::types::ClassType;
use tracing::{debug, warn};

/// 课时需求展开器
#[derive(Debug, Default)]
pub struct RequirementDeriver;

impl RequirementDeriver {
    pub fn new() -> Self {
        Self
    }

    /// 展开全部开课记录
    ///
    /// # 参数
    /// - offerings: 开课记录（已按稳定顺序排列）
    ///
    /// # 返回
    /// 课时需求序列；为空时由调用方判定失败
    pub fn derive(&self, offerings: &[OfferingWithAssignments]) -> Vec<SessionRequirement> {
        let mut requirements = Vec::new();

        for offering in offerings {
            for class_type in [ClassType::Theory, ClassType::Tutorial] {
                let hours = offering.offering.required_hours(class_type);
                if hours == 0 {
                    continue;
                }

                let faculty_id = match offering.responsible_faculty(class_type) {
                    Some(id) => id,
                    None => {
                        warn!(
                            offering_id = offering.offering.offering_id,
                            subject = %offering.subject.code,
                            section = %offering.section.name,
                            class_type = %class_type,
                            hours,
                            "开课缺少负责教师，跳过该课型"
                        );
                        continue;
                    }
                };

                for _ in 0..hours {
                    requirements.push(SessionRequirement {
                        id: requirements.len(),
                        subject_id: offering.offering.subject_id,
                        section_id: offering.offering.section_id,
                        faculty_id,
                        class_type,
                    });
                }
            }
        }

        debug!(
            offerings = offerings.len(),
            requirements = requirements.len(),
            "课时需求展开完成"
        );

        requirements
    }
}
